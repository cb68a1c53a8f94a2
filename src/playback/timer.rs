//! Wall-clock elapsed-time model for the current track.

use std::time::{Duration, Instant};

/// Elapsed time of one loaded track.
///
/// While playing, elapsed is `accumulated + (now - resumed_at)`; while paused
/// it is frozen at `accumulated`.
#[derive(Debug, Clone)]
pub struct PlaybackTimer {
    duration: Duration,
    accumulated: Duration,
    resumed_at: Option<Instant>,
}

impl PlaybackTimer {
    /// Start counting from zero at `now`.
    pub fn start(duration: Duration, now: Instant) -> Self {
        Self {
            duration,
            accumulated: Duration::ZERO,
            resumed_at: Some(now),
        }
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_paused(&self) -> bool {
        self.resumed_at.is_none()
    }

    /// Raw elapsed time, not clamped to the duration.
    pub fn elapsed(&self, now: Instant) -> Duration {
        match self.resumed_at {
            Some(at) => self.accumulated + now.saturating_duration_since(at),
            None => self.accumulated,
        }
    }

    /// Elapsed time as shown to the user; never exceeds the duration.
    pub fn reported_elapsed(&self, now: Instant) -> Duration {
        self.elapsed(now).min(self.duration)
    }

    /// Fraction of the track played, in `[0, 1]`. Zero for unknown lengths.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return 0.0;
        }
        (self.elapsed(now).as_secs_f64() / self.duration.as_secs_f64()).clamp(0.0, 1.0)
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(at) = self.resumed_at.take() {
            self.accumulated += now.saturating_duration_since(at);
        }
    }

    pub fn resume(&mut self, now: Instant) {
        if self.resumed_at.is_none() {
            self.resumed_at = Some(now);
        }
    }

    /// Jump to `position`. The paused state is kept.
    pub fn seek_to(&mut self, position: Duration, now: Instant) {
        self.accumulated = position;
        if self.resumed_at.is_some() {
            self.resumed_at = Some(now);
        }
    }

    /// Whether elapsed has reached `duration - margin`.
    pub fn is_finished(&self, now: Instant, margin: Duration) -> bool {
        self.elapsed(now) >= self.duration.saturating_sub(margin)
    }
}

/// Format a duration as `H:MM:SS`, or `M:SS` when under an hour.
pub fn format_time(d: Duration) -> String {
    let secs = d.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}
