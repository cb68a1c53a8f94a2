//! The playback controller.
//!
//! `Player` owns the playlist, the elapsed-time model of the loaded track and
//! the timers that refresh progress and detect the end of a track. It lives on
//! the UI thread; the UI loop calls `run_due` every iteration.

use std::path::PathBuf;
use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use thiserror::Error;

use crate::config::PlaybackSettings;
use crate::library::Track;

use super::backend::{BackendError, MediaBackend};
use super::clock::Clock;
use super::duration::{DurationOracle, resolve_duration};
use super::policy::{Advance, PlayModes, next_index, previous_index};
use super::scheduler::{Scheduler, TimerId};
use super::timer::{PlaybackTimer, format_time};

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("the playlist is empty")]
    EmptyPlaylist,
    #[error("no track at index {0}")]
    OutOfRange(usize),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Work the player schedules on itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum PlayerTask {
    Tick,
    CheckEnd,
    Advance,
}

/// What the player screen renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Progress {
    /// Played fraction in `[0, 1]`.
    pub fraction: f64,
    pub elapsed_text: String,
    pub duration_text: String,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            fraction: 0.0,
            elapsed_text: format_time(Duration::ZERO),
            duration_text: format_time(Duration::ZERO),
        }
    }
}

#[derive(Debug)]
struct Loaded {
    path: PathBuf,
    timer: PlaybackTimer,
}

pub struct Player {
    backend: Box<dyn MediaBackend>,
    oracle: Box<dyn DurationOracle>,
    clock: Box<dyn Clock>,
    rng: StdRng,
    settings: PlaybackSettings,

    timers: Scheduler<PlayerTask>,
    tick_timer: Option<TimerId>,
    end_timer: Option<TimerId>,
    advance_timer: Option<TimerId>,

    tracks: Vec<Track>,
    index: usize,
    current_name: Option<String>,
    loaded: Option<Loaded>,

    pub modes: PlayModes,
    seeking: bool,
    progress: Progress,
}

impl Player {
    pub fn new(
        backend: Box<dyn MediaBackend>,
        oracle: Box<dyn DurationOracle>,
        clock: Box<dyn Clock>,
        settings: PlaybackSettings,
    ) -> Self {
        Self::with_rng(backend, oracle, clock, settings, StdRng::from_os_rng())
    }

    /// Construct with an explicit RNG for the shuffle picks.
    pub fn with_rng(
        backend: Box<dyn MediaBackend>,
        oracle: Box<dyn DurationOracle>,
        clock: Box<dyn Clock>,
        settings: PlaybackSettings,
        rng: StdRng,
    ) -> Self {
        let modes = PlayModes {
            shuffle: settings.shuffle,
            repeat: settings.repeat,
        };
        Self {
            backend,
            oracle,
            clock,
            rng,
            settings,
            timers: Scheduler::new(),
            tick_timer: None,
            end_timer: None,
            advance_timer: None,
            tracks: Vec::new(),
            index: 0,
            current_name: None,
            loaded: None,
            modes,
            seeking: false,
            progress: Progress::default(),
        }
    }

    #[cfg(test)]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Name of the most recently loaded track, kept after it stops.
    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.loaded.as_ref().is_some_and(|l| l.timer.is_paused())
    }

    pub fn is_seeking(&self) -> bool {
        self.seeking
    }

    /// Number of pending timers.
    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Elapsed time of the loaded track, clamped to its duration.
    pub fn elapsed(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.loaded.as_ref().map(|l| l.timer.reported_elapsed(now))
    }

    pub fn duration(&self) -> Option<Duration> {
        self.loaded.as_ref().map(|l| l.timer.duration())
    }

    /// Replace the playlist and start the track at `index`.
    pub fn play(&mut self, tracks: Vec<Track>, index: usize) -> Result<(), PlaybackError> {
        self.tracks = tracks;
        self.load(index)
    }

    /// Stop whatever is playing and start the playlist entry at `index`.
    pub fn load(&mut self, index: usize) -> Result<(), PlaybackError> {
        self.stop();

        if self.tracks.is_empty() {
            return Err(PlaybackError::EmptyPlaylist);
        }
        let track = self
            .tracks
            .get(index)
            .cloned()
            .ok_or(PlaybackError::OutOfRange(index))?;

        self.index = index;
        self.current_name = Some(track.name.clone());

        let duration = resolve_duration(self.oracle.as_ref(), &track.path, &self.settings);
        self.progress = Progress {
            fraction: 0.0,
            elapsed_text: format_time(Duration::ZERO),
            duration_text: format_time(duration),
        };

        if let Err(e) = self.backend.open(&track.path) {
            log::warn!("Error loading {}: {}", track.path.display(), e);
            return Err(e.into());
        }

        let now = self.clock.now();
        self.loaded = Some(Loaded {
            path: track.path.clone(),
            timer: PlaybackTimer::start(duration, now),
        });

        self.tick_timer = Some(self.timers.schedule_interval(
            now,
            Duration::from_millis(self.settings.tick_ms),
            PlayerTask::Tick,
        ));
        self.end_timer = Some(self.timers.schedule_interval(
            now,
            Duration::from_millis(self.settings.end_check_ms),
            PlayerTask::CheckEnd,
        ));

        log::info!("Loaded {} ({})", track.name, format_time(duration));
        Ok(())
    }

    /// Cancel timers, release the backend and return to the stopped state.
    pub fn stop(&mut self) {
        self.cancel_polling();
        if let Some(id) = self.advance_timer.take() {
            self.timers.cancel(id);
        }
        self.seeking = false;

        if let Some(loaded) = self.loaded.take() {
            if let Err(e) = self.backend.close() {
                log::debug!("Ignoring close error for {}: {}", loaded.path.display(), e);
            }
        }
    }

    fn cancel_polling(&mut self) {
        if let Some(id) = self.tick_timer.take() {
            self.timers.cancel(id);
        }
        if let Some(id) = self.end_timer.take() {
            self.timers.cancel(id);
        }
    }

    pub fn toggle_pause(&mut self) {
        let now = self.clock.now();
        let Some(loaded) = self.loaded.as_mut() else {
            return;
        };

        let pausing = !loaded.timer.is_paused();
        if pausing {
            loaded.timer.pause(now);
        } else {
            loaded.timer.resume(now);
        }
        if let Err(e) = self.backend.pause(pausing) {
            log::warn!("Backend pause({}) failed: {}", pausing, e);
        }
    }

    pub fn toggle_shuffle(&mut self) {
        self.modes.shuffle = !self.modes.shuffle;
    }

    pub fn toggle_repeat(&mut self) {
        self.modes.repeat = !self.modes.repeat;
    }

    /// Refresh the displayed progress. Skipped while paused or while the user
    /// is dragging the position.
    pub fn tick(&mut self) {
        if self.seeking {
            return;
        }
        let now = self.clock.now();
        let Some(loaded) = self.loaded.as_ref() else {
            return;
        };
        if loaded.timer.is_paused() {
            return;
        }

        self.progress.fraction = loaded.timer.progress(now);
        self.progress.elapsed_text = format_time(loaded.timer.reported_elapsed(now));
    }

    /// Detect the end of the current track.
    ///
    /// Once elapsed reaches the end margin, polling stops, the backend is
    /// paused (it is closed later by `load`/`stop`), progress is pinned to the
    /// end and `advance` is scheduled after the grace delay. Returns whether
    /// the track was treated as finished.
    pub fn check_end(&mut self) -> bool {
        let now = self.clock.now();
        let margin = Duration::from_millis(self.settings.end_margin_ms);
        let Some(loaded) = self.loaded.as_ref() else {
            return false;
        };
        if !loaded.timer.is_finished(now, margin) {
            return false;
        }

        log::info!(
            "Track finished ({:.2}s / {:.2}s)",
            loaded.timer.elapsed(now).as_secs_f64(),
            loaded.timer.duration().as_secs_f64()
        );
        let duration = loaded.timer.duration();

        self.cancel_polling();
        if let Err(e) = self.backend.pause(true) {
            log::debug!("Ignoring pause error at end of track: {}", e);
        }
        self.progress.fraction = 1.0;
        self.progress.elapsed_text = format_time(duration);

        if self.advance_timer.is_none() {
            self.advance_timer = Some(self.timers.schedule_once(
                now,
                Duration::from_millis(self.settings.advance_delay_ms),
                PlayerTask::Advance,
            ));
        }
        true
    }

    /// Move on after a finished track according to the play modes.
    pub fn advance(&mut self) {
        // A manual skip during the grace delay must not advance twice.
        if let Some(id) = self.advance_timer.take() {
            self.timers.cancel(id);
        }
        match next_index(self.index, self.tracks.len(), self.modes, &mut self.rng) {
            Some(Advance::Play(i)) => {
                // Failures are logged by `load`; the player stays stopped.
                let _ = self.load(i);
            }
            Some(Advance::Stop(i)) => {
                self.index = i;
                self.stop();
                self.progress.fraction = 1.0;
            }
            None => {}
        }
    }

    /// Step back one track (wrapping only with repeat on) and play it.
    pub fn previous(&mut self) {
        if let Some(i) = previous_index(self.index, self.tracks.len(), self.modes.repeat) {
            let _ = self.load(i);
        }
    }

    /// Skip forward as if the current track had finished.
    pub fn next(&mut self) {
        self.advance();
    }

    /// The user started dragging the position; progress updates pause.
    pub fn begin_seek(&mut self) {
        if self.loaded.is_some() {
            self.seeking = true;
        }
    }

    /// The user abandoned the drag without choosing a position.
    pub fn cancel_seek(&mut self) {
        self.seeking = false;
    }

    /// The user released the drag at `fraction` of the track.
    pub fn end_seek(&mut self, fraction: f64) {
        self.seeking = false;
        let Some(duration) = self.duration() else {
            return;
        };
        if duration.is_zero() {
            return;
        }
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.seek_to(duration.mul_f64(fraction));
    }

    /// Scrub relative to the current position.
    pub fn seek_by(&mut self, seconds: i64) {
        let (Some(elapsed), Some(duration)) = (self.elapsed(), self.duration()) else {
            return;
        };
        let step = Duration::from_secs(seconds.unsigned_abs());
        let target = if seconds >= 0 {
            (elapsed + step).min(duration)
        } else {
            elapsed.saturating_sub(step)
        };
        self.seek_to(target);
    }

    fn seek_to(&mut self, position: Duration) {
        if let Err(e) = self.backend.seek(position) {
            log::warn!("Error seeking to {:.2}s: {}", position.as_secs_f64(), e);
            return;
        }
        let now = self.clock.now();
        if let Some(loaded) = self.loaded.as_mut() {
            loaded.timer.seek_to(position, now);
            self.progress.fraction = loaded.timer.progress(now);
            self.progress.elapsed_text = format_time(loaded.timer.reported_elapsed(now));
        }
    }

    /// Run every timer that is due. Called from the UI loop.
    pub fn run_due(&mut self) {
        let now = self.clock.now();
        while let Some(task) = self.timers.pop_due(now) {
            match task {
                PlayerTask::Tick => self.tick(),
                PlayerTask::CheckEnd => {
                    self.check_end();
                }
                PlayerTask::Advance => self.advance(),
            }
        }
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}
