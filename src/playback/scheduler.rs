//! Cooperative timers polled from the UI loop.

use std::time::{Duration, Instant};

/// Handle returned when scheduling; used to cancel.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Entry<T> {
    id: TimerId,
    due: Instant,
    period: Option<Duration>,
    task: T,
}

/// One-shot and repeating timers carrying a task value.
///
/// Nothing runs by itself: the owner calls `pop_due` and dispatches each task.
/// Popping one task at a time means a task that cancels other timers takes
/// effect before those timers are popped in the same pass.
#[derive(Debug)]
pub struct Scheduler<T> {
    next_id: u64,
    entries: Vec<Entry<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<T: Clone> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, due: Instant, period: Option<Duration>, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due,
            period,
            task,
        });
        id
    }

    /// Fire `task` once, `delay` after `now`.
    pub fn schedule_once(&mut self, now: Instant, delay: Duration, task: T) -> TimerId {
        self.push(now + delay, None, task)
    }

    /// Fire `task` every `period`, first at `now + period`.
    pub fn schedule_interval(&mut self, now: Instant, period: Duration, task: T) -> TimerId {
        self.push(now + period, Some(period), task)
    }

    /// Cancel a timer. Returns `false` if it already fired (one-shot) or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    #[cfg(test)]
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Earliest due time, if any timer is pending.
    #[cfg(test)]
    pub fn next_due(&self) -> Option<Instant> {
        self.entries.iter().map(|e| e.due).min()
    }

    /// Pop the earliest task that is due at `now`.
    ///
    /// Repeating timers are re-armed one period later; a timer that fell more
    /// than a period behind is re-armed relative to `now` instead of firing in
    /// a burst.
    pub fn pop_due(&mut self, now: Instant) -> Option<T> {
        let pos = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= now)
            .min_by_key(|(_, e)| e.due)
            .map(|(i, _)| i)?;

        match self.entries[pos].period {
            Some(period) => {
                let entry = &mut self.entries[pos];
                let next = entry.due + period;
                entry.due = if next <= now { now + period } else { next };
                Some(entry.task.clone())
            }
            None => Some(self.entries.remove(pos).task),
        }
    }
}
