//! Playback: the elapsed-time model, the advance policy and the `Player`
//! controller that drives a media backend from the UI loop.
//!
//! Elapsed time is derived from wall-clock deltas rather than queried from the
//! decoder, so reported progress stays smooth and monotonic. The player owns a
//! cooperative `Scheduler` whose timers are polled by the UI loop through
//! `Player::run_due`.

mod backend;
mod clock;
mod duration;
mod player;
mod policy;
mod scheduler;
mod timer;

pub use backend::{BackendError, MediaBackend, RodioBackend};
pub use clock::{Clock, SystemClock};
pub use duration::{DurationOracle, LoftyOracle, resolve_duration};
pub use player::{PlaybackError, Player, Progress};
pub use policy::{Advance, PlayModes, next_index, previous_index};
pub use scheduler::{Scheduler, TimerId};
pub use timer::{PlaybackTimer, format_time};
