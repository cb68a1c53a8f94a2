//! Application module: the screen/dialog model shared by the TUI and runtime.
//!
//! `App` holds the scanned library, the list selection, the active screen and
//! the text fields. Playback state lives in `playback::Player`.

mod model;

pub use model::*;
