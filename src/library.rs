//! Music library: the `Track` model and the directory scanner.

mod model;
mod scan;

pub use model::Track;
pub use scan::{ensure_music_folder, find_music_files};
