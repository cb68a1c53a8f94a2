//! Configuration: runtime settings and persisted preferences.
//!
//! `Settings` tunes the scanner, player and downloader and is loaded from an
//! optional TOML file plus environment variables. `ConfigStore` owns the JSON
//! preferences document (music folder and theme) that the settings screen
//! edits.

mod load;
mod schema;
mod store;

pub use load::{default_config_path, resolve_config_path};
pub use schema::*;
pub use store::*;
