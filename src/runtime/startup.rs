use std::ffi::OsString;
use std::path::PathBuf;

use crate::config::{ConfigStore, Preferences};
use crate::library::ensure_music_folder;

/// Load preferences, writing the defaults out on first run.
pub fn ensure_preferences(store: &ConfigStore) -> Preferences {
    if store.exists() {
        return store.load();
    }
    let prefs = Preferences::default();
    if store.save(&prefs) {
        log::info!("Created preferences at {}", store.path().display());
    }
    prefs
}

/// The folder for this session: the command-line argument if given, otherwise
/// the stored preference. The folder is created when missing.
pub fn resolve_music_folder(arg: Option<OsString>, prefs: &Preferences) -> PathBuf {
    let folder = arg
        .filter(|a| !a.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| prefs.music_folder.clone());
    if !ensure_music_folder(&folder) {
        log::warn!("Music folder {} is not available", folder.display());
    }
    folder
}
