//! Screen actions that touch the preference store, the scanner or the
//! downloader. They only mutate `App`, so they run without a terminal.

use std::path::PathBuf;

use crate::app::App;
use crate::config::{ConfigStore, LibrarySettings, next_primary_color};
use crate::download::{DownloadOutcome, DownloadTask};
use crate::library::find_music_files;

pub const DOWNLOADING: &str = "Downloading...";

/// Rescan the current folder and replace the list. Returns the track count.
pub fn rescan(app: &mut App, library: &LibrarySettings) -> usize {
    let tracks = find_music_files(&app.music_folder, library);
    let n = tracks.len();
    app.set_tracks(tracks);
    n
}

/// The list screen's refresh command. Rescans the configured folder, which
/// also ends a folder override given on the command line.
pub fn refresh_library(app: &mut App, store: &ConfigStore, library: &LibrarySettings) {
    let configured = store.get_music_folder();
    if configured != app.music_folder {
        log::info!(
            "Switching from {} back to configured folder {}",
            app.music_folder.display(),
            configured.display()
        );
        app.music_folder = configured;
    }
    let n = rescan(app, library);
    app.show_dialog("Library updated", format!("{} songs found", n));
}

/// Expand a leading `~` to the home directory.
fn expand_home(input: &str) -> PathBuf {
    if input == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = input.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(input)
}

/// Validate, persist and switch to a new music folder, then rescan.
///
/// Returns whether the folder was applied. Every outcome is reported to the
/// user through a dialog.
pub fn select_folder(
    app: &mut App,
    store: &ConfigStore,
    library: &LibrarySettings,
    input: &str,
) -> bool {
    let input = input.trim();
    if input.is_empty() {
        app.show_dialog("Error", "Please enter a folder path");
        return false;
    }
    let path = expand_home(input);
    if !path.exists() {
        app.show_dialog("Error", format!("The folder does not exist:\n{}", path.display()));
        return false;
    }
    if !path.is_dir() {
        app.show_dialog("Error", format!("The path is not a folder:\n{}", path.display()));
        return false;
    }
    if !store.set_music_folder(&path) {
        app.show_dialog("Error", "Could not save the configuration");
        return false;
    }

    log::info!("Music folder changed to {}", path.display());
    app.folder_input = path.display().to_string();
    app.music_folder = path;
    let n = rescan(app, library);
    app.show_dialog(
        "Folder updated",
        format!(
            "Music folder:\n{}\n\n{} songs found. The song list has been updated.",
            app.music_folder.display(),
            n
        ),
    );
    true
}

/// Start downloading the URL field into the current music folder.
pub fn start_download(app: &mut App, downloads: &mut DownloadTask) {
    match downloads.start(&app.url_input, &app.music_folder) {
        Ok(()) => app.download_status = DOWNLOADING.to_string(),
        Err(e) => {
            log::info!("Download rejected: {:?}", e);
            app.show_dialog("Error", e.to_string());
        }
    }
}

/// Apply a finished download: rescan and clear the field on success.
pub fn finish_download(app: &mut App, outcome: DownloadOutcome, library: &LibrarySettings) {
    app.download_status = outcome.message.clone();
    if outcome.success {
        let n = rescan(app, library);
        log::info!("Library reloaded after download: {} songs", n);
        app.url_input.clear();
        app.show_dialog(
            "Success",
            format!("{}\n\nThe song is now in your list.", outcome.message),
        );
    } else {
        app.show_dialog("Error", outcome.message);
    }
}

/// Flip Light/Dark, persist it and apply it to the UI.
pub fn toggle_theme(app: &mut App, store: &ConfigStore) {
    let style = app.theme_style.toggled();
    app.theme_style = style;
    if store.set_theme(Some(style), None) {
        log::info!("Theme changed to {}", style);
    } else {
        app.show_dialog("Error", "Could not save the configuration");
    }
}

/// Move to the next primary color, persist it and apply it to the UI.
pub fn cycle_primary_color(app: &mut App, store: &ConfigStore) {
    let color = next_primary_color(&app.primary_color);
    app.primary_color = color.to_string();
    if store.set_theme(None, Some(color)) {
        log::info!("Primary color changed to {}", color);
    } else {
        app.show_dialog("Error", "Could not save the configuration");
    }
}
