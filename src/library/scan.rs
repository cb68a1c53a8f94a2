use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::Track;

fn normalized_extensions(settings: &LibrarySettings) -> Vec<String> {
    settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}

fn is_audio_file(path: &Path, exts: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Recursively collect audio files under `root`, sorted by file name
/// (case-insensitive, ties broken by full path).
///
/// A missing root yields an empty list. With `follow_links` enabled, walkdir
/// tracks the ancestors of every directory it enters and reports a loop error
/// instead of descending into a cycle; such entries are skipped.
pub fn find_music_files(root: &Path, settings: &LibrarySettings) -> Vec<Track> {
    let exts = normalized_extensions(settings);
    let mut tracks: Vec<Track> = Vec::new();

    let mut walker = WalkDir::new(root).follow_links(settings.follow_links);
    if let Some(d) = settings.max_depth {
        walker = walker.max_depth(d);
    }

    for entry in walker.into_iter() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::debug!("Skipping entry while scanning {}: {}", root.display(), e);
                continue;
            }
        };

        if entry.file_type().is_file() && is_audio_file(entry.path(), &exts) {
            tracks.push(Track::from_path(entry.path()));
        }
    }

    tracks.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.path.cmp(&b.path))
    });

    log::info!("Found {} tracks under {}", tracks.len(), root.display());
    tracks
}

/// Create `folder` (and parents) when it does not exist yet.
///
/// Returns whether the folder exists afterwards.
pub fn ensure_music_folder(folder: &Path) -> bool {
    if folder.is_dir() {
        return true;
    }
    match fs::create_dir_all(folder) {
        Ok(()) => {
            log::info!("Created music folder {}", folder.display());
            true
        }
        Err(e) => {
            log::warn!("Could not create music folder {}: {}", folder.display(), e);
            false
        }
    }
}
