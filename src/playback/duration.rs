use std::fs;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;

use crate::config::PlaybackSettings;

/// Reports the length of an audio file, or `None` when it cannot tell.
pub trait DurationOracle {
    fn duration(&self, path: &Path) -> Option<Duration>;
}

/// Reads the length from the file's audio properties with `lofty`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoftyOracle;

impl DurationOracle for LoftyOracle {
    fn duration(&self, path: &Path) -> Option<Duration> {
        match lofty::read_from_path(path) {
            Ok(tagged) => Some(tagged.properties().duration()),
            Err(e) => {
                log::debug!("No duration metadata for {}: {}", path.display(), e);
                None
            }
        }
    }
}

/// Resolve a track length with fallbacks: metadata first, then an estimate
/// from the file size, then a fixed default.
///
/// A zero length from the oracle counts as unknown.
pub fn resolve_duration(
    oracle: &dyn DurationOracle,
    path: &Path,
    settings: &PlaybackSettings,
) -> Duration {
    if let Some(d) = oracle.duration(path).filter(|d| !d.is_zero()) {
        log::debug!("Duration of {}: {:.2}s", path.display(), d.as_secs_f64());
        return d;
    }

    match fs::metadata(path) {
        Ok(meta) => {
            let bytes_per_second = settings.fallback_bytes_per_second.max(1) as f64;
            let estimate = Duration::from_secs_f64(meta.len() as f64 / bytes_per_second);
            log::debug!(
                "Estimated duration of {} from size: {:.2}s",
                path.display(),
                estimate.as_secs_f64()
            );
            estimate
        }
        Err(e) => {
            log::debug!("Cannot stat {}: {}", path.display(), e);
            Duration::from_secs(settings.fallback_duration_secs)
        }
    }
}
