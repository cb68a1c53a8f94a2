use std::path::PathBuf;

use thiserror::Error;

/// Why a download was refused or failed. The `Display` text is what the user
/// sees in the downloader dialog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("Please enter a valid URL")]
    EmptyUrl,
    #[error("Please enter a URL from one of: {allowed}")]
    UnsupportedUrl { allowed: String },
    #[error("The music folder does not exist:\n{}\n\nSet it in Settings", .0.display())]
    MissingFolder(PathBuf),
    #[error("A download is already in progress")]
    Busy,
    #[error("{program} is not installed.\nInstall it with: pip install yt-dlp")]
    MissingDependency { program: String },
    #[error("FFmpeg is not installed.\nDownload it from: https://ffmpeg.org/download.html")]
    MissingTranscoder,
    #[error("Error: {0}")]
    Failed(String),
}

/// Map the diagnostics of a failed fetch to an error.
///
/// Transcoder problems get an install hint; anything else keeps the last
/// non-empty line of `stderr`, or `fallback` when there is none.
pub fn classify_failure(stderr: &str, fallback: &str) -> DownloadError {
    let lower = stderr.to_lowercase();
    if lower.contains("ffmpeg") || lower.contains("ffprobe") {
        return DownloadError::MissingTranscoder;
    }

    let detail = stderr
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .next_back()
        .map(|l| l.strip_prefix("ERROR:").map(str::trim).unwrap_or(l))
        .unwrap_or(fallback);
    DownloadError::Failed(detail.to_string())
}
