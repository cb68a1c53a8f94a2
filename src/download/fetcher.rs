use std::ffi::OsString;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::config::DownloadSettings;

use super::error::{DownloadError, classify_failure};

/// Blocking fetch-and-transcode of one URL into a folder.
///
/// Runs on the download worker thread. Returns the title of the fetched item.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &str, dest: &Path) -> Result<String, DownloadError>;
}

/// Fetches best audio with the `yt-dlp` executable and extracts it to the
/// configured format.
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: String,
    audio_format: String,
    audio_quality: String,
}

impl YtDlp {
    pub fn new(settings: &DownloadSettings) -> Self {
        Self {
            program: settings.program.clone(),
            audio_format: settings.audio_format.clone(),
            audio_quality: settings.audio_quality.clone(),
        }
    }

    pub(crate) fn args(&self, url: &str, dest: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "--format",
            "bestaudio/best",
            "--extract-audio",
            "--audio-format",
            self.audio_format.as_str(),
            "--audio-quality",
            self.audio_quality.as_str(),
            "--no-playlist",
            "--quiet",
            "--no-warnings",
            "--no-progress",
            "--no-simulate",
            "--print",
            "after_move:title",
            "--output",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.push(dest.join("%(title)s.%(ext)s").into_os_string());
        args.push(OsString::from(url));
        args
    }
}

impl Fetcher for YtDlp {
    fn fetch(&self, url: &str, dest: &Path) -> Result<String, DownloadError> {
        log::info!("Running {} for {}", self.program, url);
        let output = Command::new(&self.program)
            .args(self.args(url, dest))
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => DownloadError::MissingDependency {
                    program: self.program.clone(),
                },
                _ => DownloadError::Failed(format!("could not run {}: {}", self.program, e)),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            log::debug!("{} stderr: {}", self.program, stderr.trim());
            return Err(classify_failure(
                &stderr,
                &format!("{} exited with {}", self.program, output.status),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let title = stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .next_back()
            .unwrap_or("Unknown");
        Ok(title.to_string())
    }
}
