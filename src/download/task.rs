use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use super::error::DownloadError;
use super::fetcher::Fetcher;

/// Result of one download, sent once from the worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    pub success: bool,
    pub message: String,
    pub title: Option<String>,
}

impl DownloadOutcome {
    fn finished(title: String) -> Self {
        Self {
            success: true,
            message: format!("Downloaded: {}", title),
            title: Some(title),
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            title: None,
        }
    }
}

/// Runs at most one download at a time on a background thread.
pub struct DownloadTask {
    fetcher: Arc<dyn Fetcher>,
    allowed_hosts: Vec<String>,
    tx: Sender<DownloadOutcome>,
    rx: Receiver<DownloadOutcome>,
    in_flight: bool,
}

impl DownloadTask {
    pub fn new(fetcher: Arc<dyn Fetcher>, allowed_hosts: Vec<String>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            fetcher,
            allowed_hosts,
            tx,
            rx,
            in_flight: false,
        }
    }

    pub fn is_downloading(&self) -> bool {
        self.in_flight
    }

    /// Validate the request and start the worker.
    ///
    /// Checks, in order: non-empty URL, allowed host, existing destination,
    /// nothing already in flight.
    pub fn start(&mut self, url: &str, dest: &Path) -> Result<(), DownloadError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(DownloadError::EmptyUrl);
        }
        if !self.allowed_hosts.iter().any(|h| url.contains(h.as_str())) {
            return Err(DownloadError::UnsupportedUrl {
                allowed: self.allowed_hosts.join(", "),
            });
        }
        if !dest.is_dir() {
            return Err(DownloadError::MissingFolder(dest.to_path_buf()));
        }
        if self.in_flight {
            return Err(DownloadError::Busy);
        }

        let fetcher = Arc::clone(&self.fetcher);
        let tx = self.tx.clone();
        let url = url.to_string();
        let dest: PathBuf = dest.to_path_buf();

        thread::Builder::new()
            .name("download".into())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| fetcher.fetch(&url, &dest)));
                let outcome = match result {
                    Ok(Ok(title)) => {
                        log::info!("Download complete: {}", title);
                        DownloadOutcome::finished(title)
                    }
                    Ok(Err(e)) => {
                        log::warn!("Download of {} failed: {:?}", url, e);
                        DownloadOutcome::failed(e.to_string())
                    }
                    Err(payload) => {
                        let msg = panic_message(payload.as_ref());
                        log::error!("Download worker panicked: {}", msg);
                        DownloadOutcome::failed(DownloadError::Failed(msg).to_string())
                    }
                };
                // The receiver is gone only when the app is shutting down.
                let _ = tx.send(outcome);
            })
            .map_err(|e| DownloadError::Failed(format!("could not start download: {}", e)))?;

        self.in_flight = true;
        Ok(())
    }

    /// Take the outcome of the running download, if it has finished.
    pub fn poll(&mut self) -> Option<DownloadOutcome> {
        match self.rx.try_recv() {
            Ok(outcome) => {
                self.in_flight = false;
                Some(outcome)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "the download worker crashed".to_string()
    }
}
