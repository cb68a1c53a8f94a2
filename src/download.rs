//! Background audio downloads.
//!
//! `DownloadTask` validates a request on the UI thread, runs the blocking
//! `Fetcher` on a detached worker and hands back a single `DownloadOutcome`
//! per download through a channel drained by the UI loop.

mod error;
mod fetcher;
mod task;

pub use error::{DownloadError, classify_failure};
pub use fetcher::{Fetcher, YtDlp};
pub use task::{DownloadOutcome, DownloadTask};

#[cfg(test)]
mod tests;
