//! Media backend seam and its `rodio` implementation.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {reason}")]
    Decode { path: PathBuf, reason: String },
    #[error("nothing is loaded")]
    NotLoaded,
}

/// The audio player the `Player` drives.
///
/// Positions are absolute. Implementations must tolerate `close` without a
/// prior `open`.
pub trait MediaBackend {
    fn open(&mut self, path: &Path) -> Result<(), BackendError>;
    fn pause(&mut self, paused: bool) -> Result<(), BackendError>;
    fn seek(&mut self, position: Duration) -> Result<(), BackendError>;
    fn close(&mut self) -> Result<(), BackendError>;
}

/// Plays files through the default output device.
///
/// The output stream is opened on first use so that constructing the backend
/// never touches the audio device.
#[derive(Default)]
pub struct RodioBackend {
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    paused: bool,
}

impl RodioBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn stream(&mut self) -> Result<&OutputStream, BackendError> {
        if self.stream.is_none() {
            let mut stream = OutputStreamBuilder::open_default_stream()
                .map_err(|e| BackendError::NoOutputDevice(e.to_string()))?;
            // rodio logs to stderr when the stream is dropped, which would
            // scribble over the TUI.
            stream.log_on_drop(false);
            self.stream = Some(stream);
        }
        self.stream
            .as_ref()
            .ok_or_else(|| BackendError::NoOutputDevice("stream unavailable".to_string()))
    }

    /// Create a paused `Sink` for `path` that starts playback at `start_at`.
    fn create_sink_at(&mut self, path: &Path, start_at: Duration) -> Result<Sink, BackendError> {
        let file = File::open(path).map_err(|source| BackendError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let source = Decoder::new(BufReader::new(file))
            .map_err(|e| BackendError::Decode {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?
            // `skip_duration` is the seeking primitive; Duration::ZERO is fine.
            .skip_duration(start_at);

        let sink = Sink::connect_new(self.stream()?.mixer());
        sink.append(source);
        sink.pause();
        Ok(sink)
    }
}

impl MediaBackend for RodioBackend {
    fn open(&mut self, path: &Path) -> Result<(), BackendError> {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let sink = self.create_sink_at(path, Duration::ZERO)?;
        sink.play();
        self.sink = Some(sink);
        self.path = Some(path.to_path_buf());
        self.paused = false;
        Ok(())
    }

    fn pause(&mut self, paused: bool) -> Result<(), BackendError> {
        let sink = self.sink.as_ref().ok_or(BackendError::NotLoaded)?;
        if paused {
            sink.pause();
        } else {
            sink.play();
        }
        self.paused = paused;
        Ok(())
    }

    fn seek(&mut self, position: Duration) -> Result<(), BackendError> {
        let path = self.path.clone().ok_or(BackendError::NotLoaded)?;

        // Rebuild the sink and skip into the file; works for every format
        // the decoder reads, seekable or not.
        let new_sink = self.create_sink_at(&path, position)?;
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        if !self.paused {
            new_sink.play();
        }
        self.sink = Some(new_sink);
        Ok(())
    }

    fn close(&mut self) -> Result<(), BackendError> {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.path = None;
        self.paused = false;
        Ok(())
    }
}
