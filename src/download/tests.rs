use super::*;
use crate::config::DownloadSettings;

use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Fetcher that blocks until the test releases it, then returns `result`.
struct GatedFetcher {
    gate: Mutex<Receiver<()>>,
    result: Result<String, DownloadError>,
}

impl GatedFetcher {
    fn new(result: Result<String, DownloadError>) -> (Arc<Self>, Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let fetcher = Arc::new(Self {
            gate: Mutex::new(rx),
            result,
        });
        (fetcher, tx)
    }
}

impl Fetcher for GatedFetcher {
    fn fetch(&self, _url: &str, _dest: &Path) -> Result<String, DownloadError> {
        let gate = self.gate.lock().unwrap();
        let _ = gate.recv_timeout(Duration::from_secs(5));
        self.result.clone()
    }
}

struct PanickingFetcher;

impl Fetcher for PanickingFetcher {
    fn fetch(&self, _url: &str, _dest: &Path) -> Result<String, DownloadError> {
        panic!("boom");
    }
}

fn hosts() -> Vec<String> {
    DownloadSettings::default().allowed_hosts
}

fn wait_for(task: &mut DownloadTask) -> DownloadOutcome {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(outcome) = task.poll() {
            return outcome;
        }
        assert!(Instant::now() < deadline, "download never reported back");
        std::thread::sleep(Duration::from_millis(10));
    }
}

const URL: &str = "https://www.youtube.com/watch?v=abc";

#[test]
fn start_validates_url_then_folder() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, _gate) = GatedFetcher::new(Ok("x".into()));
    let mut task = DownloadTask::new(fetcher, hosts());

    assert_eq!(task.start("", dir.path()), Err(DownloadError::EmptyUrl));
    assert_eq!(task.start("   ", dir.path()), Err(DownloadError::EmptyUrl));
    assert_eq!(
        task.start("https://vimeo.com/1", dir.path()),
        Err(DownloadError::UnsupportedUrl {
            allowed: "youtube.com, youtu.be".into()
        })
    );
    let missing = dir.path().join("missing");
    assert_eq!(
        task.start("https://youtu.be/abc", &missing),
        Err(DownloadError::MissingFolder(missing.clone()))
    );
    assert!(!task.is_downloading());
}

#[test]
fn successful_download_reports_title_once() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, gate) = GatedFetcher::new(Ok("Song Title".into()));
    let mut task = DownloadTask::new(fetcher, hosts());

    task.start(URL, dir.path()).unwrap();
    assert!(task.is_downloading());
    assert_eq!(task.poll(), None);

    gate.send(()).unwrap();
    let outcome = wait_for(&mut task);
    assert!(outcome.success);
    assert_eq!(outcome.message, "Downloaded: Song Title");
    assert_eq!(outcome.title.as_deref(), Some("Song Title"));
    assert!(!task.is_downloading());
    assert_eq!(task.poll(), None);
}

#[test]
fn second_start_while_in_flight_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, gate) = GatedFetcher::new(Ok("first".into()));
    let mut task = DownloadTask::new(fetcher, hosts());

    task.start(URL, dir.path()).unwrap();
    assert_eq!(task.start(URL, dir.path()), Err(DownloadError::Busy));
    // Validation still runs before the busy check.
    assert_eq!(task.start("", dir.path()), Err(DownloadError::EmptyUrl));

    gate.send(()).unwrap();
    wait_for(&mut task);

    gate.send(()).unwrap();
    assert_eq!(task.start(URL, dir.path()), Ok(()));
    assert!(wait_for(&mut task).success);
}

#[test]
fn fetch_errors_become_user_messages() {
    let dir = tempfile::tempdir().unwrap();
    let (fetcher, gate) = GatedFetcher::new(Err(DownloadError::MissingTranscoder));
    let mut task = DownloadTask::new(fetcher, hosts());

    task.start(URL, dir.path()).unwrap();
    gate.send(()).unwrap();
    let outcome = wait_for(&mut task);
    assert!(!outcome.success);
    assert!(outcome.message.contains("https://ffmpeg.org/download.html"));
    assert_eq!(outcome.title, None);
}

#[test]
fn worker_panic_is_reported_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let mut task = DownloadTask::new(Arc::new(PanickingFetcher), hosts());

    task.start(URL, dir.path()).unwrap();
    let outcome = wait_for(&mut task);
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Error: boom");
    assert!(!task.is_downloading());
}

#[test]
fn classify_failure_maps_transcoder_errors_to_install_hint() {
    assert_eq!(
        classify_failure("ERROR: Postprocessing: ffprobe and ffmpeg not found", "exit 1"),
        DownloadError::MissingTranscoder
    );
    assert_eq!(
        classify_failure("WARNING: something\nERROR: Video unavailable\n\n", "exit 1"),
        DownloadError::Failed("Video unavailable".into())
    );
    assert_eq!(
        classify_failure("", "yt-dlp exited with exit status: 2"),
        DownloadError::Failed("yt-dlp exited with exit status: 2".into())
    );
}

#[test]
fn missing_dependency_message_has_install_hint() {
    let msg = DownloadError::MissingDependency {
        program: "yt-dlp".into(),
    }
    .to_string();
    assert!(msg.contains("pip install yt-dlp"));
}

#[test]
fn ytdlp_reports_missing_program() {
    let dir = tempfile::tempdir().unwrap();
    let settings = DownloadSettings {
        program: "regina-no-such-downloader".into(),
        ..DownloadSettings::default()
    };
    let err = YtDlp::new(&settings).fetch(URL, dir.path()).unwrap_err();
    assert_eq!(
        err,
        DownloadError::MissingDependency {
            program: "regina-no-such-downloader".into()
        }
    );
}

#[test]
fn ytdlp_args_extract_audio_into_destination() {
    let settings = DownloadSettings {
        audio_quality: "320".into(),
        ..DownloadSettings::default()
    };
    let dest = Path::new("/music");
    let args: Vec<String> = YtDlp::new(&settings)
        .args(URL, dest)
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();

    let after = |flag: &str| {
        let i = args.iter().position(|a| a == flag).unwrap();
        args[i + 1].clone()
    };
    assert_eq!(after("--format"), "bestaudio/best");
    assert_eq!(after("--audio-format"), "mp3");
    assert_eq!(after("--audio-quality"), "320");
    assert_eq!(
        after("--output"),
        dest.join("%(title)s.%(ext)s").to_string_lossy()
    );
    assert_eq!(args.last().map(String::as_str), Some(URL));
}
