use super::actions::{self, DOWNLOADING};
use super::event_loop::{Services, handle_key_event, sync_seek_gesture};
use super::startup::{ensure_preferences, resolve_music_folder};

use crate::app::{App, Screen, WAITING_FOR_URL};
use crate::config::{ConfigStore, PREFS_FILE, Preferences, Settings, Theme, ThemeStyle};
use crate::download::{DownloadError, DownloadOutcome, DownloadTask, Fetcher};
use crate::library::find_music_files;
use crate::playback::{BackendError, DurationOracle, MediaBackend, Player, SystemClock};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

struct SilentBackend;

impl MediaBackend for SilentBackend {
    fn open(&mut self, _path: &Path) -> Result<(), BackendError> {
        Ok(())
    }
    fn pause(&mut self, _paused: bool) -> Result<(), BackendError> {
        Ok(())
    }
    fn seek(&mut self, _position: Duration) -> Result<(), BackendError> {
        Ok(())
    }
    fn close(&mut self) -> Result<(), BackendError> {
        Ok(())
    }
}

struct FixedLength;

impl DurationOracle for FixedLength {
    fn duration(&self, _path: &Path) -> Option<Duration> {
        Some(Duration::from_secs(100))
    }
}

struct InstantFetcher;

impl Fetcher for InstantFetcher {
    fn fetch(&self, _url: &str, dest: &Path) -> Result<String, DownloadError> {
        fs::write(dest.join("fetched.mp3"), b"x").map_err(|e| DownloadError::Failed(e.to_string()))?;
        Ok("fetched".into())
    }
}

struct Fixture {
    dir: TempDir,
    app: App,
    services: Services,
}

impl Fixture {
    fn new(songs: &[&str]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let music = dir.path().join("music");
        fs::create_dir_all(&music).unwrap();
        for s in songs {
            fs::write(music.join(s), b"x").unwrap();
        }

        let settings = Settings::default();
        let tracks = find_music_files(&music, &settings.library);
        let app = App::new(
            tracks,
            music,
            Theme {
                theme_style: ThemeStyle::Dark,
                primary_color: "Blue".into(),
            },
        );
        let player = Player::new(
            Box::new(SilentBackend),
            Box::new(FixedLength),
            Box::new(SystemClock),
            settings.playback.clone(),
        );
        let downloads = DownloadTask::new(
            Arc::new(InstantFetcher),
            settings.download.allowed_hosts.clone(),
        );
        let store = ConfigStore::new(dir.path().join(PREFS_FILE));
        Self {
            dir,
            app,
            services: Services {
                settings,
                store,
                player,
                downloads,
            },
        }
    }

    fn key(&mut self, code: KeyCode) -> bool {
        handle_key_event(
            KeyEvent::new(code, KeyModifiers::NONE),
            &mut self.app,
            &mut self.services,
        )
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    fn dialog_title(&self) -> Option<&str> {
        self.app.dialog.as_ref().map(|d| d.title.as_str())
    }

    fn dialog_text(&self) -> &str {
        self.app.dialog.as_ref().map(|d| d.text.as_str()).unwrap_or("")
    }
}

fn wait_for_download(f: &mut Fixture) -> DownloadOutcome {
    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        if let Some(outcome) = f.services.downloads.poll() {
            return outcome;
        }
        assert!(std::time::Instant::now() < deadline, "download never finished");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn refresh_reports_song_count() {
    let mut f = Fixture::new(&["a.mp3"]);
    assert!(f.services.store.set_music_folder(&f.app.music_folder));
    fs::write(f.app.music_folder.join("b.mp4"), b"x").unwrap();

    actions::refresh_library(&mut f.app, &f.services.store, &f.services.settings.library);
    assert_eq!(f.app.tracks.len(), 2);
    assert_eq!(f.dialog_title(), Some("Library updated"));
    assert_eq!(f.dialog_text(), "2 songs found");
}

#[test]
fn refresh_returns_to_the_configured_folder() {
    let mut f = Fixture::new(&["a.mp3"]);
    let configured = f.dir.path().join("configured");
    fs::create_dir_all(&configured).unwrap();
    fs::write(configured.join("x.mp3"), b"x").unwrap();
    fs::write(configured.join("y.mp3"), b"x").unwrap();
    assert!(f.services.store.set_music_folder(&configured));

    f.key(KeyCode::Char('r'));
    assert_eq!(f.app.music_folder, configured);
    assert_eq!(f.app.tracks.len(), 2);
    assert_eq!(f.dialog_text(), "2 songs found");
}

#[test]
fn select_folder_rejects_missing_and_non_directories() {
    let mut f = Fixture::new(&["a.mp3"]);
    let library = f.services.settings.library.clone();

    let missing = f.dir.path().join("nope");
    assert!(!actions::select_folder(
        &mut f.app,
        &f.services.store,
        &library,
        missing.to_str().unwrap()
    ));
    assert_eq!(f.dialog_title(), Some("Error"));
    assert!(f.dialog_text().contains("does not exist"));

    let file = f.app.music_folder.join("a.mp3");
    assert!(!actions::select_folder(
        &mut f.app,
        &f.services.store,
        &library,
        file.to_str().unwrap()
    ));
    assert!(f.dialog_text().contains("not a folder"));

    assert!(!f.services.store.exists());
    assert_eq!(f.app.tracks.len(), 1);
}

#[test]
fn select_folder_persists_and_rescans() {
    let mut f = Fixture::new(&["a.mp3"]);
    let other = f.dir.path().join("other");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("x.mp3"), b"x").unwrap();
    fs::write(other.join("y.mp3"), b"x").unwrap();
    let library = f.services.settings.library.clone();

    assert!(actions::select_folder(
        &mut f.app,
        &f.services.store,
        &library,
        &format!("  {}  ", other.display())
    ));
    assert_eq!(f.app.music_folder, other);
    assert_eq!(f.services.store.get_music_folder(), other);
    assert_eq!(f.app.tracks.len(), 2);
    assert_eq!(f.dialog_title(), Some("Folder updated"));
    assert!(f.dialog_text().contains("2 songs found"));
}

#[test]
fn start_download_reports_validation_errors() {
    let mut f = Fixture::new(&[]);
    f.app.url_input = "https://example.com/song".into();
    actions::start_download(&mut f.app, &mut f.services.downloads);
    assert_eq!(f.dialog_title(), Some("Error"));
    assert_eq!(f.app.download_status, WAITING_FOR_URL);
    assert!(!f.services.downloads.is_downloading());
}

#[test]
fn finished_download_rescans_and_clears_url() {
    let mut f = Fixture::new(&["a.mp3"]);
    f.app.url_input = "https://youtu.be/abc".into();
    actions::start_download(&mut f.app, &mut f.services.downloads);
    assert_eq!(f.app.download_status, DOWNLOADING);

    let outcome = wait_for_download(&mut f);
    let library = f.services.settings.library.clone();
    actions::finish_download(&mut f.app, outcome, &library);

    assert_eq!(f.app.download_status, "Downloaded: fetched");
    assert!(f.app.url_input.is_empty());
    assert_eq!(f.app.tracks.len(), 2);
    assert_eq!(f.dialog_title(), Some("Success"));
}

#[test]
fn failed_download_keeps_url_and_shows_error() {
    let mut f = Fixture::new(&["a.mp3"]);
    f.app.url_input = "https://youtu.be/abc".into();
    let outcome = DownloadOutcome {
        success: false,
        message: DownloadError::MissingTranscoder.to_string(),
        title: None,
    };
    let library = f.services.settings.library.clone();
    actions::finish_download(&mut f.app, outcome, &library);

    assert_eq!(f.app.url_input, "https://youtu.be/abc");
    assert_eq!(f.dialog_title(), Some("Error"));
    assert!(f.app.download_status.contains("ffmpeg.org"));
}

#[test]
fn theme_changes_are_applied_and_saved() {
    let mut f = Fixture::new(&[]);
    actions::toggle_theme(&mut f.app, &f.services.store);
    actions::cycle_primary_color(&mut f.app, &f.services.store);

    assert_eq!(f.app.theme_style, ThemeStyle::Light);
    assert_eq!(f.app.primary_color, "Red");
    let saved = f.services.store.get_theme();
    assert_eq!(saved.theme_style, ThemeStyle::Light);
    assert_eq!(saved.primary_color, "Red");
}

#[test]
fn ensure_preferences_creates_the_file_once() {
    let dir = tempfile::tempdir().unwrap();
    let store = ConfigStore::new(dir.path().join(PREFS_FILE));
    ensure_preferences(&store);
    assert!(store.exists());

    store.set_theme(None, Some("Teal"));
    assert_eq!(ensure_preferences(&store).primary_color, "Teal");
}

#[test]
fn music_folder_argument_overrides_preference_and_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = Preferences {
        music_folder: dir.path().join("stored"),
        ..Preferences::default()
    };

    let arg = dir.path().join("from-cli");
    let folder = resolve_music_folder(Some(arg.clone().into_os_string()), &prefs);
    assert_eq!(folder, arg);
    assert!(arg.is_dir());

    let folder = resolve_music_folder(None, &prefs);
    assert_eq!(folder, dir.path().join("stored"));
    assert!(folder.is_dir());
}

#[test]
fn list_keys_navigate_play_and_quit() {
    let mut f = Fixture::new(&["a.mp3", "b.mp3", "c.mp3"]);
    assert!(!f.key(KeyCode::Char('j')));
    assert!(!f.key(KeyCode::Down));
    assert_eq!(f.app.selected, 2);
    f.key(KeyCode::Char('k'));
    assert_eq!(f.app.selected, 1);

    f.key(KeyCode::Enter);
    assert_eq!(f.app.screen, Screen::Player);
    assert!(f.services.player.is_loaded());
    assert_eq!(f.services.player.current_name(), Some("b.mp3"));

    // Back to the list keeps the music going.
    f.key(KeyCode::Esc);
    assert_eq!(f.app.screen, Screen::List);
    assert!(f.services.player.is_loaded());

    assert!(f.key(KeyCode::Char('q')));
}

#[test]
fn dialogs_swallow_keys_until_dismissed() {
    let mut f = Fixture::new(&["a.mp3"]);
    f.key(KeyCode::Char('a'));
    assert_eq!(f.dialog_title(), Some("About"));

    assert!(!f.key(KeyCode::Char('q')));
    f.key(KeyCode::Char('s'));
    assert_eq!(f.app.screen, Screen::List);

    f.key(KeyCode::Esc);
    assert!(f.app.dialog.is_none());
}

#[test]
fn settings_path_field_applies_on_enter() {
    let mut f = Fixture::new(&[]);
    let other = f.dir.path().join("other");
    fs::create_dir_all(&other).unwrap();
    fs::write(other.join("z.mp3"), b"x").unwrap();

    f.key(KeyCode::Char('s'));
    f.key(KeyCode::Char('e'));
    for _ in 0..f.app.folder_input.chars().count() {
        f.key(KeyCode::Backspace);
    }
    f.type_text(other.to_str().unwrap());
    f.key(KeyCode::Enter);

    assert!(f.app.editing.is_none());
    assert_eq!(f.app.music_folder, other);
    assert_eq!(f.app.tracks.len(), 1);
    assert_eq!(f.dialog_title(), Some("Folder updated"));
}

#[test]
fn player_seek_gesture_commits_or_cancels() {
    let mut f = Fixture::new(&["a.mp3"]);
    f.key(KeyCode::Enter);

    f.key(KeyCode::Char('g'));
    assert!(f.services.player.is_seeking());
    for _ in 0..25 {
        f.key(KeyCode::Right);
    }
    // Keys other than the gesture's are ignored meanwhile.
    f.key(KeyCode::Char('R'));
    assert!(!f.services.player.modes.repeat);

    f.key(KeyCode::Enter);
    assert!(!f.services.player.is_seeking());
    assert!(f.app.seek_preview.is_none());
    let elapsed = f.services.player.elapsed().unwrap();
    assert!(elapsed > Duration::from_secs(49) && elapsed < Duration::from_secs(52));

    f.key(KeyCode::Char('g'));
    f.key(KeyCode::Esc);
    assert!(!f.services.player.is_seeking());
    assert_eq!(f.app.screen, Screen::Player);
}

#[test]
fn seek_gesture_is_dropped_when_the_track_changes() {
    let mut f = Fixture::new(&["a.mp3", "b.mp3"]);
    f.key(KeyCode::Enter);

    f.key(KeyCode::Char('g'));
    for _ in 0..45 {
        f.key(KeyCode::Right);
    }
    assert!(f.app.seek_preview.is_some());

    // The advance after a finished track goes through the same reload.
    f.services.player.next();
    assert_eq!(f.services.player.current_name(), Some("b.mp3"));

    f.key(KeyCode::Enter);
    assert!(f.app.seek_preview.is_none());
    let elapsed = f.services.player.elapsed().unwrap();
    assert!(elapsed < Duration::from_secs(5));
}

#[test]
fn seek_preview_is_cleared_once_the_player_leaves_the_gesture() {
    let mut f = Fixture::new(&["a.mp3", "b.mp3"]);
    f.key(KeyCode::Enter);
    f.key(KeyCode::Char('g'));

    sync_seek_gesture(&mut f.app, &f.services.player);
    assert!(f.app.seek_preview.is_some());

    f.services.player.next();
    sync_seek_gesture(&mut f.app, &f.services.player);
    assert!(f.app.seek_preview.is_none());
}

#[test]
fn player_mode_and_jump_keys() {
    let mut f = Fixture::new(&["a.mp3", "b.mp3"]);
    f.key(KeyCode::Enter);

    f.key(KeyCode::Char('S'));
    f.key(KeyCode::Char('R'));
    assert!(f.services.player.modes.shuffle);
    assert!(f.services.player.modes.repeat);

    f.key(KeyCode::Char('7'));
    let elapsed = f.services.player.elapsed().unwrap();
    assert!(elapsed > Duration::from_secs(69) && elapsed < Duration::from_secs(72));

    f.key(KeyCode::Char(' '));
    assert!(f.services.player.is_paused());
    f.key(KeyCode::Char('p'));
    assert!(!f.services.player.is_paused());
}
