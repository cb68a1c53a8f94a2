use serde::Deserialize;

/// Top-level runtime settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/regina/config.toml` or `~/.config/regina/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `REGINA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub library: LibrarySettings,
    pub playback: PlaybackSettings,
    pub download: DownloadSettings,
    pub controls: ControlsSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// File extensions to treat as audio (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks during scanning. Loops are detected and skipped.
    pub follow_links: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            extensions: vec!["mp3".into(), "mp4".into()],
            follow_links: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Progress refresh period (milliseconds).
    pub tick_ms: u64,
    /// End-of-track check period (milliseconds).
    pub end_check_ms: u64,
    /// A track counts as finished this long before its duration (milliseconds).
    pub end_margin_ms: u64,
    /// Grace delay between a finished track and loading the next one (milliseconds).
    pub advance_delay_ms: u64,
    /// Divisor for the size-based duration estimate when metadata is unreadable.
    pub fallback_bytes_per_second: u64,
    /// Duration assumed when neither metadata nor file size is available.
    pub fallback_duration_secs: u64,
    /// Whether shuffle starts enabled.
    pub shuffle: bool,
    /// Whether repeat-one starts enabled.
    pub repeat: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            tick_ms: 100,
            end_check_ms: 500,
            end_margin_ms: 500,
            advance_delay_ms: 200,
            fallback_bytes_per_second: 20_000,
            fallback_duration_secs: 180,
            shuffle: false,
            repeat: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DownloadSettings {
    /// Executable used to fetch and extract audio.
    pub program: String,
    /// Target audio codec passed to the extractor.
    pub audio_format: String,
    /// Target audio quality (kbps for lossy formats).
    pub audio_quality: String,
    /// A URL must contain one of these host fragments to be accepted.
    pub allowed_hosts: Vec<String>,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            audio_format: "mp3".to_string(),
            audio_quality: "192".to_string(),
            allowed_hosts: vec!["youtube.com".into(), "youtu.be".into()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self { scrub_seconds: 5 }
    }
}
