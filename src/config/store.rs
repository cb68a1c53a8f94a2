//! Persisted user preferences (music folder and theme).
//!
//! The document is a flat JSON object. Every mutation is a read-modify-write
//! round trip through `load`/`save`; nothing is cached between calls. Keys this
//! version does not know about are carried through untouched.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::load::config_home;

/// File name of the preferences document.
pub const PREFS_FILE: &str = "music_player_config.json";

/// Primary colors offered by the settings screen, in cycling order.
pub const PRIMARY_COLORS: &[&str] = &[
    "Blue", "Red", "Green", "Purple", "Orange", "Teal", "Pink", "Amber",
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ThemeStyle {
    Light,
    #[default]
    Dark,
}

impl ThemeStyle {
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Parse a stored style name, ignoring case.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            n if n.eq_ignore_ascii_case("light") => Some(Self::Light),
            n if n.eq_ignore_ascii_case("dark") => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Dark => "Dark",
        }
    }
}

impl fmt::Display for ThemeStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Return the color following `current` in `PRIMARY_COLORS`, wrapping around.
///
/// Unknown colors restart the cycle at the first entry.
pub fn next_primary_color(current: &str) -> &'static str {
    let pos = PRIMARY_COLORS
        .iter()
        .position(|c| c.eq_ignore_ascii_case(current));
    match pos {
        Some(p) => PRIMARY_COLORS[(p + 1) % PRIMARY_COLORS.len()],
        None => PRIMARY_COLORS[0],
    }
}

/// The preferences document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preferences {
    pub music_folder: PathBuf,
    pub theme_style: ThemeStyle,
    pub primary_color: String,
    /// Keys written by other versions; preserved on save.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            music_folder: default_music_folder(),
            theme_style: ThemeStyle::Dark,
            primary_color: "Blue".to_string(),
            extra: Map::new(),
        }
    }
}

impl Preferences {
    /// Build preferences from a parsed document, one field at a time.
    ///
    /// A known key that is missing or malformed falls back to its default
    /// without affecting the others. Every other key lands in `extra`.
    pub fn from_document(mut doc: Map<String, Value>) -> Self {
        let defaults = Self::default();

        let music_folder = match doc.remove("music_folder") {
            Some(Value::String(s)) if !s.trim().is_empty() => PathBuf::from(s),
            Some(other) => {
                log::debug!("Ignoring malformed music_folder: {}", other);
                defaults.music_folder
            }
            None => defaults.music_folder,
        };

        let theme_style = match doc.remove("theme_style") {
            Some(Value::String(s)) => ThemeStyle::parse(&s).unwrap_or_else(|| {
                log::debug!("Ignoring unknown theme_style {:?}", s);
                defaults.theme_style
            }),
            Some(other) => {
                log::debug!("Ignoring malformed theme_style: {}", other);
                defaults.theme_style
            }
            None => defaults.theme_style,
        };

        let primary_color = match doc.remove("primary_color") {
            Some(Value::String(s)) if !s.trim().is_empty() => s,
            Some(other) => {
                log::debug!("Ignoring malformed primary_color: {}", other);
                defaults.primary_color
            }
            None => defaults.primary_color,
        };

        Self {
            music_folder,
            theme_style,
            primary_color,
            extra: doc,
        }
    }
}

/// Theme portion of the preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub theme_style: ThemeStyle,
    pub primary_color: String,
}

/// `~/Music`, or a relative `Music` when the home directory is unknown.
pub fn default_music_folder() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join("Music"))
        .unwrap_or_else(|| PathBuf::from("Music"))
}

/// Resolve the preferences path from `REGINA_PREFS_PATH`, the config
/// directory, or the working directory as a last resort.
pub fn default_prefs_path() -> PathBuf {
    if let Some(p) = env::var_os("REGINA_PREFS_PATH") {
        return PathBuf::from(p);
    }
    config_home()
        .map(|d| d.join("regina").join(PREFS_FILE))
        .unwrap_or_else(|| PathBuf::from(PREFS_FILE))
}

/// Reads and writes the preferences document at a fixed path.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `default_prefs_path()`.
    pub fn open_default() -> Self {
        Self::new(default_prefs_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load preferences, falling back to defaults when the file is absent or
    /// cannot be parsed.
    pub fn load(&self) -> Preferences {
        if !self.exists() {
            log::debug!("No preferences at {}, using defaults", self.path.display());
            return Preferences::default();
        }
        match self.try_load() {
            Ok(prefs) => prefs,
            Err(e) => {
                log::warn!("Using default preferences: {}", e);
                Preferences::default()
            }
        }
    }

    fn try_load(&self) -> Result<Preferences, String> {
        let contents = fs::read_to_string(&self.path)
            .map_err(|e| format!("Failed to read {}: {}", self.path.display(), e))?;

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(doc)) => Ok(Preferences::from_document(doc)),
            Ok(_) => Err(format!("{} is not a JSON object", self.path.display())),
            Err(e) => Err(format!("Failed to parse {}: {}", self.path.display(), e)),
        }
    }

    /// Overwrite the document with `prefs`. Returns `false` on any failure.
    pub fn save(&self, prefs: &Preferences) -> bool {
        match self.try_save(prefs) {
            Ok(()) => {
                log::debug!("Saved preferences to {}", self.path.display());
                true
            }
            Err(e) => {
                log::warn!("Error saving preferences: {}", e);
                false
            }
        }
    }

    fn try_save(&self, prefs: &Preferences) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }

        let json = serde_json::to_string_pretty(prefs)
            .map_err(|e| format!("Failed to serialize preferences: {}", e))?;

        fs::write(&self.path, json)
            .map_err(|e| format!("Failed to write {}: {}", self.path.display(), e))
    }

    pub fn get_music_folder(&self) -> PathBuf {
        self.load().music_folder
    }

    pub fn set_music_folder(&self, folder: &Path) -> bool {
        let mut prefs = self.load();
        prefs.music_folder = folder.to_path_buf();
        self.save(&prefs)
    }

    pub fn get_theme(&self) -> Theme {
        let prefs = self.load();
        Theme {
            theme_style: prefs.theme_style,
            primary_color: prefs.primary_color,
        }
    }

    /// Update only the given theme fields. An empty color counts as unset.
    pub fn set_theme(&self, theme_style: Option<ThemeStyle>, primary_color: Option<&str>) -> bool {
        let mut prefs = self.load();
        if let Some(style) = theme_style {
            prefs.theme_style = style;
        }
        if let Some(color) = primary_color.map(str::trim).filter(|c| !c.is_empty()) {
            prefs.primary_color = color.to_string();
        }
        self.save(&prefs)
    }
}
