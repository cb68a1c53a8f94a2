//! Application model types: `App`, `Screen`, `Dialog` and `InputField`.

use std::path::PathBuf;

use crate::config::{Theme, ThemeStyle};
use crate::library::Track;

/// Which screen is in front.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Screen {
    #[default]
    List,
    Player,
    Settings,
    Downloader,
}

/// A modal message box, dismissed with Enter or Esc.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub text: String,
}

/// Text fields that accept typed input.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputField {
    Folder,
    Url,
}

pub const WAITING_FOR_URL: &str = "Waiting for URL...";

/// The main application model.
pub struct App {
    pub tracks: Vec<Track>,
    pub selected: usize,
    pub screen: Screen,
    pub dialog: Option<Dialog>,

    pub music_folder: PathBuf,
    pub theme_style: ThemeStyle,
    pub primary_color: String,

    pub folder_input: String,
    pub url_input: String,
    pub editing: Option<InputField>,
    pub download_status: String,

    /// Pending position of an active seek gesture, as a fraction of the track.
    pub seek_preview: Option<f64>,
}

impl App {
    pub fn new(tracks: Vec<Track>, music_folder: PathBuf, theme: Theme) -> Self {
        let folder_input = music_folder.display().to_string();
        Self {
            tracks,
            selected: 0,
            screen: Screen::List,
            dialog: None,
            music_folder,
            theme_style: theme.theme_style,
            primary_color: theme.primary_color,
            folder_input,
            url_input: String::new(),
            editing: None,
            download_status: WAITING_FOR_URL.to_string(),
            seek_preview: None,
        }
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    /// Replace the library wholesale, keeping the cursor in range.
    pub fn set_tracks(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        if self.selected >= self.tracks.len() {
            self.selected = self.tracks.len().saturating_sub(1);
        }
    }

    /// Move selection to the next track, wrapping to the first.
    pub fn next(&mut self) {
        if self.has_tracks() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection to the previous track, wrapping to the last.
    pub fn prev(&mut self) {
        if self.has_tracks() {
            self.selected = match self.selected {
                0 => self.tracks.len() - 1,
                i => i - 1,
            };
        }
    }

    pub fn show_dialog(&mut self, title: impl Into<String>, text: impl Into<String>) {
        self.dialog = Some(Dialog {
            title: title.into(),
            text: text.into(),
        });
    }

    pub fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }

    pub fn show_about(&mut self) {
        self.show_dialog(
            "About",
            format!(
                "Regina {}\n\nA terminal music player built with ratatui and rodio.",
                env!("CARGO_PKG_VERSION")
            ),
        );
    }

    /// Switch screens, dropping any half-finished edit or seek gesture.
    pub fn open_screen(&mut self, screen: Screen) {
        self.editing = None;
        self.seek_preview = None;
        if screen == Screen::Settings {
            self.folder_input = self.music_folder.display().to_string();
        }
        self.screen = screen;
    }

    pub fn begin_edit(&mut self, field: InputField) {
        self.editing = Some(field);
    }

    pub fn finish_edit(&mut self) {
        self.editing = None;
    }

    fn input_mut(&mut self) -> Option<&mut String> {
        match self.editing? {
            InputField::Folder => Some(&mut self.folder_input),
            InputField::Url => Some(&mut self.url_input),
        }
    }

    pub fn push_input_char(&mut self, c: char) {
        if let Some(input) = self.input_mut() {
            input.push(c);
        }
    }

    pub fn pop_input_char(&mut self) {
        if let Some(input) = self.input_mut() {
            input.pop();
        }
    }

    pub fn begin_seek_preview(&mut self, fraction: f64) {
        self.seek_preview = Some(fraction.clamp(0.0, 1.0));
    }

    /// Move the pending seek position by `delta`, clamped to the track.
    pub fn nudge_seek_preview(&mut self, delta: f64) {
        if let Some(f) = self.seek_preview.as_mut() {
            *f = (*f + delta).clamp(0.0, 1.0);
        }
    }

    pub fn take_seek_preview(&mut self) -> Option<f64> {
        self.seek_preview.take()
    }
}
