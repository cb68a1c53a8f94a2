//! UI rendering for the terminal user interface.
//!
//! One `draw` entry point renders the header, the active screen, the controls
//! footer and any open dialog using `ratatui`.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::{App, InputField, Screen};
use crate::config::{ControlsSettings, ThemeStyle};
use crate::playback::{PlayModes, Player, Progress, format_time};

/// Snapshot of the player that the screens render.
#[derive(Debug, Clone, Default)]
pub struct PlayerView {
    pub name: Option<String>,
    pub progress: Progress,
    pub duration: Option<Duration>,
    pub loaded: bool,
    pub paused: bool,
    pub modes: PlayModes,
}

impl From<&Player> for PlayerView {
    fn from(p: &Player) -> Self {
        Self {
            name: p.current_name().map(str::to_string),
            progress: p.progress().clone(),
            duration: p.duration(),
            loaded: p.is_loaded(),
            paused: p.is_paused(),
            modes: p.modes,
        }
    }
}

/// Terminal color for a named primary color. Unknown names fall back to blue.
pub fn accent_color(name: &str) -> Color {
    match name.to_ascii_lowercase().as_str() {
        "red" => Color::Red,
        "green" => Color::Green,
        "purple" => Color::Magenta,
        "orange" => Color::Rgb(255, 140, 0),
        "teal" => Color::Cyan,
        "pink" => Color::LightMagenta,
        "amber" => Color::Rgb(255, 191, 0),
        _ => Color::Blue,
    }
}

fn base_style(theme: ThemeStyle) -> Style {
    match theme {
        ThemeStyle::Dark => Style::default().fg(Color::White).bg(Color::Black),
        ThemeStyle::Light => Style::default().fg(Color::Black).bg(Color::White),
    }
}

/// Controls help for the footer of `screen`.
pub fn controls_text(screen: Screen, editing: bool, scrub_seconds: u64) -> String {
    if editing {
        return "[type] edit | [backspace] delete | [enter] apply | [esc] stop editing".to_string();
    }
    let keys: Vec<String> = match screen {
        Screen::List => [
            "[j/k] up/down",
            "[enter] play",
            "[r] refresh",
            "[s] settings",
            "[d] download",
            "[a] about",
            "[q] quit",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        Screen::Player => vec![
            "[space/p] play/pause".to_string(),
            "[h/l] prev/next".to_string(),
            format!("[H/L] scrub -/+{}s", scrub_seconds),
            "[0-9] jump".to_string(),
            "[g] seek".to_string(),
            "[S] shuffle".to_string(),
            "[R] repeat".to_string(),
            "[esc] back".to_string(),
        ],
        Screen::Settings => [
            "[e] edit folder",
            "[t] light/dark",
            "[c] next color",
            "[esc] back",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect(),
        Screen::Downloader => ["[i/enter] edit URL", "[esc] back"]
            .iter()
            .map(|s| s.to_string())
            .collect(),
    };
    keys.join(" | ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "ON" } else { "OFF" }
}

fn padded<'a>(title: impl Into<Line<'a>>) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render a text field, marking it while it is being edited.
fn field_text(value: &str, editing: bool) -> String {
    if editing {
        format!("{}_", value)
    } else {
        value.to_string()
    }
}

/// Render the entire UI into `frame`.
pub fn draw(frame: &mut Frame, app: &App, player: &PlayerView, controls: &ControlsSettings) {
    let accent = accent_color(&app.primary_color);
    let area = frame.area();
    frame.render_widget(Block::default().style(base_style(app.theme_style)), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(area);

    let screen_name = match app.screen {
        Screen::List => "songs",
        Screen::Player => "now playing",
        Screen::Settings => "settings",
        Screen::Downloader => "downloader",
    };
    let header = Paragraph::new(screen_name)
        .alignment(Alignment::Center)
        .style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" regina ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    match app.screen {
        Screen::List => draw_list(frame, app, accent, chunks[1]),
        Screen::Player => draw_player(frame, app, player, accent, chunks[1]),
        Screen::Settings => draw_settings(frame, app, accent, chunks[1]),
        Screen::Downloader => draw_downloader(frame, app, accent, chunks[1]),
    }

    let footer = Paragraph::new(controls_text(
        app.screen,
        app.editing.is_some(),
        controls.scrub_seconds,
    ))
    .block(padded(" controls "))
    .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[2]);

    if let Some(dialog) = &app.dialog {
        let popup_area = centered_rect_sized(60, 9, chunks[1]);
        frame.render_widget(Clear, popup_area);
        let text = format!("{}\n\n[enter] OK", dialog.text);
        let popup = Paragraph::new(text)
            .style(base_style(app.theme_style))
            .block(padded(format!(" {} ", dialog.title)).border_style(Style::default().fg(accent)))
            .wrap(Wrap { trim: false });
        frame.render_widget(popup, popup_area);
    }
}

fn draw_list(frame: &mut Frame, app: &App, accent: Color, area: Rect) {
    let title = format!(" {} songs | {} ", app.tracks.len(), app.music_folder.display());
    if !app.has_tracks() {
        let empty = Paragraph::new(format!(
            "No songs found in {}\n\nPress s to choose a folder or d to download one.",
            app.music_folder.display()
        ))
        .block(padded(title))
        .wrap(Wrap { trim: true });
        frame.render_widget(empty, area);
        return;
    }

    // Only build items for the visible window, keeping the selection centered.
    let total = app.tracks.len();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = if total <= height || height == 0 {
        (0, total)
    } else {
        let half = height / 2;
        let start = app.selected.saturating_sub(half).min(total - height);
        (start, start + height)
    };

    let items: Vec<ListItem> = app.tracks[start..end]
        .iter()
        .map(|t| ListItem::new(t.name.as_str()))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(accent)
                .add_modifier(Modifier::REVERSED | Modifier::BOLD),
        )
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.selected - start));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_player(frame: &mut Frame, app: &App, player: &PlayerView, accent: Color, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let state = if !player.loaded {
        "Stopped"
    } else if player.paused {
        "Paused"
    } else {
        "Playing"
    };
    let name = player.name.as_deref().unwrap_or("Nothing playing");
    let title = Paragraph::new(name)
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(padded(format!(" {} ", state)));
    frame.render_widget(title, rows[0]);

    let (ratio, label) = match app.seek_preview {
        Some(f) => {
            let target = player.duration.map(|d| d.mul_f64(f)).unwrap_or_default();
            (f, format!("seek to {} (enter/esc)", format_time(target)))
        }
        None => (
            player.progress.fraction,
            format!(
                "{} / {}",
                player.progress.elapsed_text, player.progress.duration_text
            ),
        ),
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(accent))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(label);
    frame.render_widget(gauge, rows[1]);

    let modes = Paragraph::new(format!(
        "Shuffle: {} • Repeat: {}",
        on_off(player.modes.shuffle),
        on_off(player.modes.repeat)
    ))
    .alignment(Alignment::Center)
    .block(padded(" modes "));
    frame.render_widget(modes, rows[2]);
}

fn draw_settings(frame: &mut Frame, app: &App, accent: Color, area: Rect) {
    let editing = app.editing == Some(InputField::Folder);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let folder_block = if editing {
        padded(" music folder ").border_style(Style::default().fg(accent))
    } else {
        padded(" music folder ")
    };
    frame.render_widget(
        Paragraph::new(field_text(&app.folder_input, editing)).block(folder_block),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(app.theme_style.as_str()).block(padded(" theme ")),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(app.primary_color.as_str())
            .style(Style::default().fg(accent))
            .block(padded(" primary color ")),
        rows[2],
    );
}

fn draw_downloader(frame: &mut Frame, app: &App, accent: Color, area: Rect) {
    let editing = app.editing == Some(InputField::Url);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(0),
        ])
        .split(area);

    let url_block = if editing {
        padded(" URL ").border_style(Style::default().fg(accent))
    } else {
        padded(" URL ")
    };
    frame.render_widget(
        Paragraph::new(field_text(&app.url_input, editing)).block(url_block),
        rows[0],
    );
    frame.render_widget(
        Paragraph::new(app.download_status.as_str())
            .block(padded(" status "))
            .wrap(Wrap { trim: true }),
        rows[1],
    );
    frame.render_widget(
        Paragraph::new(format!("Audio is saved to {}", app.music_folder.display()))
            .block(padded(" destination ")),
        rows[2],
    );
}
