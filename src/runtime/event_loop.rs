use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, InputField, Screen};
use crate::config::{ConfigStore, Settings};
use crate::download::DownloadTask;
use crate::playback::Player;
use crate::ui::{self, PlayerView};

use super::actions;

/// Step of one Left/Right press during a seek gesture.
const SEEK_GESTURE_STEP: f64 = 0.02;

/// Everything the event loop drives besides the `App` model.
pub struct Services {
    pub settings: Settings,
    pub store: ConfigStore,
    pub player: Player,
    pub downloads: DownloadTask,
}

/// Main terminal event loop: runs due player timers, drains download
/// outcomes, draws and handles keys. Returns `Ok(())` when quit is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    services: &mut Services,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        services.player.run_due();
        sync_seek_gesture(app, &services.player);

        while let Some(outcome) = services.downloads.poll() {
            actions::finish_download(app, outcome, &services.settings.library);
        }

        let view = PlayerView::from(&services.player);
        terminal.draw(|f| ui::draw(f, app, &view, &services.settings.controls))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, services) {
                    break;
                }
            }
        }
    }

    services.player.stop();
    Ok(())
}

/// Drop a pending seek position once the player has left the gesture, e.g.
/// because the track ended and the next one was loaded.
pub fn sync_seek_gesture(app: &mut App, player: &Player) {
    if app.seek_preview.is_some() && !player.is_seeking() {
        log::debug!("Seek gesture abandoned: track changed");
        app.take_seek_preview();
    }
}

/// Apply one key press. Returns `true` when the app should quit.
pub fn handle_key_event(key: KeyEvent, app: &mut App, services: &mut Services) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    if app.dialog.is_some() {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
            app.dismiss_dialog();
        }
        return false;
    }

    if let Some(field) = app.editing {
        handle_edit_key(key, field, app, services);
        return false;
    }

    match app.screen {
        Screen::List => return handle_list_key(key, app, services),
        Screen::Player => handle_player_key(key, app, services),
        Screen::Settings => match key.code {
            KeyCode::Char('e') => app.begin_edit(InputField::Folder),
            KeyCode::Char('t') => actions::toggle_theme(app, &services.store),
            KeyCode::Char('c') => actions::cycle_primary_color(app, &services.store),
            KeyCode::Esc => app.open_screen(Screen::List),
            _ => {}
        },
        Screen::Downloader => match key.code {
            KeyCode::Char('i') | KeyCode::Enter => app.begin_edit(InputField::Url),
            KeyCode::Esc => app.open_screen(Screen::List),
            _ => {}
        },
    }
    false
}

fn handle_edit_key(key: KeyEvent, field: InputField, app: &mut App, services: &mut Services) {
    match key.code {
        KeyCode::Esc => app.finish_edit(),
        KeyCode::Backspace => app.pop_input_char(),
        KeyCode::Enter => {
            app.finish_edit();
            match field {
                InputField::Folder => {
                    let input = app.folder_input.clone();
                    actions::select_folder(app, &services.store, &services.settings.library, &input);
                }
                InputField::Url => actions::start_download(app, &mut services.downloads),
            }
        }
        KeyCode::Char(c) if !c.is_control() => app.push_input_char(c),
        _ => {}
    }
}

fn handle_list_key(key: KeyEvent, app: &mut App, services: &mut Services) -> bool {
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => {
            if app.has_tracks() {
                match services.player.play(app.tracks.clone(), app.selected) {
                    Ok(()) => app.open_screen(Screen::Player),
                    Err(e) => {
                        let text =
                            format!("Could not play {}:\n{}", app.tracks[app.selected].name, e);
                        app.show_dialog("Error", text);
                    }
                }
            }
        }
        KeyCode::Char('r') => {
            actions::refresh_library(app, &services.store, &services.settings.library)
        }
        KeyCode::Char('s') => app.open_screen(Screen::Settings),
        KeyCode::Char('d') => app.open_screen(Screen::Downloader),
        KeyCode::Char('a') => app.show_about(),
        _ => {}
    }
    false
}

fn handle_player_key(key: KeyEvent, app: &mut App, services: &mut Services) {
    sync_seek_gesture(app, &services.player);
    let player = &mut services.player;

    if app.seek_preview.is_some() {
        match key.code {
            KeyCode::Left => app.nudge_seek_preview(-SEEK_GESTURE_STEP),
            KeyCode::Right => app.nudge_seek_preview(SEEK_GESTURE_STEP),
            KeyCode::Enter => {
                if let Some(fraction) = app.take_seek_preview() {
                    player.end_seek(fraction);
                }
            }
            KeyCode::Esc => {
                app.take_seek_preview();
                player.cancel_seek();
            }
            _ => {}
        }
        return;
    }

    let scrub = services.settings.controls.scrub_seconds as i64;
    match key.code {
        KeyCode::Char(' ') | KeyCode::Char('p') => player.toggle_pause(),
        KeyCode::Char('l') | KeyCode::Char('n') => player.next(),
        KeyCode::Char('h') | KeyCode::Char('b') => player.previous(),
        KeyCode::Char('L') => player.seek_by(scrub),
        KeyCode::Char('H') => player.seek_by(-scrub),
        KeyCode::Char(c @ '0'..='9') => {
            if player.is_loaded() {
                let tenth = f64::from(c.to_digit(10).unwrap_or(0)) / 10.0;
                player.begin_seek();
                player.end_seek(tenth);
            }
        }
        KeyCode::Char('g') => {
            if player.is_loaded() {
                player.begin_seek();
                app.begin_seek_preview(player.progress().fraction);
            }
        }
        KeyCode::Char('S') => player.toggle_shuffle(),
        KeyCode::Char('R') => player.toggle_repeat(),
        KeyCode::Esc => app.open_screen(Screen::List),
        _ => {}
    }
}
