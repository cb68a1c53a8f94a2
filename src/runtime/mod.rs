use std::env;
use std::sync::Arc;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::config::{ConfigStore, Theme};
use crate::download::{DownloadTask, YtDlp};
use crate::library::find_music_files;
use crate::logging;
use crate::playback::{LoftyOracle, Player, RodioBackend, SystemClock};

mod actions;
mod event_loop;
mod settings;
mod startup;

#[cfg(test)]
mod tests;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_logging();
    logging::install_panic_hook();
    let settings = settings::load_settings();

    let store = ConfigStore::open_default();
    let prefs = startup::ensure_preferences(&store);
    let folder = startup::resolve_music_folder(env::args_os().nth(1), &prefs);

    let tracks = find_music_files(&folder, &settings.library);
    let mut app = App::new(
        tracks,
        folder,
        Theme {
            theme_style: prefs.theme_style,
            primary_color: prefs.primary_color,
        },
    );

    let player = Player::new(
        Box::new(RodioBackend::new()),
        Box::new(LoftyOracle),
        Box::new(SystemClock),
        settings.playback.clone(),
    );
    let downloads = DownloadTask::new(
        Arc::new(YtDlp::new(&settings.download)),
        settings.download.allowed_hosts.clone(),
    );
    let mut services = event_loop::Services {
        settings,
        store,
        player,
        downloads,
    };

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, &mut app, &mut services);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("=== Regina session ended ===");
    run_result
}
