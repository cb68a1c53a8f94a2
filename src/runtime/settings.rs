use crate::config::{self, Settings};

/// Load and validate settings. Any problem is reported and the defaults are
/// used instead, so a broken config file never keeps the player from starting.
pub fn load_settings() -> Settings {
    let source = config::resolve_config_path()
        .filter(|p| p.is_file())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "defaults".to_string());

    let problem = match Settings::load() {
        Ok(settings) => match settings.validate() {
            Ok(()) => {
                log::info!(
                    "Settings loaded from {} (tick {}ms, end check {}ms, {} extensions)",
                    source,
                    settings.playback.tick_ms,
                    settings.playback.end_check_ms,
                    settings.library.extensions.len()
                );
                return settings;
            }
            Err(msg) => format!("invalid config: {msg}"),
        },
        Err(e) => format!("failed to load config: {e}"),
    };

    eprintln!("regina: {problem}, using defaults");
    log::warn!("Settings from {} rejected ({}), using defaults", source, problem);
    Settings::default()
}
