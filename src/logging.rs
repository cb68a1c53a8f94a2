//! File logging.
//!
//! The TUI owns the terminal, so records only go to
//! `<data_local_dir>/regina/logs/regina.log`.

use log::LevelFilter;
use simplelog::{ConfigBuilder, WriteLogger};
use std::any::Any;
use std::fs::{self, OpenOptions};
use std::io;
use std::panic;
use std::path::{Path, PathBuf};
use std::thread;

const LOG_FILE: &str = "regina.log";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

pub fn get_log_directory() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("regina").join("logs"))
}

/// Move `path` aside to `<path>.old` once it grows past `limit` bytes.
fn rotate_if_large(path: &Path, limit: u64) -> io::Result<bool> {
    match fs::metadata(path) {
        Ok(meta) if meta.len() > limit => {
            let mut backup = path.as_os_str().to_owned();
            backup.push(".old");
            fs::rename(path, PathBuf::from(backup))?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Install the file logger. Returns the log path, or `None` when logging
/// could not be set up (a warning is printed before the TUI starts).
pub fn init_logging() -> Option<PathBuf> {
    let log_dir = match get_log_directory() {
        Some(d) => d,
        None => {
            eprintln!("Warning: Could not determine log directory");
            return None;
        }
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        return None;
    }

    let log_path = log_dir.join(LOG_FILE);
    if let Err(e) = rotate_if_large(&log_path, MAX_LOG_BYTES) {
        eprintln!("Warning: Could not rotate log file: {}", e);
    }

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            return None;
        }
    };

    let config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build();

    if WriteLogger::init(LevelFilter::Debug, config, log_file).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::info!("=== Regina session started ===");
    log::info!("Log file: {}", log_path.display());

    Some(log_path)
}

/// One log line describing a panic.
fn panic_report(thread: &str, payload: &(dyn Any + Send), location: Option<&str>) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Box<dyn Any>".to_string());
    match location {
        Some(at) => format!("thread '{}' panicked at {}: {}", thread, at, message),
        None => format!("thread '{}' panicked: {}", thread, message),
    }
}

/// Send panic reports to the log file.
///
/// Background threads must not write to stderr while the alternate screen is
/// up. A panic on the main thread still reaches the previous hook as well,
/// since it ends the program.
pub fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let current = thread::current();
        let name = current.name().unwrap_or("<unnamed>");
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
        log::error!("{}", panic_report(name, info.payload(), location.as_deref()));

        if name == "main" {
            previous(info);
        }
    }));
}
