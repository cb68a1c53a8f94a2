mod app;
mod config;
mod download;
mod library;
mod logging;
mod playback;
mod runtime;
mod ui;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    runtime::run()
}
