//! Transcoder TUI: interactive terminal interface for coding transcripts.
//!
//! Provides a screen for running the coding pipeline on a `.docx` file and
//! a legend of the research categories, built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use std::fs::OpenOptions;
use std::sync::Mutex;

use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

/// Trace output file inside the config directory.
const LOG_FILE_NAME: &str = "transcoder-tui.log";

fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    init_tracing();
    app::run()
}

/// Send traces to `~/.transcoder/transcoder-tui.log`; the terminal belongs
/// to the UI. Logging is skipped if the file cannot be opened.
fn init_tracing() {
    let Ok(dir) = transcoder_shared::config_dir() else {
        return;
    };
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
    else {
        return;
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("transcoder=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
}
