//! handpan - a D Kurd handpan in the terminal
//!
//! Run with: cargo run --bin handpan
//!
//! Logs go to `handpan.log`; an optional `handpan.toml` in the working
//! directory overrides engine settings.

mod app;
mod ui;

use std::{fs::File, path::Path, sync::Arc};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use handpan_dsp::{
    platform::{CpalHost, NativeProbe},
    EngineConfig, HandpanEngine,
};
use tracing::{info, warn, Level};

use app::HandpanApp;

const LOG_FILE: &str = "handpan.log";
const CONFIG_FILE: &str = "handpan.toml";

fn main() -> EyreResult<()> {
    color_eyre::install()?;

    // The terminal belongs to the UI, so logs go to a file.
    let log = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {LOG_FILE}"))?;
    tracing_subscriber::fmt()
        .with_writer(Arc::new(log))
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let config = load_config(Path::new(CONFIG_FILE))?;
    info!(?config, "starting handpan");

    let mut engine = HandpanEngine::new(Box::new(CpalHost::new()), Box::new(NativeProbe), config);
    // Open the device up front; sound still waits for the first key, which
    // retries if this fails.
    if let Err(err) = engine.initialize() {
        warn!(%err, "audio device unavailable at startup");
    }

    let mut terminal = ratatui::init();
    let result = HandpanApp::new(engine).run(&mut terminal);
    ratatui::restore();
    result
}

fn load_config(path: &Path) -> EyreResult<EngineConfig> {
    if !path.exists() {
        return Ok(EngineConfig::default());
    }
    let source = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    EngineConfig::from_toml_str(&source).wrap_err_with(|| format!("invalid {}", path.display()))
}
