// Entry point for the Minesweeper TUI application
// Loads configuration, sets up file logging, and launches the main UI

use std::error::Error;
use tracing::{info, warn};

// Module declarations
mod mns_board;  // Minefield model, reveal/flag rules, flood reveal
mod mns_color;  // Cross-platform color matching and glyph palette
mod mns_config; // TOML configuration file
mod mns_error;  // Board and config error types
mod mns_game;   // Game session: difficulty presets, cursor, timer
mod mns_log;    // File-backed tracing subscriber
mod mns_ui;     // Terminal UI rendering and event handling

use mns_config::{Config, load_or_create_config};
use mns_ui::run as run_ui;

fn main() -> Result<(), Box<dyn Error>> {
    // A broken config file should not stop the game; fall back and report once logging is up
    let (cfg, cfg_error) = match load_or_create_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (Config::default(), Some(e)),
    };

    let log_path = mns_log::init(&cfg)?;
    if let Some(e) = cfg_error {
        warn!(error = %e, "using default configuration");
    }
    info!(log = %log_path.display(), difficulty = cfg.difficulty.name(), "starting");

    run_ui(&cfg)
}
