// Logging setup
// The terminal belongs to the UI, so events go to a plain-text log file

use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;

use crate::mns_config::{Config, default_log_path};

/// Parse the configured level, falling back to INFO on anything unknown
pub fn parse_level(s: &str) -> LevelFilter {
    s.trim().parse::<LevelFilter>().unwrap_or(LevelFilter::INFO)
}

pub fn log_path(cfg: &Config) -> PathBuf {
    cfg.log_file.clone().unwrap_or_else(default_log_path)
}

/// Install the global subscriber. Returns the file being written to.
pub fn init(cfg: &Config) -> Result<PathBuf, Box<dyn Error>> {
    let path = log_path(cfg);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_max_level(parse_level(&cfg.log_level))
        .try_init()
        .map_err(|e| e as Box<dyn Error>)?;
    Ok(path)
}
