// Error types for the board model and the configuration loader

use thiserror::Error;

/// Failures surfaced by board construction and coordinate-based operations.
/// Both are raised before any state is touched.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("invalid board configuration: {width}x{height} with {mines} mines")]
    InvalidConfiguration {
        width: usize,
        height: usize,
        mines: usize,
    },
    #[error("coordinate ({x}, {y}) is outside the board")]
    OutOfBounds { x: usize, y: usize },
}

pub type Result<T> = core::result::Result<T, BoardError>;

/// Failures while locating, reading or writing the TOML config file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no usable configuration directory")]
    NoConfigDir,
    #[error("config file i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("custom difficulty {0}x{1} with {2} mines is not playable")]
    InvalidCustom(usize, usize, usize),
}
