// User configuration
// Loaded from a TOML file in the platform config directory, created with defaults on first run

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::mns_error::ConfigError;
use crate::mns_game::{Difficulty, MAX_SIDE, MIN_SIDE};

pub const APP_NAME: &str = "mnswpr";

/// Startup settings. Gameplay results are never written back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Difficulty the first game starts with
    pub difficulty: Difficulty,

    // Custom difficulty parameters
    pub custom_w: usize,
    pub custom_h: usize,
    pub custom_n: usize,

    // Display preferences
    pub ascii_icons: bool,    // Use ASCII fallback glyphs
    pub show_indicator: bool, // Mark the keyboard cursor with an arrow

    // Logging
    pub log_level: String, // trace, debug, info, warn, error or off
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>, // Defaults to the platform data directory
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: Difficulty::Easy,
            custom_w: 20,
            custom_h: 12,
            custom_n: 36,
            ascii_icons: false,
            show_indicator: false,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

impl Config {
    /// Parse a config document. A `Custom` difficulty is rebuilt from
    /// custom_w/h/n and checked for playability.
    pub fn from_toml_str(s: &str) -> Result<Config, ConfigError> {
        let mut cfg: Config = toml::from_str(s)?;
        if matches!(cfg.difficulty, Difficulty::Custom(_, _, _)) {
            let (w, h, n) = (cfg.custom_w, cfg.custom_h, cfg.custom_n);
            let sides_ok = (MIN_SIDE..=MAX_SIDE).contains(&w) && (MIN_SIDE..=MAX_SIDE).contains(&h);
            if !sides_ok || n == 0 || n >= w * h {
                return Err(ConfigError::InvalidCustom(w, h, n));
            }
            cfg.difficulty = Difficulty::Custom(w, h, n);
        }
        Ok(cfg)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", APP_NAME, APP_NAME)
}

/// Get the configuration file path
/// e.g. ~/.config/mnswpr/mnswpr.toml on Linux; falls back to the working directory
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let file = format!("{APP_NAME}.toml");
    if let Some(proj) = project_dirs() {
        return Ok(proj.config_dir().join(file));
    }
    env::current_dir()
        .map(|dir| dir.join(file))
        .map_err(|_| ConfigError::NoConfigDir)
}

/// Default log file location in the platform data directory
pub fn default_log_path() -> PathBuf {
    let file = format!("{APP_NAME}.log");
    match project_dirs() {
        Some(proj) => proj.data_local_dir().join(file),
        None => PathBuf::from(file),
    }
}

pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    Config::from_toml_str(&s)
}

pub fn write_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    let s = cfg.to_toml_string()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, s)?;
    Ok(())
}

/// Load configuration from disk, or write and return the defaults if the file is missing
pub fn load_or_create_config() -> Result<Config, ConfigError> {
    load_or_create_at(&config_path()?)
}

pub fn load_or_create_at(path: &Path) -> Result<Config, ConfigError> {
    if path.exists() {
        return load_from(path);
    }
    let cfg = Config::default();
    write_to(path, &cfg)?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        env::temp_dir()
            .join(format!("{APP_NAME}-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn defaults_round_trip() {
        let cfg = Config::default();
        let s = cfg.to_toml_string().unwrap();
        assert!(s.contains("difficulty = \"Easy\""));
        assert_eq!(Config::from_toml_str(&s).unwrap(), cfg);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = Config::from_toml_str("difficulty = \"Expert\"\n").unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Expert);
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.ascii_icons);
        assert_eq!(cfg.log_file, None);
    }

    #[test]
    fn custom_difficulty_is_rebuilt_from_fields() {
        let doc = "difficulty = \"Custom\"\ncustom_w = 12\ncustom_h = 8\ncustom_n = 20\n";
        let cfg = Config::from_toml_str(doc).unwrap();
        assert_eq!(cfg.difficulty, Difficulty::Custom(12, 8, 20));
    }

    #[test]
    fn unplayable_custom_is_rejected() {
        let doc = "difficulty = \"Custom\"\ncustom_w = 3\ncustom_h = 3\ncustom_n = 9\n";
        assert!(matches!(
            Config::from_toml_str(doc),
            Err(ConfigError::InvalidCustom(3, 3, 9))
        ));
        let doc = "difficulty = \"Custom\"\ncustom_w = 99\ncustom_h = 3\ncustom_n = 9\n";
        assert!(Config::from_toml_str(doc).is_err());
    }

    #[test]
    fn unknown_difficulty_is_a_parse_error() {
        assert!(matches!(
            Config::from_toml_str("difficulty = \"Nightmare\"\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_or_create_writes_defaults_then_reads_them() {
        let path = scratch_path("first-run/mnswpr.toml");
        let _ = fs::remove_file(&path);

        let created = load_or_create_at(&path).unwrap();
        assert_eq!(created, Config::default());
        assert!(path.exists());

        let mut edited = created.clone();
        edited.difficulty = Difficulty::Hard;
        edited.show_indicator = true;
        write_to(&path, &edited).unwrap();
        assert_eq!(load_or_create_at(&path).unwrap(), edited);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn corrupt_file_surfaces_an_error() {
        let path = scratch_path("corrupt/mnswpr.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "difficulty = [").unwrap();
        assert!(matches!(load_from(&path), Err(ConfigError::Parse(_))));
        let _ = fs::remove_file(&path);
    }
}
