//! Configuration management for Keyprobe
//!
//! Capture timings and file locations are read from a TOML file in the
//! platform config directory. A missing file means defaults.
//!
//! ## Config File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/keyprobe/config.toml` |
//! | macOS | `~/Library/Application Support/keyprobe/config.toml` |
//! | Windows | `%APPDATA%\keyprobe\config.toml` |
//!
//! ## Example
//!
//! ```no_run
//! use keyprobe::Config;
//!
//! let mut config = Config::load().unwrap_or_default();
//! config.capture.timeout_ms = 5000;
//! config.save().expect("Failed to save config");
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Error type for configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to determine config directory
    #[error("Could not determine config directory")]
    NoConfigDir,
    /// IO error reading or writing config file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Failed to parse config file
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Failed to serialize config
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the config file.
///
/// Creates the config directory if it doesn't exist.
pub fn config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    let app_dir = config_dir.join("keyprobe");

    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }

    Ok(app_dir.join("config.toml"))
}

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Capture session timings
    #[serde(default)]
    pub capture: CaptureConfig,
    /// File locations
    #[serde(default)]
    pub paths: PathsConfig,
}

/// Timings for one capture session, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Wait after launching the helper before touching the keyboard
    pub settle_ms: u64,
    /// Budget for the helper to print and exit after the chord
    pub timeout_ms: u64,
    /// Pause between modifier events
    pub modifier_gap_ms: u64,
    /// How long the target key is held down
    pub key_hold_ms: u64,
    /// Pause after a successful focus change
    pub focus_settle_ms: u64,
    /// How long to wait for helper pipes to close after exit or kill
    pub drain_grace_ms: u64,
    /// Launch the helper in its own console window (Windows)
    pub new_console: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            settle_ms: 800,
            timeout_ms: 3000,
            modifier_gap_ms: 50,
            key_hold_ms: 100,
            focus_settle_ms: 200,
            drain_grace_ms: 500,
            new_console: true,
        }
    }
}

impl CaptureConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn modifier_gap(&self) -> Duration {
        Duration::from_millis(self.modifier_gap_ms)
    }

    pub fn key_hold(&self) -> Duration {
        Duration::from_millis(self.key_hold_ms)
    }

    pub fn focus_settle(&self) -> Duration {
        Duration::from_millis(self.focus_settle_ms)
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

/// Where the helper lives and where results go
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Explicit helper binary; searched for when unset
    pub helper: Option<PathBuf>,
    /// Arguments passed to the helper on every launch
    pub helper_args: Vec<String>,
    /// JSON result store
    pub store: PathBuf,
    /// Human-readable companion of the store
    pub text_report: PathBuf,
    /// Append-only run log
    pub log: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            helper: None,
            helper_args: Vec::new(),
            store: PathBuf::from("keyboard_capture.json"),
            text_report: PathBuf::from("keyboard_capture.txt"),
            log: PathBuf::from("keyprobe.log"),
        }
    }
}

impl PathsConfig {
    /// Point the store at `store` and keep the text report beside it,
    /// with the same stem and a `.txt` extension.
    pub fn relocate_store(&mut self, store: PathBuf) {
        let mut text = store.with_extension("txt");
        if text == store {
            let mut name = store.clone().into_os_string();
            name.push(".txt");
            text = PathBuf::from(name);
        }
        self.text_report = text;
        self.store = store;
    }
}

impl Config {
    /// Load configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default config file.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = config_path()?;
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
