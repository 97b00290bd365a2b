//! Game configuration.
//!
//! Configuration is a small JSON document; every field is optional and
//! falls back to the default below.
//!
//! ```json
//! { "rows": 10, "cols": 24, "hearts": 3, "time_limit_secs": 120 }
//! ```

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Smallest accepted board side: a wall ring around a single free cell.
pub const MIN_BOARD_SIDE: u16 = 3;

/// Configuration for levels and sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Number of rows in every level.
    pub rows: u16,
    /// Number of columns in every level.
    pub cols: u16,
    /// Cell count of the big ship.
    pub big_ship_size: usize,
    /// Cell count of the small ship.
    pub small_ship_size: usize,
    /// Cell count of the portal.
    pub portal_size: usize,
    /// Lives at the start of a level.
    pub hearts: u32,
    /// Time allowed per level in seconds (0 = unlimited).
    pub time_limit_secs: u64,
    /// Recordings kept in a records directory.
    pub max_records: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 10,
            cols: 24,
            big_ship_size: 2,
            small_ship_size: 1,
            portal_size: 1,
            hearts: 3,
            time_limit_secs: 120,
            max_records: 10,
        }
    }
}

impl GameConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid JSON, or
    /// fails [`GameConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_json(&text)?;
        tracing::info!(path = %path.display(), ?config, "loaded configuration");
        Ok(config)
    }

    /// Parse and validate a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON or the values are
    /// out of range.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the values describe a playable board.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_BOARD_SIDE || self.cols < MIN_BOARD_SIDE {
            return Err(ConfigError::Invalid(format!(
                "board must be at least {MIN_BOARD_SIDE}x{MIN_BOARD_SIDE}, got {}x{}",
                self.rows, self.cols
            )));
        }
        let sizes = [
            ("big_ship_size", self.big_ship_size),
            ("small_ship_size", self.small_ship_size),
            ("portal_size", self.portal_size),
        ];
        if let Some((name, _)) = sizes.iter().find(|(_, size)| *size == 0) {
            return Err(ConfigError::Invalid(format!("{name} must be at least 1")));
        }
        if self.hearts == 0 {
            return Err(ConfigError::Invalid("hearts must be at least 1".to_string()));
        }
        if self.max_records == 0 {
            return Err(ConfigError::Invalid(
                "max_records must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error loading a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read.
    Io {
        /// File that failed.
        path: String,
        /// Underlying error message.
        message: String,
    },
    /// The file is not valid configuration JSON.
    Parse(String),
    /// A value is out of range.
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "Failed to read config {path}: {message}"),
            Self::Parse(e) => write!(f, "Invalid config: {e}"),
            Self::Invalid(e) => write!(f, "Invalid config value: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}
