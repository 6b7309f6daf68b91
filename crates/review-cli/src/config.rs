//! Configuration file loading for the review CLI.
//!
//! Settings live in a TOML file (`review.toml` by default) and every
//! field has a sensible default, so a missing file is not an error.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur when loading or parsing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse the configuration file as valid TOML.
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Review settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReviewConfig {
    /// Path to the UCI engine executable.
    /// Defaults to "stockfish" (assumes it's in PATH).
    #[serde(default = "default_engine_path")]
    pub engine_path: String,
    /// Target search depth per position. Defaults to 18.
    #[serde(default = "default_depth")]
    pub depth: u32,
    /// Number of candidate lines to request. Defaults to 1.
    #[serde(default = "default_multipv")]
    pub multipv: u32,
}

fn default_engine_path() -> String {
    "stockfish".to_string()
}

fn default_depth() -> u32 {
    18
}

fn default_multipv() -> u32 {
    1
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            engine_path: default_engine_path(),
            depth: default_depth(),
            multipv: default_multipv(),
        }
    }
}

impl ReviewConfig {
    /// Loads the configuration from the given path.
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }
}
