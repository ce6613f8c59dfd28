//! Editor configuration, loadable from TOML.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Tunable editor defaults. Every field has a default, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Width/height/depth used by the plain "add box" entry points.
    pub default_box_size: [f64; 3],
    /// Radius used by the plain "add sphere" entry points.
    pub default_sphere_radius: f64,
    /// Delay between history-playback ticks, driven by the host.
    pub playback_interval_ms: u64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            default_box_size: [1.0, 1.0, 1.0],
            default_sphere_radius: 0.5,
            playback_interval_ms: 500,
        }
    }
}

/// Errors loading a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for this schema.
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl EditorConfig {
    /// Parse a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::from_toml_str(&text)?)
    }
}
