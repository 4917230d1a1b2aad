//! TOML-based user preferences.
//!
//! Stores:
//! - Session defaults (willpower, planned duration)
//! - Analytics window sizes (heatmap days, trend weeks)
//!
//! Configuration is stored at `~/.config/questline/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, CoreError, Result};
use crate::session::Willpower;

/// Session-start defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_willpower")]
    pub willpower: Willpower,
    #[serde(default = "default_planned_minutes")]
    pub planned_minutes: u32,
}

/// Analytics window sizes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default = "default_heatmap_days")]
    pub heatmap_days: usize,
    #[serde(default = "default_trend_weeks")]
    pub trend_weeks: usize,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/questline/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub session: SessionDefaults,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

// Default functions
fn default_willpower() -> Willpower {
    Willpower::Medium
}
fn default_planned_minutes() -> u32 {
    60
}
fn default_heatmap_days() -> usize {
    14
}
fn default_trend_weeks() -> usize {
    8
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            willpower: default_willpower(),
            planned_minutes: default_planned_minutes(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            heatmap_days: default_heatmap_days(),
            trend_weeks: default_trend_weeks(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session: SessionDefaults::default(),
            analytics: AnalyticsConfig::default(),
        }
    }
}

impl Config {
    fn path() -> std::io::Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load configuration, falling back to defaults when the file does
    /// not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        toml::from_str(&text).map_err(|e| {
            CoreError::Config(ConfigError::ParseFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeFailed(e.to_string()))?;
        std::fs::write(path, text)?;
        Ok(())
    }
}
