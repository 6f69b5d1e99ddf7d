//! Configuration file support for GymForge.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gymforge/config.toml`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub progression: ProgressionConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Progression parameters configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgressionConfig {
    /// Level at which a member may choose a class
    #[serde(default = "default_class_unlock_level")]
    pub class_unlock_level: u32,

    /// Visit length that earns the long-visit bonus
    #[serde(default = "default_long_visit_minutes")]
    pub long_visit_minutes: i64,

    /// Base experience awarded for a qualifying long visit
    #[serde(default = "default_long_visit_bonus_exp")]
    pub long_visit_bonus_exp: u64,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            class_unlock_level: default_class_unlock_level(),
            long_visit_minutes: default_long_visit_minutes(),
            long_visit_bonus_exp: default_long_visit_bonus_exp(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| {
        let home = std::env::var("HOME").expect("HOME environment variable not set");
        PathBuf::from(home).join(".local/share")
    });
    base.join("gymforge")
}

fn default_class_unlock_level() -> u32 {
    5
}

fn default_long_visit_minutes() -> i64 {
    45
}

fn default_long_visit_bonus_exp() -> u64 {
    10
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| {
            let home = std::env::var("HOME").expect("HOME environment variable not set");
            PathBuf::from(home).join(".config")
        });
        base.join("gymforge").join("config.toml")
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path();
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Path of the roster state file under the data directory
    pub fn state_path(&self) -> PathBuf {
        self.data.data_dir.join("state.json")
    }

    /// Path of the activity journal under the data directory
    pub fn journal_path(&self) -> PathBuf {
        self.data.data_dir.join("journal.jsonl")
    }
}
