//! Configuration file support for the wellness tracker.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/wellness/config.toml`, or
//! from the path in `WELLNESS_CONFIG` when that is set. Every field has a
//! default, so a partial file is fine.

use crate::{Error, Result, DEFAULT_CALORIE_GOAL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable that points at an alternative config file
pub const CONFIG_PATH_ENV: &str = "WELLNESS_CONFIG";

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub coach: CoachConfig,

    #[serde(default)]
    pub goals: GoalsConfig,
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

/// Hosted coaching model settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoachConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Name of the environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CoachConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Goal defaults applied to profiles
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GoalsConfig {
    /// Used on the dashboard when a profile's calorie goal is zero
    #[serde(default = "default_calorie_goal")]
    pub default_calorie_goal: u32,
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            default_calorie_goal: default_calorie_goal(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("wellness")
}

fn default_model() -> String {
    "gemini-2.5-flash".into()
}

fn default_temperature() -> f32 {
    0.6
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".into()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".into()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_calorie_goal() -> u32 {
    DEFAULT_CALORIE_GOAL
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the config file path, honouring `WELLNESS_CONFIG`
    pub fn default_config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return PathBuf::from(path);
        }
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("wellness").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.coach.temperature) {
            return Err(Error::Config(format!(
                "coach.temperature must be between 0 and 2, got {}",
                self.coach.temperature
            )));
        }
        if self.coach.model.trim().is_empty() {
            return Err(Error::Config("coach.model must not be empty".into()));
        }
        Ok(())
    }
}
