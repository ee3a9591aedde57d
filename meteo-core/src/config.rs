use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::error::MeteoError;

/// Model used for LLM reports when neither the CLI nor the config names one.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

/// Collaborator base URLs.
///
/// Overridable in the config file, and constructed directly in tests so the
/// clients can be pointed at a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Endpoints {
    #[serde(default = "default_forecast_url")]
    pub forecast: String,

    #[serde(default = "default_geocoding_url")]
    pub geocoding: String,

    #[serde(default = "default_openai_url")]
    pub openai: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            forecast: default_forecast_url(),
            geocoding: default_geocoding_url(),
            openai: default_openai_url(),
        }
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Model for LLM reports when the CLI does not override it.
    ///
    /// Example TOML:
    /// default_model = "gpt-4.1-mini"
    pub default_model: Option<String>,

    /// Stored OpenAI credential. The OPENAI_API_KEY environment variable
    /// takes precedence; the CLI resolves it before the pipeline runs.
    pub openai_api_key: Option<String>,

    #[serde(default)]
    pub endpoints: Endpoints,
}

impl Config {
    /// Pick the model for this run: CLI override, then config, then built-in.
    pub fn model_or_default(&self, override_model: Option<&str>) -> String {
        override_model
            .map(str::to_string)
            .or_else(|| self.default_model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    /// The OpenAI credential, or the typed error that ends the run before
    /// anything is written.
    pub fn require_openai_api_key(&self) -> Result<&str, MeteoError> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(MeteoError::MissingApiKey)
    }

    pub fn set_openai_api_key(&mut self, key: String) {
        self.openai_api_key = Some(key);
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-insights", "meteo-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
