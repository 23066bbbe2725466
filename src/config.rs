//! Configuration management.
//!
//! Settings come from three layers, later ones winning:
//!
//! 1. `config.toml` in the platform config directory
//! 2. `SERENE_*` environment variables
//! 3. command-line flags (applied by the binaries)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "serene-manager";

/// Remote API connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the rental backend
    pub url: String,
    /// Manager login email
    pub email: Option<String>,
    /// Manager password (prefer `SERENE_PASSWORD` over storing it here)
    pub password: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:5555".to_string(),
            email: None,
            password: None,
            timeout_secs: 15,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    /// Email and password, when both are known.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.email, &self.password) {
            (Some(email), Some(password)) => Some((email.as_str(), password.as_str())),
            _ => None,
        }
    }
}

/// Display settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Currency label printed before amounts
    pub currency: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency: "KSh".to_string(),
        }
    }
}

/// Dashboard web server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub display: DisplayConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Gets the platform-specific config directory path.
    ///
    /// - Linux: `~/.config/serene-manager/`
    /// - macOS: `~/Library/Application Support/serene-manager/`
    /// - Windows: `%APPDATA%\serene-manager\`
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_DIR);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads the config file (defaults if absent) and applies the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_file_path()?)?;
        config.apply_env(std::env::vars());
        Ok(config)
    }

    /// Loads configuration from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Overrides settings from `SERENE_*` variables.
    pub fn apply_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if value.trim().is_empty() {
                continue;
            }
            match key.as_str() {
                "SERENE_API_URL" => self.api.url = value,
                "SERENE_EMAIL" => self.api.email = Some(value),
                "SERENE_PASSWORD" => self.api.password = Some(value),
                "SERENE_TIMEOUT_SECS" => match value.parse() {
                    Ok(secs) => self.api.timeout_secs = secs,
                    Err(_) => tracing::warn!(%value, "ignoring invalid SERENE_TIMEOUT_SECS"),
                },
                "SERENE_CURRENCY" => self.display.currency = value,
                "SERENE_SERVER_ADDR" => self.server.addr = value,
                _ => {}
            }
        }
    }

    /// Saves the configuration (password excluded) to `path`.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let mut stored = self.clone();
        stored.api.password = None;

        let content = toml::to_string_pretty(&stored).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}
