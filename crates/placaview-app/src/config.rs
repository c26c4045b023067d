//! Configuration management for placaview
//!
//! Config stored at: ~/.config/placaview/config.json

use placaview_client::{HttpClient, DEFAULT_BASE_URL, DEFAULT_LIST_LIMIT};
use placaview_types::{ConfigError, OutputFormat, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the configured API URL
pub const API_URL_ENV: &str = "PLACAVIEW_API_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the recognition/records backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Number of records requested by the list view
    #[serde(default = "default_list_limit")]
    pub list_limit: u32,

    /// Default output format (json, table)
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Camera device index used for frame capture
    #[serde(default)]
    pub camera_device: usize,
}

fn default_api_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_list_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            list_limit: default_list_limit(),
            output_format: OutputFormat::default(),
            camera_device: 0,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NotFound)?
            .join("placaview");
        Ok(config_dir)
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load config from the default location, or the defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// API URL after applying the environment override
    pub fn resolved_api_url(&self) -> String {
        self.resolve_api_url(std::env::var(API_URL_ENV).ok())
    }

    fn resolve_api_url(&self, env_value: Option<String>) -> String {
        match env_value {
            Some(url) if !url.trim().is_empty() => url.trim().to_string(),
            _ => self.api_url.clone(),
        }
    }

    /// Build an HTTP client for the resolved API URL
    pub fn client(&self) -> Result<HttpClient> {
        HttpClient::new(&self.resolved_api_url())
    }
}

impl std::fmt::Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PlacaView Configuration")?;
        writeln!(f, "=======================")?;
        writeln!(f)?;
        writeln!(f, "API URL:        {}", self.api_url)?;
        let resolved = self.resolved_api_url();
        if resolved != self.api_url {
            writeln!(f, "  (overridden by {}: {})", API_URL_ENV, resolved)?;
        }
        writeln!(f, "List limit:     {}", self.list_limit)?;
        writeln!(f, "Output format:  {}", self.output_format)?;
        writeln!(f, "Camera device:  {}", self.camera_device)?;

        if let Ok(path) = Self::config_path() {
            writeln!(f)?;
            writeln!(f, "Config file:    {}", path.display())?;
        }

        Ok(())
    }
}
