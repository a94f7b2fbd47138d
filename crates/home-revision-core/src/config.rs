//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! API base URL, the keychain namespace tokens are stored under, and the
//! request timeout.
//!
//! Configuration is stored at `~/.config/home-revision/config.json`.
//! `HOME_REVISION_API_URL` and `HOME_REVISION_NAMESPACE` override the file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for the config directory path
pub const APP_NAME: &str = "home-revision";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const API_URL_ENV: &str = "HOME_REVISION_API_URL";
const NAMESPACE_ENV: &str = "HOME_REVISION_NAMESPACE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub keyring_namespace: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            keyring_namespace: APP_NAME.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
        if let Some(ns) = lookup(NAMESPACE_ENV).filter(|v| !v.trim().is_empty()) {
            self.keyring_namespace = ns.trim().to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.keyring_namespace, "home-revision");
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"api_base_url": "https://pantry.example"}"#).unwrap();
        assert_eq!(config.api_base_url, "https://pantry.example");
        assert_eq!(config.keyring_namespace, "home-revision");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env(|name| match name {
            "HOME_REVISION_API_URL" => Some(" https://api.example ".to_string()),
            "HOME_REVISION_NAMESPACE" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "https://api.example");
        // Blank values are ignored
        assert_eq!(config.keyring_namespace, "home-revision");
    }
}
