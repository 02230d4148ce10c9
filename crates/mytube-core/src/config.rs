//! Application configuration management.
//!
//! This module handles loading and saving the client configuration: the
//! backend URL, request timeout, login entry point, where tokens are kept,
//! and the last used username.
//!
//! Configuration is stored at `~/.config/mytube/config.json`. The
//! `MYTUBE_API_URL` and `MYTUBE_TIMEOUT_SECS` environment variables override
//! the file.

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::client::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS};
use crate::auth::redirect::DEFAULT_LOGIN_PATH;
use crate::auth::token_store::{FileTokenStore, KeyringTokenStore, MemoryTokenStore, TokenStore};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "mytube";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "MYTUBE_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "MYTUBE_TIMEOUT_SECS";

/// Where the credential pair is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TokenBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for TokenBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file" => Ok(TokenBackend::File),
            "keyring" => Ok(TokenBackend::Keyring),
            "memory" => Ok(TokenBackend::Memory),
            _ => Err(format!("unknown token backend '{}' (file, keyring, memory)", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub api_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub login_path: Option<String>,
    #[serde(default)]
    pub token_backend: TokenBackend,
    pub last_username: Option<String>,
}

impl Config {
    /// Load the config file and apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load the config file as written, without environment overrides
    pub fn load_file() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .context("Failed to read config file")?;
            Ok(serde_json::from_str(&contents).context("Failed to parse config file")?)
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
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Persist the last used username without writing any overrides to disk
    pub fn remember_username(username: &str) -> Result<()> {
        let mut stored = Self::load_file()?;
        stored.last_username = Some(username.to_string());
        stored.save()
    }

    /// Apply environment overrides through `lookup` (injectable for tests)
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_API_URL).filter(|v| !v.trim().is_empty()) {
            self.api_url = Some(url);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => self.request_timeout_secs = Some(secs),
                _ => warn!(value = %raw, "Ignoring invalid {}", ENV_TIMEOUT_SECS),
            }
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    pub fn login_path(&self) -> &str {
        self.login_path.as_deref().unwrap_or(DEFAULT_LOGIN_PATH)
    }

    /// Open the configured token store
    pub fn token_store(&self) -> Result<Arc<dyn TokenStore>> {
        let store: Arc<dyn TokenStore> = match self.token_backend {
            TokenBackend::File => Arc::new(FileTokenStore::new(&self.cache_dir()?)),
            TokenBackend::Keyring => Arc::new(KeyringTokenStore::new()),
            TokenBackend::Memory => Arc::new(MemoryTokenStore::new()),
        };
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_url(), "http://localhost:8080");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.login_path(), "/login");
        assert_eq!(config.token_backend, TokenBackend::File);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config {
            api_url: Some("http://file-config".to_string()),
            ..Default::default()
        };
        config.apply_env(env(&[
            (ENV_API_URL, "https://api.mytube.example"),
            (ENV_TIMEOUT_SECS, "30"),
        ]));
        assert_eq!(config.api_url(), "https://api.mytube.example");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_invalid_env_timeout_is_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[(ENV_TIMEOUT_SECS, "soon"), (ENV_API_URL, "  ")]));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.api_url(), DEFAULT_API_URL);
    }

    #[test]
    fn test_config_json_round_trip_fields() {
        let json = r#"{"api_url": "http://x", "token_backend": "keyring", "last_username": "anna"}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.token_backend, TokenBackend::Keyring);
        assert_eq!(config.last_username.as_deref(), Some("anna"));
        assert_eq!("MEMORY".parse::<TokenBackend>(), Ok(TokenBackend::Memory));
    }

    #[test]
    fn test_memory_backend_opens_without_directories() {
        let config = Config {
            token_backend: TokenBackend::Memory,
            ..Default::default()
        };
        assert!(config.token_store().is_ok());
    }
}
