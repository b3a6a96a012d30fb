//! Configuration Management
//!
//! Handles persistent configuration storage for weibo-api.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable consulted for the session cookie
pub const COOKIE_ENV: &str = "WEIBO_COOKIE";

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Browser session cookie
    #[serde(default)]
    pub cookie: Option<String>,
    /// User-Agent override
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Mobile site base URL override
    #[serde(default)]
    pub mobile_base_url: Option<String>,
    /// Card site base URL override
    #[serde(default)]
    pub card_base_url: Option<String>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("weibo-api").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a specific file, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Get effective cookie (config > WEIBO_COOKIE). Empty values are skipped.
    pub fn effective_cookie(&self) -> Option<String> {
        self.cookie
            .clone()
            .filter(|c| !c.is_empty())
            .or_else(|| std::env::var(COOKIE_ENV).ok().filter(|c| !c.is_empty()))
    }

    /// Set cookie and save
    pub fn set_cookie(&mut self, cookie: &str) -> Result<()> {
        self.cookie = Some(cookie.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json"));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            cookie: Some("SUB=abc".to_string()),
            timeout_secs: Some(5),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
    }

    #[test]
    fn test_invalid_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"user_agent": "test-agent"}"#).unwrap();
        let config = Config::load_from(&path);
        assert_eq!(config.user_agent.as_deref(), Some("test-agent"));
        assert!(config.cookie.is_none());
    }

    #[test]
    fn test_configured_cookie_wins() {
        let config = Config {
            cookie: Some("SUB=from-config".to_string()),
            ..Config::default()
        };
        assert_eq!(config.effective_cookie().as_deref(), Some("SUB=from-config"));
    }

    #[test]
    fn test_cookie_falls_back_to_env() {
        let saved = std::env::var(COOKIE_ENV).ok();
        std::env::set_var(COOKIE_ENV, "SUB=from-env");

        let configured = Config {
            cookie: Some("SUB=from-config".to_string()),
            ..Config::default()
        };
        let blank = Config {
            cookie: Some(String::new()),
            ..Config::default()
        };
        let config_first = configured.effective_cookie();
        let env_fallback = Config::default().effective_cookie();
        let blank_fallback = blank.effective_cookie();

        std::env::set_var(COOKIE_ENV, "");
        let empty_env = Config::default().effective_cookie();
        std::env::remove_var(COOKIE_ENV);
        let unset = Config::default().effective_cookie();

        match saved {
            Some(value) => std::env::set_var(COOKIE_ENV, value),
            None => std::env::remove_var(COOKIE_ENV),
        }

        assert_eq!(config_first.as_deref(), Some("SUB=from-config"));
        assert_eq!(env_fallback.as_deref(), Some("SUB=from-env"));
        assert_eq!(blank_fallback.as_deref(), Some("SUB=from-env"));
        assert_eq!(empty_env, None);
        assert_eq!(unset, None);
    }
}
