// ⚙️ Configuration
// Optional TOML file, then environment overrides.
//
//   ESCROW_CONFIG            path of the TOML file (default: escrow-insights.toml)
//   ESCROW_HISTORY           transaction history (.json or .csv)
//   ESCROW_MESSAGE_TAXONOMY  JSON taxonomy replacing the built-in message topics
//   ESCROW_FAILURE_TAXONOMY  JSON taxonomy replacing the built-in failure reasons
//   ESCROW_SERVER_ADDR       bind address for the API server

use crate::taxonomy::Taxonomy;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "escrow-insights.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history_path: PathBuf,
    pub message_taxonomy: Option<PathBuf>,
    pub failure_taxonomy: Option<PathBuf>,
    pub server_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_path: PathBuf::from("transactions.json"),
            message_taxonomy: None,
            failure_taxonomy: None,
            server_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    /// Load from the config file (if any) and the process environment
    pub fn load() -> Result<Self> {
        let path = env::var("ESCROW_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        let config = if path.exists() {
            Self::from_file(&path)?
        } else {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Self::default()
        };

        Ok(config.with_overrides(|key| env::var(key).ok()))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config TOML")
    }

    /// Apply `ESCROW_*` overrides; blank values are ignored
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(history) = get("ESCROW_HISTORY") {
            self.history_path = PathBuf::from(history);
        }
        if let Some(path) = get("ESCROW_MESSAGE_TAXONOMY") {
            self.message_taxonomy = Some(PathBuf::from(path));
        }
        if let Some(path) = get("ESCROW_FAILURE_TAXONOMY") {
            self.failure_taxonomy = Some(PathBuf::from(path));
        }
        if let Some(addr) = get("ESCROW_SERVER_ADDR") {
            self.server_addr = addr;
        }

        self
    }

    /// Configured message taxonomy, or the built-in one
    pub fn message_topics(&self) -> Result<Taxonomy> {
        match &self.message_taxonomy {
            Some(path) => Taxonomy::from_file(path),
            None => Ok(Taxonomy::message_topics()),
        }
    }

    /// Configured failure taxonomy, or the built-in one
    pub fn failure_reasons(&self) -> Result<Taxonomy> {
        match &self.failure_taxonomy {
            Some(path) => Taxonomy::from_file(path),
            None => Ok(Taxonomy::failure_reasons()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();

        assert_eq!(config.history_path, PathBuf::from("transactions.json"));
        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.message_topics().unwrap(), Taxonomy::message_topics());
        assert_eq!(config.failure_reasons().unwrap(), Taxonomy::failure_reasons());
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml_str(
            r#"
            history_path = "data/history.csv"
            server_addr = "127.0.0.1:8080"
            "#,
        )
        .unwrap();

        assert_eq!(config.history_path, PathBuf::from("data/history.csv"));
        assert_eq!(config.server_addr, "127.0.0.1:8080");
        assert_eq!(config.message_taxonomy, None);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml_str("history_path = [").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ESCROW_HISTORY", "other.json"),
            ("ESCROW_FAILURE_TAXONOMY", "failures.json"),
            ("ESCROW_SERVER_ADDR", "  "),
        ]);

        let config = Config::default().with_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.history_path, PathBuf::from("other.json"));
        assert_eq!(config.failure_taxonomy, Some(PathBuf::from("failures.json")));
        assert_eq!(config.message_taxonomy, None);
        assert_eq!(config.server_addr, "0.0.0.0:3000");
    }

    #[test]
    fn test_missing_taxonomy_file() {
        let config = Config {
            message_taxonomy: Some(PathBuf::from("/definitely/not/here.json")),
            ..Config::default()
        };

        assert!(config.message_topics().is_err());
    }
}
