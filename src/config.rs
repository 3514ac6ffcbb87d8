//! # Dashboard Configuration
//!
//! Sources, later wins: built-in defaults, an optional JSON file, then the
//! process environment. A `.env` file in the working directory (or a parent)
//! is read into the environment first; variables already set are kept. CLI
//! flags are applied on top by the `serve` command.
//!
//! | Variable         | Field           | Default                     |
//! |------------------|-----------------|-----------------------------|
//! | `DB_HOST`        | `db_host`       | `localhost`                 |
//! | `DB_PORT`        | `db_port`       | `3306`                      |
//! | `DB_USER`        | `db_user`       | `root`                      |
//! | `DB_PASSWORD`    | `db_password`   | none                        |
//! | `DB_NAME`        | `db_name`       | `adventureworks`            |
//! | `SECRET_KEY`     | `secret_key`    | `a_very_secret_default_key` |
//! | `DASHBOARD_HOST` | `server.host`   | `127.0.0.1`                 |
//! | `DASHBOARD_PORT` | `server.port`   | `5000`                      |
//!
//! `FLASK_SECRET_KEY` is read when `SECRET_KEY` is unset.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::http_server::HttpServerConfig;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}

/// Dashboard configuration
#[derive(Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_db_host")]
    pub db_host: String,

    #[serde(default = "default_db_port")]
    pub db_port: u16,

    #[serde(default = "default_db_user")]
    pub db_user: String,

    /// No default: an unset password connects without one
    #[serde(default)]
    pub db_password: Option<String>,

    #[serde(default = "default_db_name")]
    pub db_name: String,

    /// Signs the flash-message cookie, nothing else
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    #[serde(default)]
    pub server: HttpServerConfig,
}

fn default_db_host() -> String {
    "localhost".to_string()
}
fn default_db_port() -> u16 {
    3306
}
fn default_db_user() -> String {
    "root".to_string()
}
fn default_db_name() -> String {
    "adventureworks".to_string()
}
fn default_secret_key() -> String {
    "a_very_secret_default_key".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            db_host: default_db_host(),
            db_port: default_db_port(),
            db_user: default_db_user(),
            db_password: None,
            db_name: default_db_name(),
            secret_key: default_secret_key(),
            server: HttpServerConfig::default(),
        }
    }
}

// Keeps the password and secret out of logs.
impl fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("db_host", &self.db_host)
            .field("db_port", &self.db_port)
            .field("db_user", &self.db_user)
            .field("db_password", &self.db_password.as_ref().map(|_| "***"))
            .field("db_name", &self.db_name)
            .field("secret_key", &"***")
            .field("server", &self.server)
            .finish()
    }
}

impl DashboardConfig {
    /// Defaults, then the optional file, then the process environment
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "loaded environment file");
        }
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load a JSON configuration file; missing fields take their defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Override fields from environment-style lookups
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("DB_HOST") {
            self.db_host = v;
        }
        if let Some(v) = lookup("DB_PORT") {
            self.db_port = parse_port("DB_PORT", &v)?;
        }
        if let Some(v) = lookup("DB_USER") {
            self.db_user = v;
        }
        if let Some(v) = lookup("DB_PASSWORD") {
            self.db_password = Some(v);
        }
        if let Some(v) = lookup("DB_NAME") {
            self.db_name = v;
        }
        if let Some(v) = lookup("SECRET_KEY").or_else(|| lookup("FLASK_SECRET_KEY")) {
            self.secret_key = v;
        }
        if let Some(v) = lookup("DASHBOARD_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("DASHBOARD_PORT") {
            self.server.port = parse_port("DASHBOARD_PORT", &v)?;
        }
        Ok(())
    }
}

fn parse_port(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.db_host, "localhost");
        assert_eq!(config.db_user, "root");
        assert_eq!(config.db_name, "adventureworks");
        assert_eq!(config.db_password, None);
        assert_eq!(config.server.socket_addr(), "127.0.0.1:5000");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DashboardConfig::default();
        config
            .apply_env(lookup(&[
                ("DB_HOST", "db.internal"),
                ("DB_PASSWORD", "s3cret"),
                ("DASHBOARD_PORT", "8080"),
            ]))
            .unwrap();
        assert_eq!(config.db_host, "db.internal");
        assert_eq!(config.db_password.as_deref(), Some("s3cret"));
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.db_name, "adventureworks");
    }

    #[test]
    fn test_legacy_secret_key_fallback() {
        let mut config = DashboardConfig::default();
        config
            .apply_env(lookup(&[("FLASK_SECRET_KEY", "legacy-key")]))
            .unwrap();
        assert_eq!(config.secret_key, "legacy-key");

        let mut config = DashboardConfig::default();
        config
            .apply_env(lookup(&[
                ("FLASK_SECRET_KEY", "legacy-key"),
                ("SECRET_KEY", "current-key"),
            ]))
            .unwrap();
        assert_eq!(config.secret_key, "current-key");
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut config = DashboardConfig::default();
        let err = config.apply_env(lookup(&[("DB_PORT", "mysql")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_file_fills_missing_fields_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"db_name": "aw_test", "server": {{"port": 9000}}}}"#).unwrap();

        let config = DashboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.db_name, "aw_test");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.db_host, "localhost");
    }

    #[test]
    fn test_debug_hides_secrets() {
        let config = DashboardConfig {
            db_password: Some("hunter2".into()),
            secret_key: "topsecret".into(),
            ..Default::default()
        };
        let printed = format!("{:?}", config);
        assert!(!printed.contains("hunter2"));
        assert!(!printed.contains("topsecret"));
    }
}
