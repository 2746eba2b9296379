//! # Application Configuration
//!
//! Where the data lives and which defaults new records get.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     PAYMATE_DB_PATH=/srv/paymate.db                                    │
//! │     PAYMATE_DB_BACKEND=memory                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/paymate/paymate.toml (Linux)                             │
//! │     ~/Library/Application Support/app.paymate.PayMate/ (macOS)         │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     SQLite file in the platform data dir, INR                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! backend = "sqlite"   # sqlite | memory
//! path = "/srv/paymate/paymate.db"
//! max_connections = 5
//! change_buffer = 256
//!
//! [defaults]
//! currency = "INR"
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use paymate_core::currency;

use crate::error::DbResult;
use crate::pool::{Database, DbConfig};
use crate::repository::Repositories;
use crate::store::MemoryDocumentStore;
use crate::DEFAULT_CHANGE_BUFFER;

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to write config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No config path available on this platform")]
    NoConfigPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Backend
// =============================================================================

/// Which [`DocumentStore`](crate::store::DocumentStore) to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backend {
    #[default]
    Sqlite,
    Memory,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Sqlite => write!(f, "sqlite"),
            Backend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "file" => Ok(Backend::Sqlite),
            "memory" | "mem" => Ok(Backend::Memory),
            other => Err(ConfigError::Invalid(format!(
                "Unknown backend: '{}'. Valid options: sqlite, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default)]
    pub backend: Backend,

    /// SQLite file. Defaults to `paymate.db` in the platform data dir.
    #[serde(default = "default_database_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Change-channel capacity per subscriber.
    #[serde(default = "default_change_buffer")]
    pub change_buffer: usize,
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("app", "paymate", "PayMate")
        .map(|dirs| dirs.data_dir().join("paymate.db"))
        .unwrap_or_else(|| PathBuf::from("paymate.db"))
}

fn default_max_connections() -> u32 {
    5
}

fn default_change_buffer() -> usize {
    DEFAULT_CHANGE_BUFFER
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            backend: Backend::default(),
            path: default_database_path(),
            max_connections: default_max_connections(),
            change_buffer: default_change_buffer(),
        }
    }
}

impl From<&DatabaseSettings> for DbConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        DbConfig::new(settings.path.clone())
            .max_connections(settings.max_connections)
            .change_buffer(settings.change_buffer)
    }
}

/// Defaults stamped on new records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDefaults {
    /// ISO code; see [`paymate_core::currency::CURRENCIES`].
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}

impl Default for RecordDefaults {
    fn default() -> Self {
        RecordDefaults {
            currency: default_currency(),
        }
    }
}

// =============================================================================
// App Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub defaults: RecordDefaults,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`paymate.toml`)
    /// 3. `PAYMATE_*` environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }

        if self.database.change_buffer == 0 {
            return Err(ConfigError::Invalid(
                "change_buffer must be greater than 0".into(),
            ));
        }

        if self.database.backend == Backend::Sqlite
            && self.database.path.as_os_str().is_empty()
        {
            return Err(ConfigError::Invalid("database path is empty".into()));
        }

        if currency::find(&self.defaults.currency).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Unsupported currency: '{}'",
                self.defaults.currency
            )));
        }

        Ok(())
    }

    /// Applies `PAYMATE_*` overrides read through `lookup`.
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(backend) = lookup("PAYMATE_DB_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding backend from environment");
                    self.database.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown backend in environment"),
            }
        }

        if let Some(path) = lookup("PAYMATE_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("PAYMATE_MAX_CONNECTIONS") {
            if let Ok(n) = max.parse::<u32>() {
                self.database.max_connections = n;
            }
        }

        if let Some(code) = lookup("PAYMATE_CURRENCY") {
            self.defaults.currency = code.to_uppercase();
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("app", "paymate", "PayMate")
            .map(|dirs| dirs.config_dir().join("paymate.toml"))
    }

    /// Opens the configured store and returns its repositories.
    pub async fn open(&self) -> DbResult<Repositories> {
        match self.database.backend {
            Backend::Memory => {
                info!("Using in-memory document store");
                Ok(Repositories::new(Arc::new(MemoryDocumentStore::new(
                    self.database.change_buffer,
                ))))
            }
            Backend::Sqlite => {
                if let Some(parent) = self.database.path.parent() {
                    if !parent.as_os_str().is_empty() {
                        std::fs::create_dir_all(parent).map_err(|e| {
                            crate::error::DbError::ConnectionFailed(e.to_string())
                        })?;
                    }
                }
                let db = Database::new(DbConfig::from(&self.database)).await?;
                Ok(db.repositories())
            }
        }
    }

    pub fn currency(&self) -> &str {
        &self.defaults.currency
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_backend_parsing() {
        assert_eq!("sqlite".parse::<Backend>().unwrap(), Backend::Sqlite);
        assert_eq!("MEMORY".parse::<Backend>().unwrap(), Backend::Memory);
        assert!("postgres".parse::<Backend>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.backend, Backend::Sqlite);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.currency(), "INR");
        assert!(config.database.path.ends_with("paymate.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.database.max_connections = 0;
        assert!(config.validate().is_err());

        config.database.max_connections = 2;
        config.defaults.currency = "XYZ".to_string();
        assert!(config.validate().is_err());

        config.defaults.currency = "usd".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("PAYMATE_DB_BACKEND", "memory"),
            ("PAYMATE_DB_PATH", "/tmp/other.db"),
            ("PAYMATE_MAX_CONNECTIONS", "not-a-number"),
            ("PAYMATE_CURRENCY", "gbp"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.backend, Backend::Memory);
        assert_eq!(config.database.path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.currency(), "GBP");
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [database]
            backend = "memory"
            "#,
        )
        .unwrap();
        assert_eq!(config.database.backend, Backend::Memory);
        assert_eq!(config.database.change_buffer, DEFAULT_CHANGE_BUFFER);
        assert_eq!(config.currency(), "INR");
    }

    #[test]
    fn test_save_and_load_roundtrip_file() {
        let path = std::env::temp_dir().join(format!(
            "paymate-config-test-{}.toml",
            std::process::id()
        ));
        let mut config = AppConfig::default();
        config.defaults.currency = "EUR".to_string();
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[database]"));
        let loaded: AppConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded.currency(), "EUR");

        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn test_open_memory_backend() {
        let mut config = AppConfig::default();
        config.database.backend = Backend::Memory;

        let repos = config.open().await.unwrap();
        let profile = repos.profiles().ensure("uid-1", None, None).await.unwrap();
        assert_eq!(profile.name, "New User");
    }
}
