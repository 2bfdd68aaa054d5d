//! # CLI Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Command line (highest priority)                                    │
//! │     --db ./shop.db                                                     │
//! │                                                                         │
//! │  2. Environment Variables                                              │
//! │     STOTA_DB_PATH=./shop.db                                            │
//! │     STOTA_LOG=debug                                                    │
//! │     STOTA_MAX_CONNECTIONS=2                                            │
//! │                                                                         │
//! │  3. TOML Config File (--config, or the platform config dir)            │
//! │     ~/.config/pos/config.toml (Linux)                                  │
//! │     ~/Library/Application Support/com.stota.pos/config.toml (macOS)    │
//! │                                                                         │
//! │  4. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/srv/shop/stota.db"
//! max_connections = 5
//!
//! [store]
//! name = "Corner Café"
//! currency_symbol = "$"
//!
//! [logging]
//! filter = "info,stota=debug,sqlx=warn"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use stota_core::Money;

const DB_FILE_NAME: &str = "stota.db";

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "stota", "pos")
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default = "default_store_name")]
    pub name: String,

    /// Printed before amounts in text output. Empty by default.
    #[serde(default)]
    pub currency_symbol: String,
}

fn default_store_name() -> String {
    "Stota Store".to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: default_store_name(),
            currency_symbol: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives. `RUST_LOG` wins when set.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "info,stota=debug,sqlx=warn".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            filter: default_log_filter(),
        }
    }
}

// =============================================================================
// App Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// Loads configuration: defaults, then file, then environment.
    ///
    /// An explicit `config_path` must exist; the default location is
    /// optional.
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Parses a TOML file.
    pub fn from_file(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if self.database.max_connections == 0 {
            return Err(AppError::InvalidConfig(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(AppError::InvalidConfig("database.path is empty".into()));
            }
        }

        if self.logging.filter.trim().is_empty() {
            return Err(AppError::InvalidConfig("logging.filter is empty".into()));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `STOTA_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("STOTA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(max) = lookup("STOTA_MAX_CONNECTIONS") {
            if let Ok(max) = max.parse::<u32>() {
                self.database.max_connections = max;
            }
        }

        if let Some(filter) = lookup("STOTA_LOG") {
            self.logging.filter = filter;
        }
    }

    /// `<config dir>/config.toml` for this platform.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// The database file to open, creating its directory if needed.
    ///
    /// ## Platform-Specific Default
    /// - **macOS**: `~/Library/Application Support/com.stota.pos/stota.db`
    /// - **Windows**: `%APPDATA%\stota\pos\data\stota.db`
    /// - **Linux**: `~/.local/share/pos/stota.db`
    pub fn database_path(&self) -> AppResult<PathBuf> {
        let path = match &self.database.path {
            Some(path) => path.clone(),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
                .ok_or_else(|| {
                    AppError::InvalidConfig("Could not determine app data directory".into())
                })?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        Ok(path)
    }

    /// Formats an amount with the configured currency symbol.
    pub fn money(&self, amount: Money) -> String {
        if amount.is_negative() {
            format!("-{}{}", self.store.currency_symbol, Money::zero() - amount)
        } else {
            format!("{}{}", self.store.currency_symbol, amount)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.logging.filter, "info,stota=debug,sqlx=warn");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [store]
            name = "Corner Café"
            currency_symbol = "$"
            "#,
        )
        .unwrap();

        assert_eq!(config.store.name, "Corner Café");
        assert_eq!(config.database, DatabaseSettings::default());
        assert_eq!(config.money(Money::from_cents(1050)), "$10.50");
        assert_eq!(config.money(Money::from_cents(-250)), "-$2.50");
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("STOTA_DB_PATH", "/tmp/shop.db"),
            ("STOTA_MAX_CONNECTIONS", "2"),
            ("STOTA_LOG", "warn"),
        ]);

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, Some(PathBuf::from("/tmp/shop.db")));
        assert_eq!(config.database.max_connections, 2);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = AppConfig::default();
        config.database.max_connections = 0;
        assert!(matches!(config.validate(), Err(AppError::InvalidConfig(_))));

        let mut config = AppConfig::default();
        config.logging.filter = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let missing = std::env::temp_dir().join("stota-no-such-config.toml");
        assert!(matches!(
            AppConfig::load(Some(missing)),
            Err(AppError::Io(_))
        ));
    }
}
