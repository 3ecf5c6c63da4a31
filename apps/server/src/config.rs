//! # Server Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MEDORA_PORT=9090                                                   │
//! │     MEDORA_DB_PATH=/var/lib/medora/medora.db                           │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/medora/medora.toml (Linux)                               │
//! │     ~/Library/Application Support/com.medora.medora/medora.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "medora.db"
//! max_connections = 5
//!
//! [store]
//! name = "Medora Pharmacy"
//! utc_offset_minutes = 345   # UTC+05:45
//! currency_symbol = "Rs."
//!
//! [inventory]
//! expiry_warning_days = 30
//! dashboard_preview_limit = 5
//! ```

use medora_core::validation::validate_expiry_window;
use medora_core::{StoreCalendar, DASHBOARD_PREVIEW_LIMIT, EXPIRY_WARNING_DAYS};
use medora_db::{DashboardOptions, DbConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        ServerSection {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    pub path: PathBuf,
    pub max_connections: u32,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: PathBuf::from("medora.db"),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSection {
    /// Printed on receipts.
    pub name: String,
    /// Fixed offset of the store clock.
    pub utc_offset_minutes: i32,
    pub currency_symbol: String,
}

impl Default for StoreSection {
    fn default() -> Self {
        StoreSection {
            name: "Medora Pharmacy".to_string(),
            utc_offset_minutes: 0,
            currency_symbol: "Rs.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventorySection {
    pub expiry_warning_days: i64,
    pub dashboard_preview_limit: usize,
}

impl Default for InventorySection {
    fn default() -> Self {
        InventorySection {
            expiry_warning_days: EXPIRY_WARNING_DAYS,
            dashboard_preview_limit: DASHBOARD_PREVIEW_LIMIT,
        }
    }
}

// =============================================================================
// Server Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub database: DatabaseSection,
    pub store: StoreSection,
    pub inventory: InventorySection,
}

impl ServerConfig {
    /// Loads configuration: defaults, then file, then environment.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = match config_path.or_else(Self::default_config_path) {
            Some(path) if path.exists() => {
                info!(?path, "Loading config from file");
                Self::from_file(&path)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies `MEDORA_*` overrides from `lookup`.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("MEDORA_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("MEDORA_PORT") {
            match port.parse::<u16>() {
                Ok(p) => {
                    debug!(port = p, "Overriding port from environment");
                    self.server.port = p;
                }
                Err(_) => warn!(value = %port, "Ignoring invalid MEDORA_PORT"),
            }
        }

        if let Some(path) = lookup("MEDORA_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(max) = lookup("MEDORA_DB_MAX_CONNECTIONS") {
            match max.parse::<u32>() {
                Ok(m) => self.database.max_connections = m,
                Err(_) => warn!(value = %max, "Ignoring invalid MEDORA_DB_MAX_CONNECTIONS"),
            }
        }

        if let Some(name) = lookup("MEDORA_STORE_NAME") {
            self.store.name = name;
        }

        if let Some(offset) = lookup("MEDORA_UTC_OFFSET_MINUTES") {
            match offset.parse::<i32>() {
                Ok(o) => self.store.utc_offset_minutes = o,
                Err(_) => warn!(value = %offset, "Ignoring invalid MEDORA_UTC_OFFSET_MINUTES"),
            }
        }

        if let Some(days) = lookup("MEDORA_EXPIRY_WARNING_DAYS") {
            match days.parse::<i64>() {
                Ok(d) => self.inventory.expiry_warning_days = d,
                Err(_) => warn!(value = %days, "Ignoring invalid MEDORA_EXPIRY_WARNING_DAYS"),
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue("database.max_connections".into()));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue("database.path".into()));
        }
        self.calendar()?;
        validate_expiry_window(self.inventory.expiry_warning_days)
            .map_err(|_| ConfigError::InvalidValue("inventory.expiry_warning_days".into()))?;
        if self.inventory.dashboard_preview_limit == 0 {
            return Err(ConfigError::InvalidValue("inventory.dashboard_preview_limit".into()));
        }

        Ok(())
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "medora", "medora")
            .map(|dirs| dirs.config_dir().join("medora.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn calendar(&self) -> Result<StoreCalendar, ConfigError> {
        StoreCalendar::from_offset_minutes(self.store.utc_offset_minutes)
            .map_err(|_| ConfigError::InvalidValue("store.utc_offset_minutes".into()))
    }

    pub fn db_config(&self) -> Result<DbConfig, ConfigError> {
        Ok(DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .calendar(self.calendar()?))
    }

    pub fn dashboard_options(&self) -> DashboardOptions {
        DashboardOptions {
            expiry_warning_days: self.inventory.expiry_warning_days,
            preview_limit: self.inventory.dashboard_preview_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.dashboard_options(), DashboardOptions::default());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ServerConfig::from_toml(
            r#"
            [server]
            port = 9000

            [store]
            utc_offset_minutes = 345
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.utc_offset_minutes, 345);
        assert_eq!(config.inventory.expiry_warning_days, EXPIRY_WARNING_DAYS);
        assert_eq!(config.calendar().unwrap().offset_minutes(), 345);
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = ServerConfig::from_toml("[server]\nport = 9000\n").unwrap();
        let env: HashMap<&str, &str> = [
            ("MEDORA_PORT", "9100"),
            ("MEDORA_DB_PATH", "/tmp/medora.db"),
            ("MEDORA_EXPIRY_WARNING_DAYS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.path, PathBuf::from("/tmp/medora.db"));
        assert_eq!(config.inventory.expiry_warning_days, EXPIRY_WARNING_DAYS);
    }

    #[test]
    fn test_validation() {
        let mut config = ServerConfig::default();
        config.store.utc_offset_minutes = 15 * 60;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.inventory.expiry_warning_days = -1;
        assert!(config.validate().is_err());

        let mut config = ServerConfig::default();
        config.database.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            ServerConfig::from_toml("[server]\nport = \"eighty\""),
            Err(ConfigError::Parse(_))
        ));
    }
}
