//! # Catalog Configuration
//!
//! Selects the backend and tunes the store and the id allocator.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     CATALOG_USE_MOCK_DATA=false                                        │
//! │     CATALOG_DB_PATH=/var/lib/catalog/catalog.db                        │
//! │     CATALOG_HILO_BLOCK_SIZE=20                                         │
//! │     CATALOG_SEED_ON_STARTUP=false                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     explicit path, or <platform config dir>/catalog.toml               │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     mock data on, seed on startup, block size 10                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [store]
//! use_mock_data = false
//! database_path = "./data/catalog.db"
//! max_connections = 5
//! seed_on_startup = true
//!
//! [hilo]
//! block_size = 10
//! ```

use catalog_core::DEFAULT_HILO_BLOCK_SIZE;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::pool::DbConfig;

// =============================================================================
// Store Settings
// =============================================================================

/// Backend selection and SQLite settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Serve the catalog from process memory instead of SQLite.
    #[serde(default = "default_true")]
    pub use_mock_data: bool,

    /// SQLite database file. Ignored when `use_mock_data` is set.
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Load the sample items into an empty catalog. The standard types and
    /// brands are loaded either way.
    #[serde(default = "default_true")]
    pub seed_on_startup: bool,
}

fn default_true() -> bool {
    true
}

fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "catalog", "store")
        .map(|dirs| dirs.data_dir().join("catalog.db"))
        .unwrap_or_else(|| PathBuf::from("catalog.db"))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            use_mock_data: true,
            database_path: default_database_path(),
            max_connections: default_max_connections(),
            seed_on_startup: true,
        }
    }
}

// =============================================================================
// Hi/Lo Settings
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiLoSettings {
    /// Ids reserved per trip to the counter.
    #[serde(default = "default_block_size")]
    pub block_size: u32,
}

fn default_block_size() -> u32 {
    DEFAULT_HILO_BLOCK_SIZE
}

impl Default for HiLoSettings {
    fn default() -> Self {
        HiLoSettings {
            block_size: default_block_size(),
        }
    }
}

// =============================================================================
// Main Catalog Configuration
// =============================================================================

/// Complete catalog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub hilo: HiLoSettings,
}

impl CatalogConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (catalog.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> DbResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading catalog config from file");
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
            warn!("Failed to load catalog config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> DbResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| DbError::InvalidConfig("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            toml::to_string_pretty(self).map_err(|e| DbError::InvalidConfig(e.to_string()))?;
        std::fs::write(&path, contents)?;

        info!(?path, "Catalog config saved");
        Ok(())
    }

    pub fn validate(&self) -> DbResult<()> {
        if self.hilo.block_size == 0 {
            return Err(DbError::InvalidConfig(
                "hilo.block_size must be greater than 0".into(),
            ));
        }

        if self.store.use_mock_data {
            return Ok(());
        }

        if self.store.database_path.as_os_str().is_empty() {
            return Err(DbError::InvalidConfig(
                "store.database_path is required when use_mock_data is false".into(),
            ));
        }

        if self.store.max_connections == 0 {
            return Err(DbError::InvalidConfig(
                "store.max_connections must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Applies `CATALOG_*` overrides read through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("CATALOG_USE_MOCK_DATA") {
            match parse_flag(&value) {
                Some(flag) => {
                    debug!(use_mock_data = flag, "Overriding backend from environment");
                    self.store.use_mock_data = flag;
                }
                None => warn!(value = %value, "Invalid CATALOG_USE_MOCK_DATA"),
            }
        }

        if let Some(path) = lookup("CATALOG_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.database_path = PathBuf::from(path);
        }

        if let Some(value) = lookup("CATALOG_HILO_BLOCK_SIZE") {
            match value.trim().parse::<u32>() {
                Ok(size) => self.hilo.block_size = size,
                Err(_) => warn!(value = %value, "Invalid CATALOG_HILO_BLOCK_SIZE"),
            }
        }

        if let Some(value) = lookup("CATALOG_SEED_ON_STARTUP") {
            match parse_flag(&value) {
                Some(flag) => self.store.seed_on_startup = flag,
                None => warn!(value = %value, "Invalid CATALOG_SEED_ON_STARTUP"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "catalog", "store")
            .map(|dirs| dirs.config_dir().join("catalog.toml"))
    }

    /// Pool settings for the SQLite backend.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.store.database_path)
            .max_connections(self.store.max_connections)
            .hilo_block_size(self.hilo.block_size)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CatalogConfig::default();
        assert!(config.store.use_mock_data);
        assert!(config.store.seed_on_startup);
        assert_eq!(config.hilo.block_size, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: CatalogConfig = toml::from_str(
            r#"
            [store]
            use_mock_data = false
            database_path = "./catalog.db"
            "#,
        )
        .unwrap();

        assert!(!config.store.use_mock_data);
        assert_eq!(config.store.database_path, PathBuf::from("./catalog.db"));
        assert_eq!(config.store.max_connections, 5);
        assert_eq!(config.hilo.block_size, 10);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("CATALOG_USE_MOCK_DATA", "false"),
            ("CATALOG_DB_PATH", "/tmp/override.db"),
            ("CATALOG_HILO_BLOCK_SIZE", "25"),
            ("CATALOG_SEED_ON_STARTUP", "no"),
        ]
        .into_iter()
        .collect();

        let mut config = CatalogConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert!(!config.store.use_mock_data);
        assert_eq!(config.store.database_path, PathBuf::from("/tmp/override.db"));
        assert_eq!(config.hilo.block_size, 25);
        assert!(!config.store.seed_on_startup);
    }

    #[test]
    fn test_bad_override_ignored() {
        let mut config = CatalogConfig::default();
        config.apply_overrides(|key| match key {
            "CATALOG_HILO_BLOCK_SIZE" => Some("lots".to_string()),
            "CATALOG_USE_MOCK_DATA" => Some("maybe".to_string()),
            _ => None,
        });

        assert_eq!(config.hilo.block_size, 10);
        assert!(config.store.use_mock_data);
    }

    #[test]
    fn test_validation() {
        let mut config = CatalogConfig::default();
        config.hilo.block_size = 0;
        assert!(matches!(config.validate(), Err(DbError::InvalidConfig(_))));

        let mut config = CatalogConfig::default();
        config.store.use_mock_data = false;
        config.store.database_path = PathBuf::new();
        assert!(config.validate().is_err());

        config.store.database_path = PathBuf::from("catalog.db");
        config.store.max_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir()
            .join(format!("catalog-config-{}", std::process::id()))
            .join("catalog.toml");

        let mut config = CatalogConfig::default();
        config.store.use_mock_data = false;
        config.store.database_path = PathBuf::from("saved.db");
        config.hilo.block_size = 7;
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let loaded: CatalogConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_db_config_carries_block_size() {
        let mut config = CatalogConfig::default();
        config.store.database_path = PathBuf::from("x.db");
        config.hilo.block_size = 32;

        let db_config = config.db_config();
        assert_eq!(db_config.database_path, PathBuf::from("x.db"));
        assert_eq!(db_config.hilo_block_size, 32);
    }
}
