//! Runtime configuration for embedding hosts and the CLI.
//!
//! # Responsibility
//! - Provide defaults for storage keys, database location and logging.
//! - Resolve overrides from `MAXIM_*` environment variables.
//!
//! # Invariants
//! - Blank environment values are ignored, never applied.
//! - The collection key is never migrated from older key names.

use std::path::PathBuf;

pub const DEFAULT_ITEMS_KEY: &str = "tao-of-life-v3";
pub const DEFAULT_PHRASE_KEY: &str = "tao-of-life-sync-phrase";
pub const DEFAULT_SPICE_KEY: &str = "tao-of-life-spice";
const DEFAULT_DB_FILE_NAME: &str = "maxim_journal.sqlite3";

pub const ENV_DB_PATH: &str = "MAXIM_DB_PATH";
pub const ENV_LOG_DIR: &str = "MAXIM_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "MAXIM_LOG_LEVEL";
pub const ENV_ITEMS_KEY: &str = "MAXIM_ITEMS_KEY";

/// Storage keys read and written by the journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub items: String,
    pub phrase: String,
    pub spice: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            items: DEFAULT_ITEMS_KEY.to_string(),
            phrase: DEFAULT_PHRASE_KEY.to_string(),
            spice: DEFAULT_SPICE_KEY.to_string(),
        }
    }
}

/// Resolved journal configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    pub keys: StorageKeys,
    pub db_path: PathBuf,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            keys: StorageKeys::default(),
            db_path: std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            log_dir: None,
            log_level: crate::logging::default_log_level().to_string(),
        }
    }
}

impl JournalConfig {
    /// Defaults overridden by `MAXIM_*` process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Defaults overridden by values returned from `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = non_blank(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(dir) = non_blank(ENV_LOG_DIR) {
            config.log_dir = Some(PathBuf::from(dir));
        }
        if let Some(level) = non_blank(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        if let Some(key) = non_blank(ENV_ITEMS_KEY) {
            config.keys.items = key;
        }
        config
    }
}
