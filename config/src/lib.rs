//! Configuration for Tally deployments.
//!
//! Read from `~/.tally/config.toml`. Every section is optional:
//!
//! ```toml
//! [storage]
//! backend = "sqlite"
//! path = "${HOME}/.tally/ledger.db"
//!
//! [ledger]
//! min_duration_secs = 86400
//! max_duration_secs = 31536000
//!
//! [logging]
//! filter = "tally_dispatch=debug,info"
//! file = "${HOME}/.tally/tally.log"
//! ```

#![allow(clippy::missing_errors_doc)]

mod logging;

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use tally_ledger::DurationPolicy;
use tally_storage::{MemoryStore, SlotStore, SqliteStore, StoreError};

pub use logging::init_tracing;

const CONFIG_DIR: &str = ".tally";
const CONFIG_FILE: &str = "config.toml";
const DEFAULT_DB_FILE: &str = "ledger.db";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no database path configured and no home directory to default to")]
    MissingDatabasePath,

    #[error("min_duration_secs ({min}) exceeds max_duration_secs ({max})")]
    InvalidDurationBounds { min: u64, max: u64 },

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Default, Deserialize)]
pub struct TallyConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// State is lost when the process exits.
    #[default]
    Memory,
    Sqlite,
}

impl StorageBackend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::Sqlite => "sqlite",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// SQLite database file. `${VAR}` references are expanded.
    pub path: Option<String>,
}

impl StorageConfig {
    /// The database path, defaulting to `~/.tally/ledger.db`.
    #[must_use]
    pub fn database_path(&self) -> Option<PathBuf> {
        match self.path.as_deref() {
            Some(path) => Some(PathBuf::from(expand_env_vars(path))),
            None => config_dir().map(|dir| dir.join(DEFAULT_DB_FILE)),
        }
    }
}

/// Optional bounds on proposal durations. Unset means any positive
/// duration is accepted.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct LedgerConfig {
    pub min_duration_secs: Option<u64>,
    pub max_duration_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. `RUST_LOG` takes precedence.
    pub filter: Option<String>,
    /// Log file; stderr when unset. `${VAR}` references are expanded.
    pub file: Option<String>,
}

/// Expand `${VAR}` references. Unset variables expand to the empty string;
/// an unterminated `${` is kept literally.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let name = &after[..end];
        if !name.is_empty() {
            out.push_str(&env::var(name).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join(CONFIG_FILE))
}

impl TallyConfig {
    /// Load the default config file, falling back to defaults if it is
    /// missing or unreadable.
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn duration_policy(&self) -> Result<DurationPolicy, ConfigError> {
        let LedgerConfig {
            min_duration_secs: min,
            max_duration_secs: max,
        } = self.ledger;
        if let (Some(min), Some(max)) = (min, max)
            && min > max
        {
            return Err(ConfigError::InvalidDurationBounds { min, max });
        }
        Ok(DurationPolicy::new(min, max))
    }

    /// Build the configured storage backend.
    pub fn open_store(&self) -> Result<Box<dyn SlotStore>, ConfigError> {
        let backend = self.storage.backend;
        match backend {
            StorageBackend::Memory => {
                tracing::debug!(backend = backend.as_str(), "Opened ledger storage");
                Ok(Box::new(MemoryStore::new()))
            }
            StorageBackend::Sqlite => {
                let path = self
                    .storage
                    .database_path()
                    .ok_or(ConfigError::MissingDatabasePath)?;
                let store = SqliteStore::open(&path)?;
                tracing::info!(backend = backend.as_str(), path = %path.display(), "Opened ledger storage");
                Ok(Box::new(store))
            }
        }
    }
}
