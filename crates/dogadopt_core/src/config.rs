//! TOML configuration for hosts embedding the core.
//!
//! ```toml
//! [database]
//! path = "shelter.db"        # omitted: private in-memory database
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/dogadopt"  # omitted: logging stays off
//!
//! [photos]
//! base_url = "https://dog.ceo/api"
//! timeout_secs = 10
//! ```
//!
//! Relative paths in a file loaded with `CoreConfig::load` are resolved
//! against the file's directory.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::gateway::{DogCeoGateway, GatewayError, DOG_CEO_BASE_URL};
use crate::logging::{self, default_log_level, LoggingError};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_PHOTO_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub photos: PhotosConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotosConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for PhotosConfig {
    fn default() -> Self {
        Self {
            base_url: DOG_CEO_BASE_URL.to_string(),
            timeout_secs: DEFAULT_PHOTO_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidValue {
        field: &'static str,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { field, reason } => write!(f, "invalid `{field}`: {reason}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

impl CoreConfig {
    /// Reads and validates a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_paths(base);
        }
        Ok(config)
    }

    /// Parses and validates TOML text. Missing sections take defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        logging::normalize_level(&self.logging.level).map_err(|err| {
            ConfigError::InvalidValue {
                field: "logging.level",
                reason: err.to_string(),
            }
        })?;
        url::Url::parse(&self.photos.base_url).map_err(|err| ConfigError::InvalidValue {
            field: "photos.base_url",
            reason: err.to_string(),
        })?;
        if self.photos.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "photos.timeout_secs",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn resolve_relative_paths(&mut self, base: &Path) {
        for path in [&mut self.database.path, &mut self.logging.dir]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    /// Opens the configured database, or an in-memory one when no path is set.
    pub fn open_database(&self) -> DbResult<Connection> {
        match &self.database.path {
            Some(path) => open_db(path),
            None => open_db_in_memory(),
        }
    }

    /// Starts file logging when `logging.dir` is set.
    ///
    /// Returns whether logging is active after the call.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.logging.dir {
            Some(dir) => logging::init_logging(&self.logging.level, dir).map(|()| true),
            None => Ok(false),
        }
    }

    pub fn photo_gateway(&self) -> Result<DogCeoGateway, GatewayError> {
        DogCeoGateway::new(
            self.photos.base_url.clone(),
            Duration::from_secs(self.photos.timeout_secs),
        )
    }
}
