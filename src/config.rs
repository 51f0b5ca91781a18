//! Scheduler configuration.
//!
//! Configuration is read from TOML. Every field has a default, so an empty
//! document yields [`SchedulerConfig::default`]:
//!
//! ```toml
//! conflict_reporting = "first_only"
//! log_index_contents = true
//! ```

use camino::Utf8Path;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use crate::task::domain::ConflictReporting;

/// Tunables for the schedule conflict index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    /// How many conflict records an activation check collects.
    pub conflict_reporting: ConflictReporting,
    /// Emit the full index contents at debug level after (re)initialization.
    pub log_index_contents: bool,
}

/// Errors returned while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        /// File that was being read.
        path: String,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The configuration document is not valid.
    #[error("invalid scheduler configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SchedulerConfig {
    /// Parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML, unknown keys or
    /// unknown enum values.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(document)?)
    }

    /// Reads and parses `file` relative to the capability directory `dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] when the file cannot be read and
    /// [`ConfigError::Parse`] when its contents are invalid.
    pub fn load(dir: &Dir, file: impl AsRef<Utf8Path>) -> Result<Self, ConfigError> {
        let path = file.as_ref();
        let document = dir.read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&document)
    }
}
