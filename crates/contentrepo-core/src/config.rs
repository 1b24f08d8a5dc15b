//! Client configuration loaded from TOML.

use crate::query::{ExecutionMode, FilterStatus, QueryOptions};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// ClientConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    #[serde(default)]
    pub query: QueryDefaults,
}

impl ClientConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;

        Self::from_toml_str(&source)
    }
}

///
/// QueryDefaults
///
/// Settings every new collection proxy starts with.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryDefaults {
    pub autofilters: FilterStatus,
    pub lifespan: FilterStatus,
    pub execution_mode: ExecutionMode,
    pub all_versions: bool,
}

impl QueryDefaults {
    #[must_use]
    pub fn options(&self) -> QueryOptions {
        QueryOptions {
            autofilters: self.autofilters,
            lifespan: self.lifespan,
            execution_mode: self.execution_mode,
            all_versions: self.all_versions,
            ..QueryOptions::default()
        }
    }
}

///
/// TESTS
///
