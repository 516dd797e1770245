//! TOML configuration for an argument file reader.
//!
//! ```toml
//! path = "/etc/worker/args.txt"
//! fallback = "use_process_args"   # or "fail" (default)
//! cached = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::source::{ArgSource, FallbackPolicy};

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Where to read arguments from and how to treat the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Argument file, one token per line.
    pub path: PathBuf,
    /// Missing-file behaviour. Defaults to failing.
    pub fallback: FallbackPolicy,
    /// Re-parse only when the file's modification time changes.
    pub cached: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("args.txt"),
            fallback: FallbackPolicy::Fail,
            cached: false,
        }
    }
}

impl SourceConfig {
    /// Loads configuration from a TOML file.
    ///
    /// Unlike the argument file itself, a missing config file is always an
    /// error.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: SourceConfig = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;

        tracing::debug!(path = %path.display(), "Loaded argument source config");
        Ok(config)
    }

    pub fn to_source(&self) -> ArgSource {
        ArgSource::new(&self.path).with_fallback(self.fallback)
    }
}
