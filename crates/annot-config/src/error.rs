//! Configuration error types.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or validating [`crate::HubConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The config file contents were not valid TOML for [`crate::HubConfig`].
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was attempted.
        path: PathBuf,
        /// Underlying TOML error.
        #[source]
        source: Box<toml::de::Error>,
    },

    /// An `ANNOT_HUB_*` environment variable held a value of the wrong type.
    #[error("invalid value for environment variable {var}: {value:?}")]
    InvalidEnvValue {
        /// Variable name.
        var: String,
        /// Raw value that failed to parse.
        value: String,
    },

    /// The fully-resolved configuration failed validation.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
