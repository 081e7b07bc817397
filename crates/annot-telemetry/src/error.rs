//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while configuring telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The requested log level/filter directive could not be parsed.
    #[error("invalid log filter {directive:?}: {reason}")]
    InvalidFilter {
        /// The directive string that failed to parse.
        directive: String,
        /// Underlying parser error message.
        reason: String,
    },

    /// Global subscriber was already installed for this process.
    #[error("global tracing subscriber already set")]
    AlreadyInitialized,
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
