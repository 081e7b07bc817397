//! Backplane error types.

use thiserror::Error;

/// Errors that can occur while subscribing to or publishing on a backplane
/// channel.
#[derive(Debug, Error)]
pub enum BackplaneError {
    /// The adapter rejected a subscribe request.
    #[error("failed to subscribe to channel {channel}: {reason}")]
    Subscribe {
        /// Channel name (e.g. `page:<key>`).
        channel: String,
        /// Adapter-supplied reason.
        reason: String,
    },

    /// The adapter rejected a publish request.
    #[error("failed to publish on channel {channel}: {reason}")]
    Publish {
        /// Channel name (e.g. `page:<key>`).
        channel: String,
        /// Adapter-supplied reason.
        reason: String,
    },
}

/// Result type for backplane operations.
pub type BackplaneResult<T> = Result<T, BackplaneError>;
