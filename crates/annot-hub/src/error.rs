//! Hub error types.

use annot_backplane::BackplaneError;
use thiserror::Error;

/// Errors produced by the hub loop or its handle.
///
/// Admission rejection and subscription-quota rejection are not
/// represented here: they are expected control-flow outcomes handled
/// entirely by closing or ignoring a command, never surfaced as an
/// `Err` (see the crate-level docs).
#[derive(Debug, Error)]
pub enum HubError {
    /// The backplane refused a subscribe request for `channel`.
    #[error("backplane subscribe failed for channel {channel}")]
    BackplaneSubscribe {
        /// Channel name that failed to subscribe.
        channel: String,
        /// Underlying backplane error.
        #[source]
        source: BackplaneError,
    },

    /// A control envelope could not be serialized for fan-out.
    #[error("failed to serialize control envelope")]
    Serialize(#[source] serde_json::Error),

    /// The hub's command loop has already stopped accepting commands.
    #[error("hub is no longer accepting commands")]
    Unavailable,
}

/// Result type for hub operations.
pub type HubResult<T> = Result<T, HubError>;
