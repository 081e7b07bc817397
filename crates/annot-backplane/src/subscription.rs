//! Cancellation handle returned by a subscribe call.

use tokio_util::sync::CancellationToken;

/// A live subscription to a backplane channel.
///
/// Dropping a `Subscription` does not, by itself, cancel the underlying
/// delivery task — callers that want drop-to-cancel semantics should call
/// [`Subscription::cancel`] explicitly. The hub invokes `cancel` exactly
/// once, on the transition of a page's session set to empty.
#[derive(Debug)]
pub struct Subscription {
    token: CancellationToken,
}

impl Subscription {
    pub(crate) fn new(token: CancellationToken) -> Self {
        Self { token }
    }

    /// Stop delivery for this subscription. Idempotent: cancelling twice
    /// is a no-op the second time.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether [`Subscription::cancel`] has already been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}
