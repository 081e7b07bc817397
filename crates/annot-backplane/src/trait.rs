//! The [`Backplane`] trait: the hub's only dependency on a message broker.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackplaneResult;
use crate::subscription::Subscription;

/// Callback invoked once per message delivered to a subscription.
///
/// Implementations run this on an adapter-owned task, not on the caller's
/// task, so it must not assume any particular executor context beyond
/// `Send + Sync`.
pub type MessageHandler = Arc<dyn Fn(Vec<u8>) + Send + Sync>;

/// Abstract pub/sub backplane.
///
/// A channel name is an opaque string (the hub uses `page:<key>` for
/// page channels and two fixed names for the control channels). Delivery
/// order within a single channel is whatever the adapter provides; this
/// trait makes no cross-channel ordering guarantee.
#[async_trait]
pub trait Backplane: Send + Sync + 'static {
    /// Subscribe to `channel`, invoking `on_message` for every message
    /// published to it from the moment of subscription onward.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BackplaneError::Subscribe`] if the adapter cannot
    /// establish the subscription (e.g. the backing broker is
    /// unreachable). Callers must not assume any indices were created as
    /// a side effect of a failed call.
    async fn subscribe(
        &self,
        channel: &str,
        on_message: MessageHandler,
    ) -> BackplaneResult<Subscription>;

    /// Publish `payload` on `channel`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BackplaneError::Publish`] if the adapter rejects
    /// the write.
    async fn publish(&self, channel: &str, payload: Vec<u8>) -> BackplaneResult<()>;
}
