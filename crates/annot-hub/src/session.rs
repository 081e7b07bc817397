//! The hub's view of one live client connection.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use annot_core::{PageKey, SessionId, UserId};

/// Key-rotation payload delivered on a session's control queue, and
/// embedded in the `keys_updated` envelope sent on its outbound queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyUpdate {
    /// Monotonically increasing key version the client should adopt.
    pub key_version: u64,
    /// Whether the rotation also deleted prior key material.
    pub keys_deleted: bool,
}

/// One live client connection, as seen by the hub.
///
/// Every mutating method (`send`, `deliver_key_update`, `close_outbound`,
/// the page-subscription helpers) is only ever called from the hub's own
/// event loop; that single-writer discipline is what lets plain
/// `std::sync::Mutex`/`AtomicBool` fields stand in for anything fancier.
#[derive(Debug)]
pub struct SessionHandle {
    id: SessionId,
    user_id: UserId,
    outbound: Mutex<Option<mpsc::Sender<Vec<u8>>>>,
    control: mpsc::Sender<KeyUpdate>,
    closed: AtomicBool,
    subscribed_pages: Mutex<HashSet<PageKey>>,
}

impl SessionHandle {
    /// Build a new handle and the receiver halves an external transport
    /// task drains to forward bytes/control events to the wire.
    #[must_use]
    pub fn new(
        user_id: UserId,
        outbound_capacity: usize,
        control_capacity: usize,
    ) -> (Self, mpsc::Receiver<Vec<u8>>, mpsc::Receiver<KeyUpdate>) {
        let (outbound_tx, outbound_rx) = mpsc::channel(outbound_capacity);
        let (control_tx, control_rx) = mpsc::channel(control_capacity);
        let handle = Self {
            id: SessionId::next(),
            user_id,
            outbound: Mutex::new(Some(outbound_tx)),
            control: control_tx,
            closed: AtomicBool::new(false),
            subscribed_pages: Mutex::new(HashSet::new()),
        };
        (handle, outbound_rx, control_rx)
    }

    /// This session's hub-assigned identifier.
    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The user this session belongs to.
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Snapshot of the page keys this session currently subscribes to.
    #[must_use]
    pub fn subscribed_pages(&self) -> HashSet<PageKey> {
        self.subscribed_pages.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Whether [`SessionHandle::close_outbound`] has already run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Non-blocking enqueue of a page-scoped payload.
    ///
    /// Returns `false` if the queue is full or already closed; the hub
    /// treats that as a liveness failure and evicts the session.
    pub(crate) fn send(&self, bytes: Vec<u8>) -> bool {
        let guard = self.outbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match guard.as_ref() {
            Some(sender) => sender.try_send(bytes).is_ok(),
            None => false,
        }
    }

    /// Non-blocking enqueue of a key-rotation payload.
    pub(crate) fn deliver_key_update(&self, update: KeyUpdate) -> bool {
        self.control.try_send(update).is_ok()
    }

    /// Idempotent: drops the outbound sender so the session's writer
    /// loop observes EOF on its receiver and tears down the transport.
    pub(crate) fn close_outbound(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.outbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }

    pub(crate) fn subscribe_page(&self, key: PageKey) {
        self.subscribed_pages.lock().unwrap_or_else(std::sync::PoisonError::into_inner).insert(key);
    }

    pub(crate) fn unsubscribe_page(&self, key: &PageKey) {
        self.subscribed_pages.lock().unwrap_or_else(std::sync::PoisonError::into_inner).remove(key);
    }

    pub(crate) fn subscribed_page_count(&self) -> usize {
        self.subscribed_pages.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_fails_after_close_outbound() {
        let (session, _outbound_rx, _control_rx) = SessionHandle::new(UserId::from("u1"), 4, 4);
        assert!(session.send(vec![1]));
        session.close_outbound();
        assert!(session.is_closed());
        assert!(!session.send(vec![2]));
    }

    #[test]
    fn close_outbound_is_idempotent() {
        let (session, _outbound_rx, _control_rx) = SessionHandle::new(UserId::from("u1"), 4, 4);
        session.close_outbound();
        session.close_outbound();
        assert!(session.is_closed());
    }

    #[test]
    fn subscribe_page_is_idempotent_in_count() {
        let (session, _outbound_rx, _control_rx) = SessionHandle::new(UserId::from("u1"), 4, 4);
        let key = PageKey::from("page-1");
        session.subscribe_page(key.clone());
        session.subscribe_page(key);
        assert_eq!(session.subscribed_page_count(), 1);
    }

    #[test]
    fn send_fails_when_outbound_queue_is_full() {
        let (session, _outbound_rx, _control_rx) = SessionHandle::new(UserId::from("u1"), 1, 4);
        assert!(session.send(vec![1]));
        assert!(!session.send(vec![2]));
    }
}
