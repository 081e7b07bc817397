//! Commands accepted by the hub's event loop.
//!
//! Each variant travels on its own bounded channel (see
//! [`crate::hub::HubHandle`]) so a flood on one command class cannot
//! starve the others.

use std::sync::Arc;

use annot_core::{PageKey, SessionId, UserId};

use crate::session::SessionHandle;

pub(crate) enum LifecycleCommand {
    Open { session: Arc<SessionHandle> },
    Close { session_id: SessionId },
}

pub(crate) enum SubscriptionCommand {
    Subscribe {
        session_id: SessionId,
        page_key: PageKey,
    },
    Unsubscribe {
        session_id: SessionId,
        page_key: PageKey,
    },
}

pub(crate) enum ControlCommand {
    UserDeleted {
        user_id: UserId,
    },
    UserKeysUpdated {
        user_id: UserId,
        key_version: u64,
        keys_deleted: bool,
    },
}

/// A backplane message forwarded back into the hub loop for fan-out.
///
/// Routing delivery through this channel, rather than having the
/// backplane callback read `pageSessions` directly, is what keeps that
/// map single-writer (see the module docs on [`crate::hub`]).
pub(crate) struct DeliverCommand {
    pub page_key: PageKey,
    pub bytes: Vec<u8>,
}
