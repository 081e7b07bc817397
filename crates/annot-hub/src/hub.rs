//! The single-writer hub event loop.
//!
//! One `tokio::select!` loop owns `userSessions`, `pageSessions`, and
//! `pageCancel`; nothing else ever touches them. This is the same shape
//! as a gateway proxy's connection loop — a handful of bounded command
//! channels multiplexed with `biased` shutdown priority — generalized
//! from "one outbound websocket" to "many sessions fanned out from a
//! shared backplane".
//!
//! A naive fan-out would have the backplane's delivery callback read
//! `pageSessions[pageKey]` directly, racing the hub loop's own writes to
//! that map. Instead the callback only ever forwards raw bytes plus the
//! page key into [`DeliverCommand`], and the hub loop is the only code
//! that ever iterates `pageSessions`.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use annot_backplane::{Backplane, MessageHandler, Subscription};
use annot_config::HubConfig;
use annot_core::{PageKey, SessionId, UserId};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::command::{ControlCommand, DeliverCommand, LifecycleCommand, SubscriptionCommand};
use crate::error::{HubError, HubResult};
use crate::session::{KeyUpdate, SessionHandle};

/// Handle for interacting with a running hub. Cheap to clone; every
/// clone shares the same underlying command channels.
#[derive(Clone)]
pub struct HubHandle {
    lifecycle_tx: mpsc::Sender<LifecycleCommand>,
    subscription_tx: mpsc::Sender<SubscriptionCommand>,
    control_tx: mpsc::Sender<ControlCommand>,
    shutdown: CancellationToken,
}

impl HubHandle {
    /// Admit `session`. Rejected (over quota) sessions have their
    /// outbound queue closed by the hub loop; no error is surfaced here
    /// beyond the command channel itself being unavailable.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unavailable`] if the hub loop has stopped.
    pub async fn open(&self, session: Arc<SessionHandle>) -> HubResult<()> {
        self.lifecycle_tx
            .send(LifecycleCommand::Open { session })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Remove a session and reap its page subscriptions.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unavailable`] if the hub loop has stopped.
    pub async fn close(&self, session_id: SessionId) -> HubResult<()> {
        self.lifecycle_tx
            .send(LifecycleCommand::Close { session_id })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Subscribe `session_id` to `page_key`. Idempotent; a per-session
    /// quota violation is logged and dropped, not surfaced as an error.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unavailable`] if the hub loop has stopped.
    pub async fn subscribe(&self, session_id: SessionId, page_key: PageKey) -> HubResult<()> {
        self.subscription_tx
            .send(SubscriptionCommand::Subscribe {
                session_id,
                page_key,
            })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Unsubscribe `session_id` from `page_key`. A no-op if the pair is
    /// not currently subscribed.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unavailable`] if the hub loop has stopped.
    pub async fn unsubscribe(&self, session_id: SessionId, page_key: PageKey) -> HubResult<()> {
        self.subscription_tx
            .send(SubscriptionCommand::Unsubscribe {
                session_id,
                page_key,
            })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Evict every session belonging to `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unavailable`] if the hub loop has stopped.
    pub async fn user_deleted(&self, user_id: UserId) -> HubResult<()> {
        self.control_tx
            .send(ControlCommand::UserDeleted { user_id })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Fan out a key-rotation notice to every session belonging to
    /// `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Unavailable`] if the hub loop has stopped.
    pub async fn user_keys_updated(
        &self,
        user_id: UserId,
        key_version: u64,
        keys_deleted: bool,
    ) -> HubResult<()> {
        self.control_tx
            .send(ControlCommand::UserKeysUpdated {
                user_id,
                key_version,
                keys_deleted,
            })
            .await
            .map_err(|_| HubError::Unavailable)
    }

    /// Stop the hub loop and cancel the control-ingress subscriptions
    /// that share this token.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeysUpdatedEnvelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a KeyUpdate,
}

struct HubState {
    config: HubConfig,
    backplane: Arc<dyn Backplane>,
    sessions: HashMap<SessionId, Arc<SessionHandle>>,
    user_sessions: HashMap<UserId, HashSet<SessionId>>,
    page_sessions: HashMap<PageKey, HashSet<SessionId>>,
    page_cancel: HashMap<PageKey, Subscription>,
}

impl HubState {
    fn handle_open(&mut self, session: Arc<SessionHandle>) {
        let user_id = session.user_id().clone();
        let current = self.user_sessions.get(&user_id).map_or(0, HashSet::len);
        if current >= self.config.quotas.max_conns_per_user {
            warn!(user = %user_id, "connection quota exceeded, rejecting session");
            session.close_outbound();
            return;
        }
        self.user_sessions
            .entry(user_id)
            .or_default()
            .insert(session.id());
        self.sessions.insert(session.id(), session);
    }

    fn handle_close(&mut self, session_id: SessionId) {
        let Some(session) = self.sessions.remove(&session_id) else {
            return;
        };
        for page_key in session.subscribed_pages() {
            self.drop_page_membership(&page_key, session_id);
        }
        if let Some(set) = self.user_sessions.get_mut(session.user_id()) {
            set.remove(&session_id);
            if set.is_empty() {
                self.user_sessions.remove(session.user_id());
            }
        }
    }

    fn drop_page_membership(&mut self, page_key: &PageKey, session_id: SessionId) {
        let Some(set) = self.page_sessions.get_mut(page_key) else {
            return;
        };
        set.remove(&session_id);
        if set.is_empty() {
            self.page_sessions.remove(page_key);
            if let Some(subscription) = self.page_cancel.remove(page_key) {
                subscription.cancel();
            }
        }
    }

    async fn handle_subscribe(&mut self, session_id: SessionId, page_key: PageKey, deliver_tx: &mpsc::Sender<DeliverCommand>) {
        let Some(session) = self.sessions.get(&session_id).cloned() else {
            return;
        };
        if session.subscribed_page_count() >= self.config.quotas.max_subs_per_conn {
            warn!(session = %session_id, page = %page_key, "subscription quota exceeded");
            return;
        }
        if !self.page_sessions.contains_key(&page_key) {
            let channel = page_key.channel();
            let forward_tx = deliver_tx.clone();
            let forward_key = page_key.clone();
            let handler: MessageHandler = Arc::new(move |bytes| {
                if forward_tx
                    .try_send(DeliverCommand {
                        page_key: forward_key.clone(),
                        bytes,
                    })
                    .is_err()
                {
                    warn!(page = %forward_key, "hub deliver channel saturated, dropping backplane message");
                }
            });
            match self.backplane.subscribe(&channel, handler).await {
                Ok(subscription) => {
                    self.page_sessions.insert(page_key.clone(), HashSet::new());
                    self.page_cancel.insert(page_key.clone(), subscription);
                }
                Err(source) => {
                    warn!(page = %page_key, error = %source, "backplane subscribe failed");
                    return;
                }
            }
        }
        self.page_sessions
            .get_mut(&page_key)
            .expect("page_sessions entry created above")
            .insert(session_id);
        session.subscribe_page(page_key);
    }

    fn handle_unsubscribe(&mut self, session_id: SessionId, page_key: PageKey) {
        if let Some(session) = self.sessions.get(&session_id) {
            session.unsubscribe_page(&page_key);
        }
        self.drop_page_membership(&page_key, session_id);
    }

    fn handle_user_deleted(&mut self, user_id: UserId) {
        let Some(session_ids) = self.user_sessions.remove(&user_id) else {
            return;
        };
        for session_id in session_ids {
            if let Some(session) = self.sessions.get(&session_id) {
                session.close_outbound();
            }
        }
    }

    fn handle_user_keys_updated(&mut self, user_id: UserId, key_version: u64, keys_deleted: bool) {
        let Some(session_ids) = self.user_sessions.get(&user_id) else {
            return;
        };
        let update = KeyUpdate {
            key_version,
            keys_deleted,
        };
        let envelope = KeysUpdatedEnvelope {
            kind: "keys_updated",
            data: &update,
        };
        let bytes = match serde_json::to_vec(&envelope) {
            Ok(bytes) => bytes,
            Err(source) => {
                warn!(error = %source, "failed to serialize keys_updated envelope");
                return;
            }
        };
        for session_id in session_ids {
            if let Some(session) = self.sessions.get(session_id) {
                session.send(bytes.clone());
                session.deliver_key_update(update.clone());
            }
        }
    }

    fn handle_deliver(&mut self, page_key: PageKey, bytes: Vec<u8>) {
        let Some(session_ids) = self.page_sessions.get(&page_key) else {
            return;
        };
        for session_id in session_ids {
            if let Some(session) = self.sessions.get(session_id) {
                if !session.send(bytes.clone()) {
                    warn!(session = %session_id, page = %page_key, "outbound queue full, evicting session");
                    session.close_outbound();
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run(
        mut self,
        mut lifecycle_rx: mpsc::Receiver<LifecycleCommand>,
        mut subscription_rx: mpsc::Receiver<SubscriptionCommand>,
        mut control_rx: mpsc::Receiver<ControlCommand>,
        mut deliver_rx: mpsc::Receiver<DeliverCommand>,
        deliver_tx: mpsc::Sender<DeliverCommand>,
        shutdown: CancellationToken,
    ) {
        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => {
                    info!("hub loop received shutdown signal");
                    break;
                }

                Some(cmd) = lifecycle_rx.recv() => match cmd {
                    LifecycleCommand::Open { session } => self.handle_open(session),
                    LifecycleCommand::Close { session_id } => self.handle_close(session_id),
                },

                Some(cmd) = control_rx.recv() => match cmd {
                    ControlCommand::UserDeleted { user_id } => self.handle_user_deleted(user_id),
                    ControlCommand::UserKeysUpdated { user_id, key_version, keys_deleted } => {
                        self.handle_user_keys_updated(user_id, key_version, keys_deleted);
                    }
                },

                Some(cmd) = deliver_rx.recv() => self.handle_deliver(cmd.page_key, cmd.bytes),

                Some(cmd) = subscription_rx.recv() => match cmd {
                    SubscriptionCommand::Subscribe { session_id, page_key } => {
                        self.handle_subscribe(session_id, page_key, &deliver_tx).await;
                    }
                    SubscriptionCommand::Unsubscribe { session_id, page_key } => {
                        self.handle_unsubscribe(session_id, page_key);
                    }
                },

                else => break,
            }
        }
        info!("hub loop exiting");
    }
}

/// Spawn a hub loop backed by `backplane`, returning a cloneable handle
/// and the loop's join handle.
#[must_use]
pub fn spawn(config: HubConfig, backplane: Arc<dyn Backplane>) -> (HubHandle, JoinHandle<()>) {
    let (lifecycle_tx, lifecycle_rx) = mpsc::channel(config.capacities.lifecycle);
    let (subscription_tx, subscription_rx) = mpsc::channel(config.capacities.subscription);
    let (control_tx, control_rx) = mpsc::channel(config.capacities.control);
    // The backplane fan-out hop reuses the subscription capacity: its
    // traffic scales with how many pages are live, the same quantity
    // that bounds the subscription channel.
    let (deliver_tx, deliver_rx) = mpsc::channel(config.capacities.subscription);
    let shutdown = CancellationToken::new();

    let state = HubState {
        config,
        backplane,
        sessions: HashMap::new(),
        user_sessions: HashMap::new(),
        page_sessions: HashMap::new(),
        page_cancel: HashMap::new(),
    };

    let handle = HubHandle {
        lifecycle_tx,
        subscription_tx,
        control_tx,
        shutdown: shutdown.clone(),
    };

    let join = tokio::spawn(state.run(
        lifecycle_rx,
        subscription_rx,
        control_rx,
        deliver_rx,
        deliver_tx,
        shutdown,
    ));

    (handle, join)
}
