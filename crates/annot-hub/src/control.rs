//! Long-lived backplane subscriptions that translate external events
//! into hub commands.

use std::sync::Arc;

use annot_backplane::{Backplane, MessageHandler, Subscription};
use annot_core::UserId;
use serde::Deserialize;
use tracing::warn;

use crate::error::{HubError, HubResult};
use crate::hub::HubHandle;

const USER_DELETED_CHANNEL: &str = "user-deleted";
const USER_KEYS_UPDATED_CHANNEL: &str = "user-keys-updated";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserDeletedEnvelope {
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserKeysUpdatedEnvelope {
    user_id: String,
    key_version: u64,
    keys_deleted: bool,
}

/// Owns the two control subscriptions ([`USER_DELETED_CHANNEL`] and
/// [`USER_KEYS_UPDATED_CHANNEL`]) for the lifetime of the process.
/// Dropping or shutting down the ingress does not itself cancel them —
/// they share the hub's own shutdown token, matching process-wide
/// shutdown semantics.
pub struct ControlIngress {
    user_deleted: Subscription,
    user_keys_updated: Subscription,
}

impl ControlIngress {
    /// Establish both control subscriptions against `backplane`,
    /// forwarding decoded envelopes onto `hub`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::BackplaneSubscribe`] if either subscription
    /// cannot be established.
    pub async fn spawn(backplane: &Arc<dyn Backplane>, hub: HubHandle) -> HubResult<Self> {
        let deleted_hub = hub.clone();
        let user_deleted_handler: MessageHandler = Arc::new(move |bytes| {
            let hub = deleted_hub.clone();
            match serde_json::from_slice::<UserDeletedEnvelope>(&bytes) {
                Ok(envelope) => {
                    tokio::spawn(async move {
                        if let Err(source) = hub.user_deleted(UserId::from(envelope.user_id)).await {
                            warn!(error = %source, "failed to enqueue user-deleted command");
                        }
                    });
                }
                Err(source) => warn!(error = %source, "failed to decode user-deleted envelope"),
            }
        });
        let user_deleted = backplane
            .subscribe(USER_DELETED_CHANNEL, user_deleted_handler)
            .await
            .map_err(|source| HubError::BackplaneSubscribe {
                channel: USER_DELETED_CHANNEL.to_string(),
                source,
            })?;

        let keys_hub = hub;
        let user_keys_updated_handler: MessageHandler = Arc::new(move |bytes| {
            let hub = keys_hub.clone();
            match serde_json::from_slice::<UserKeysUpdatedEnvelope>(&bytes) {
                Ok(envelope) => {
                    tokio::spawn(async move {
                        if let Err(source) = hub
                            .user_keys_updated(
                                UserId::from(envelope.user_id),
                                envelope.key_version,
                                envelope.keys_deleted,
                            )
                            .await
                        {
                            warn!(error = %source, "failed to enqueue user-keys-updated command");
                        }
                    });
                }
                Err(source) => warn!(error = %source, "failed to decode user-keys-updated envelope"),
            }
        });
        let user_keys_updated = backplane
            .subscribe(USER_KEYS_UPDATED_CHANNEL, user_keys_updated_handler)
            .await
            .map_err(|source| HubError::BackplaneSubscribe {
                channel: USER_KEYS_UPDATED_CHANNEL.to_string(),
                source,
            })?;

        Ok(Self {
            user_deleted,
            user_keys_updated,
        })
    }

    /// Cancel both control subscriptions.
    pub fn shutdown(&self) {
        self.user_deleted.cancel();
        self.user_keys_updated.cancel();
    }
}
