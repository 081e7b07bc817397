//! In-memory, single-process [`Backplane`] implementation.
//!
//! Each channel is backed by its own `tokio::sync::broadcast` pair,
//! created lazily on first subscribe or publish and kept alive for the
//! process lifetime (dropping the last sender/receiver pair is harmless;
//! a later subscribe or publish simply recreates it).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::error::{BackplaneError, BackplaneResult};
use crate::r#trait::{Backplane, MessageHandler};
use crate::subscription::Subscription;

/// Broadcast channel capacity used for every topic.
///
/// A slow subscriber that falls more than this many messages behind
/// observes a `Lagged` gap (logged and skipped) rather than blocking
/// publishers, mirroring the bounded-queue backpressure policy used
/// throughout the hub.
const CHANNEL_CAPACITY: usize = 1024;

/// An in-memory pub/sub backplane, suitable for a single process and for
/// tests. Not shared across processes.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBackplane {
    topics: Arc<RwLock<HashMap<String, broadcast::Sender<Vec<u8>>>>>,
}

impl InMemoryBackplane {
    /// Create an empty backplane with no topics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn sender_for(&self, channel: &str) -> broadcast::Sender<Vec<u8>> {
        if let Some(sender) = self.topics.read().await.get(channel) {
            return sender.clone();
        }
        let mut topics = self.topics.write().await;
        topics
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

#[async_trait]
impl Backplane for InMemoryBackplane {
    async fn subscribe(
        &self,
        channel: &str,
        on_message: MessageHandler,
    ) -> BackplaneResult<Subscription> {
        let sender = self.sender_for(channel).await;
        let mut receiver = sender.subscribe();
        let token = CancellationToken::new();
        let task_token = token.clone();
        let task_channel = channel.to_string();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = task_token.cancelled() => break,
                    message = receiver.recv() => match message {
                        Ok(bytes) => on_message(bytes),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(channel = %task_channel, skipped, "backplane receiver lagged, messages dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            trace!(channel = %task_channel, "backplane delivery task exiting");
        });

        Ok(Subscription::new(token))
    }

    async fn publish(&self, channel: &str, payload: Vec<u8>) -> BackplaneResult<()> {
        let sender = self.sender_for(channel).await;
        // No receivers is not an error: a page with no current
        // subscribers simply drops the message, matching a real broker.
        let _ = sender.send(payload).map_err(|err| BackplaneError::Publish {
            channel: channel.to_string(),
            reason: err.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn delivers_published_message_to_subscriber() {
        let backplane = InMemoryBackplane::new();
        let received = Arc::new(std::sync::Mutex::new(Vec::new()));
        let sink = Arc::clone(&received);

        let _sub = backplane
            .subscribe(
                "page:abc",
                Arc::new(move |bytes| sink.lock().unwrap().push(bytes)),
            )
            .await
            .unwrap();

        backplane.publish("page:abc", vec![1, 2, 3]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(*received.lock().unwrap(), vec![vec![1, 2, 3]]);
    }

    #[tokio::test]
    async fn cancelling_subscription_stops_delivery() {
        let backplane = InMemoryBackplane::new();
        let count = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&count);

        let sub = backplane
            .subscribe(
                "page:abc",
                Arc::new(move |_bytes| {
                    counted.fetch_add(1, Ordering::SeqCst);
                }),
            )
            .await
            .unwrap();

        sub.cancel();
        tokio::time::sleep(Duration::from_millis(20)).await;

        backplane.publish("page:abc", vec![9]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn publish_with_no_subscribers_succeeds() {
        let backplane = InMemoryBackplane::new();
        backplane.publish("page:nobody", vec![1]).await.unwrap();
    }

    #[tokio::test]
    async fn multiple_subscribers_all_receive() {
        let backplane = InMemoryBackplane::new();
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        let (ca, cb) = (Arc::clone(&a), Arc::clone(&b));

        let _s1 = backplane
            .subscribe("page:x", Arc::new(move |_| { ca.fetch_add(1, Ordering::SeqCst); }))
            .await
            .unwrap();
        let _s2 = backplane
            .subscribe("page:x", Arc::new(move |_| { cb.fetch_add(1, Ordering::SeqCst); }))
            .await
            .unwrap();

        backplane.publish("page:x", vec![0]).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }
}
