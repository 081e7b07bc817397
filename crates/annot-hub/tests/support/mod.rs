//! Shared test double: an in-memory backplane that counts subscribe
//! calls per channel, so scenario tests can assert lazy-subscribe,
//! eager-teardown behavior directly rather than inferring it from
//! timing.

use std::collections::HashMap;
use std::sync::Mutex;

use annot_backplane::memory::InMemoryBackplane;
use annot_backplane::{Backplane, BackplaneResult, MessageHandler, Subscription};
use async_trait::async_trait;

#[derive(Default)]
pub struct CountingBackplane {
    inner: InMemoryBackplane,
    subscribe_counts: Mutex<HashMap<String, usize>>,
}

impl CountingBackplane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe_count(&self, channel: &str) -> usize {
        *self
            .subscribe_counts
            .lock()
            .unwrap()
            .get(channel)
            .unwrap_or(&0)
    }
}

#[async_trait]
impl Backplane for CountingBackplane {
    async fn subscribe(
        &self,
        channel: &str,
        on_message: MessageHandler,
    ) -> BackplaneResult<Subscription> {
        *self
            .subscribe_counts
            .lock()
            .unwrap()
            .entry(channel.to_string())
            .or_insert(0) += 1;
        self.inner.subscribe(channel, on_message).await
    }

    async fn publish(&self, channel: &str, payload: Vec<u8>) -> BackplaneResult<()> {
        self.inner.publish(channel, payload).await
    }
}
