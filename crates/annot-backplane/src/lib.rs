//! Pub/sub backplane abstraction used by the realtime hub.
//!
//! The hub never talks to a concrete message broker directly; it depends
//! only on the [`Backplane`] trait. This crate ships one implementation,
//! [`memory::InMemoryBackplane`], backed by a `tokio::sync::broadcast`
//! channel per topic, suitable for single-process deployments and for
//! tests. A production deployment supplies its own adapter (a
//! Redis-backed one, say) implementing the same trait.
//!
//! ```rust
//! # use annot_backplane::{Backplane, memory::InMemoryBackplane};
//! # use std::sync::Arc;
//! # use std::sync::atomic::{AtomicUsize, Ordering};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let backplane = InMemoryBackplane::new();
//! let received = Arc::new(AtomicUsize::new(0));
//! let counted = Arc::clone(&received);
//! let _sub = backplane
//!     .subscribe("page:abc", Arc::new(move |_bytes| {
//!         counted.fetch_add(1, Ordering::SeqCst);
//!     }))
//!     .await
//!     .unwrap();
//! backplane.publish("page:abc", vec![1, 2, 3]).await.unwrap();
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod error;
pub mod memory;
pub mod prelude;
mod subscription;
mod r#trait;

pub use error::{BackplaneError, BackplaneResult};
pub use r#trait::{Backplane, MessageHandler};
pub use subscription::Subscription;
