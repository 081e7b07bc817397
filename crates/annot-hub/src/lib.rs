//! The realtime annotation fan-out hub.
//!
//! A single-writer event loop ([`hub::spawn`]) owns every shared index
//! (user → sessions, page → sessions, page → backplane cancellation)
//! and mediates session admission, page subscription, and two kinds of
//! out-of-band control event (account deletion, key rotation). See the
//! [`hub`] module docs for the concurrency discipline.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use annot_backplane::{memory::InMemoryBackplane, Backplane};
//! use annot_config::HubConfig;
//! use annot_hub::{hub, ControlIngress, SessionHandle};
//! use annot_core::UserId;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let backplane: Arc<dyn Backplane> = Arc::new(InMemoryBackplane::new());
//! let (hub_handle, _hub_task) = hub::spawn(HubConfig::default(), backplane.clone());
//! let _control = ControlIngress::spawn(&backplane, hub_handle.clone()).await?;
//!
//! let (session, _outbound_rx, _control_rx) = SessionHandle::new(UserId::from("alice"), 256, 32);
//! hub_handle.open(Arc::new(session)).await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod command;
mod control;
mod error;
pub mod hub;
pub mod prelude;
mod session;

pub use control::ControlIngress;
pub use error::{HubError, HubResult};
pub use hub::HubHandle;
pub use session::{KeyUpdate, SessionHandle};
