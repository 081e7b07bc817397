//! Convenience re-exports.

pub use crate::error::{BackplaneError, BackplaneResult};
pub use crate::memory::InMemoryBackplane;
pub use crate::r#trait::{Backplane, MessageHandler};
pub use crate::subscription::Subscription;
