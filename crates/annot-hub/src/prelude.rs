//! Convenience re-exports.

pub use crate::control::ControlIngress;
pub use crate::error::{HubError, HubResult};
pub use crate::hub::HubHandle;
pub use crate::session::{KeyUpdate, SessionHandle};
