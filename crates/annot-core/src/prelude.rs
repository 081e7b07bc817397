//! Prelude module - commonly used types for convenient import.
//!
//! Use `use annot_core::prelude::*;` to import all essential types.

pub use crate::{PageKey, SessionId, UserId};
