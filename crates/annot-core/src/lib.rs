//! Core identifiers shared across the annotation realtime hub.
//!
//! This crate has no dependency on any other internal crate. It only
//! defines the opaque identifiers that flow through the hub, the
//! backplane adapter, and the control ingress: [`UserId`], [`PageKey`],
//! and [`SessionId`].

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod ids;
pub mod prelude;

pub use ids::{PageKey, SessionId, UserId};
