//! Annot Telemetry - logging and tracing setup for the annotation hub.
//!
//! This crate provides:
//! - Configurable logging setup with multiple output formats
//! - A single [`setup_logging`] entrypoint shared by the hub, control
//!   ingress, and the daemon binary
//!
//! # Example
//!
//! ```rust,no_run
//! use annot_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), annot_telemetry::TelemetryError> {
//! let config = LogConfig::new("info").with_format(LogFormat::Pretty);
//! setup_logging(&config)?;
//! tracing::info!("hub starting");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, setup_default_logging, setup_logging};
