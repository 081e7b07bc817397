//! Layered configuration for the annotation realtime hub.
//!
//! This crate has no dependency on any other internal crate. It only
//! depends on `serde`, `toml`, `thiserror`, `tracing`, and `directories`,
//! mirroring the design of the rest of this codebase's configuration
//! layer.
//!
//! # Configuration precedence
//!
//! From highest to lowest priority:
//!
//! 1. **Environment variables** (`ANNOT_HUB_*`)
//! 2. **User config file** (`~/.config/annot-hub/config.toml`, or the
//!    path passed to [`HubConfig::load_file`])
//! 3. **Embedded defaults**
//!
//! ```rust,no_run
//! use annot_config::HubConfig;
//!
//! let config = HubConfig::load(None).unwrap();
//! println!("max conns/user: {}", config.quotas.max_conns_per_user);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod env;
pub mod error;
pub mod loader;
pub mod types;

pub use error::{ConfigError, ConfigResult};
pub use types::{BackplaneConfig, CapacityConfig, HubConfig, QuotaConfig};
