//! Configuration struct definitions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Per-user and per-connection quota constants (§3 of the design).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum live sessions a single user may hold concurrently.
    #[serde(default = "default_max_conns_per_user")]
    pub max_conns_per_user: usize,

    /// Maximum page subscriptions a single session may hold concurrently.
    #[serde(default = "default_max_subs_per_conn")]
    pub max_subs_per_conn: usize,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_conns_per_user: default_max_conns_per_user(),
            max_subs_per_conn: default_max_subs_per_conn(),
        }
    }
}

const fn default_max_conns_per_user() -> usize {
    3
}

const fn default_max_subs_per_conn() -> usize {
    50
}

/// Bounded command-channel capacities, so a flood on one command class
/// cannot starve the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityConfig {
    /// Capacity of the open/close command channels.
    #[serde(default = "default_lifecycle_capacity")]
    pub lifecycle: usize,

    /// Capacity of the subscribe/unsubscribe command channels.
    #[serde(default = "default_subscription_capacity")]
    pub subscription: usize,

    /// Capacity of the control (`user-deleted`/`user-keys-updated`) channel.
    #[serde(default = "default_control_capacity")]
    pub control: usize,

    /// Capacity of a single session's outbound byte-message queue.
    #[serde(default = "default_session_outbound_capacity")]
    pub session_outbound: usize,

    /// Capacity of a single session's control-event queue.
    #[serde(default = "default_session_control_capacity")]
    pub session_control: usize,
}

impl Default for CapacityConfig {
    fn default() -> Self {
        Self {
            lifecycle: default_lifecycle_capacity(),
            subscription: default_subscription_capacity(),
            control: default_control_capacity(),
            session_outbound: default_session_outbound_capacity(),
            session_control: default_session_control_capacity(),
        }
    }
}

const fn default_lifecycle_capacity() -> usize {
    256
}

const fn default_subscription_capacity() -> usize {
    1024
}

const fn default_control_capacity() -> usize {
    64
}

const fn default_session_outbound_capacity() -> usize {
    256
}

const fn default_session_control_capacity() -> usize {
    32
}

/// Backplane connection description.
///
/// The core hub is backend-agnostic (see `annot-backplane`); this only
/// carries enough information for a production deployment to select and
/// configure a concrete adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackplaneConfig {
    /// Connection string/URL for the pub/sub backend (unused by the
    /// in-memory adapter, required by a real deployment's Redis-backed
    /// one).
    #[serde(default)]
    pub url: Option<String>,
}

impl Default for BackplaneConfig {
    fn default() -> Self {
        Self { url: None }
    }
}

/// Top-level hub configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HubConfig {
    /// Quota constants.
    #[serde(default)]
    pub quotas: QuotaConfig,

    /// Command-channel capacities.
    #[serde(default)]
    pub capacities: CapacityConfig,

    /// Backplane connection description.
    #[serde(default)]
    pub backplane: BackplaneConfig,

    /// Default log level/filter directive (e.g. `"info"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl HubConfig {
    /// Load with the full precedence chain: defaults → optional file → env.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file (when present) is malformed,
    /// an `ANNOT_HUB_*` variable holds an unparsable value, or the final
    /// configuration fails validation.
    pub fn load(file_path: Option<&std::path::Path>) -> ConfigResult<Self> {
        let mut config = if let Some(path) = file_path {
            debug!(path = %path.display(), "loading hub configuration from file");
            crate::loader::load_file(path)?
        } else {
            debug!("no config file given, starting from embedded defaults");
            Self::default()
        };
        crate::env::apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate invariants that the type system alone cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if any quota or capacity is zero.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.quotas.max_conns_per_user == 0 {
            return Err(ConfigError::Invalid(
                "quotas.max_conns_per_user must be at least 1".to_string(),
            ));
        }
        if self.quotas.max_subs_per_conn == 0 {
            return Err(ConfigError::Invalid(
                "quotas.max_subs_per_conn must be at least 1".to_string(),
            ));
        }
        if self.capacities.lifecycle == 0
            || self.capacities.subscription == 0
            || self.capacities.control == 0
        {
            return Err(ConfigError::Invalid(
                "command channel capacities must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_design_fixed_constants() {
        let config = HubConfig::default();
        assert_eq!(config.quotas.max_conns_per_user, 3);
        assert_eq!(config.quotas.max_subs_per_conn, 50);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn zero_quota_fails_validation() {
        let mut config = HubConfig::default();
        config.quotas.max_conns_per_user = 0;
        assert!(config.validate().is_err());
    }
}
