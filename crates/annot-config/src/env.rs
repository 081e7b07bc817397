//! Environment variable fallback resolution.
//!
//! Every `ANNOT_HUB_*` variable overrides whatever the file/default
//! layer produced, which is why this step runs last in
//! [`crate::HubConfig::load`].

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::types::HubConfig;

const MAX_CONNS_PER_USER: &str = "ANNOT_HUB_MAX_CONNS_PER_USER";
const MAX_SUBS_PER_CONN: &str = "ANNOT_HUB_MAX_SUBS_PER_CONN";
const LOG_LEVEL: &str = "ANNOT_HUB_LOG_LEVEL";
const BACKPLANE_URL: &str = "ANNOT_HUB_BACKPLANE_URL";

/// Apply any `ANNOT_HUB_*` environment variables on top of `config`.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidEnvValue`] if a numeric variable holds
/// a value that does not parse.
pub fn apply_env_overrides(config: &mut HubConfig) -> ConfigResult<()> {
    if let Some(value) = read_usize(MAX_CONNS_PER_USER)? {
        debug!(var = MAX_CONNS_PER_USER, value, "applying env override");
        config.quotas.max_conns_per_user = value;
    }
    if let Some(value) = read_usize(MAX_SUBS_PER_CONN)? {
        debug!(var = MAX_SUBS_PER_CONN, value, "applying env override");
        config.quotas.max_subs_per_conn = value;
    }
    if let Ok(value) = std::env::var(LOG_LEVEL) {
        debug!(var = LOG_LEVEL, value = %value, "applying env override");
        config.log_level = value;
    }
    if let Ok(value) = std::env::var(BACKPLANE_URL) {
        debug!(var = BACKPLANE_URL, "applying env override");
        config.backplane.url = Some(value);
    }
    Ok(())
}

fn read_usize(var: &str) -> ConfigResult<Option<usize>> {
    match std::env::var(var) {
        Ok(raw) => raw
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnvValue {
                var: var.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}
