//! Configuration file discovery and loading.

use std::path::Path;

use directories::ProjectDirs;

use crate::error::{ConfigError, ConfigResult};
use crate::types::HubConfig;

/// Load configuration from a single TOML file (no layering beyond env).
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read, or
/// [`ConfigError::Parse`] if its contents are not valid for
/// [`HubConfig`].
pub fn load_file(path: &Path) -> ConfigResult<HubConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

/// The conventional per-user config file path, if the platform exposes
/// a config directory (`~/.config/annot-hub/config.toml` on Linux).
#[must_use]
pub fn default_config_path() -> Option<std::path::PathBuf> {
    ProjectDirs::from("", "", "annot-hub").map(|dirs| dirs.config_dir().join("config.toml"))
}
