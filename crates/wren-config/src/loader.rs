//! Loading a [`WrenConfig`] from a single TOML file or string.

use std::path::Path;

use crate::error::{ConfigError, ConfigResult};
use crate::types::WrenConfig;
use crate::validate;

/// Parse `toml` into a validated [`WrenConfig`].
///
/// Unset sections and fields fall back to their documented defaults.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the TOML is malformed or the parsed
/// configuration fails validation.
pub fn load_str(toml: &str) -> ConfigResult<WrenConfig> {
    let config: WrenConfig = toml::from_str(toml)?;
    validate::validate(&config)?;
    Ok(config)
}

/// Read and parse `path` into a validated [`WrenConfig`].
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read, its TOML is
/// malformed, or the parsed configuration fails validation.
pub fn load_file(path: &Path) -> ConfigResult<WrenConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.display().to_string(), source })?;
    let config = load_str(&content)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}
