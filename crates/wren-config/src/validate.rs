//! Post-parse configuration validation.

use crate::error::{ConfigError, ConfigResult};
use crate::types::WrenConfig;

/// Validate a parsed configuration's cross-field invariants.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &WrenConfig) -> ConfigResult<()> {
    validate_session(config)?;
    validate_delegation(config)?;
    validate_tools(config)?;
    validate_retry(config)?;
    Ok(())
}

fn validate_session(config: &WrenConfig) -> ConfigResult<()> {
    if config.session.max_iterations == 0 {
        return Err(ConfigError::Validation {
            field: "session.maxIterations".to_owned(),
            message: "must be at least 1".to_owned(),
        });
    }
    Ok(())
}

fn validate_delegation(config: &WrenConfig) -> ConfigResult<()> {
    if config.delegation.max_depth == 0 {
        return Err(ConfigError::Validation {
            field: "delegation.maxDepth".to_owned(),
            message: "must be at least 1".to_owned(),
        });
    }
    Ok(())
}

fn validate_tools(config: &WrenConfig) -> ConfigResult<()> {
    if config.tools.max_concurrent == 0 {
        return Err(ConfigError::Validation {
            field: "tools.maxConcurrent".to_owned(),
            message: "must be at least 1".to_owned(),
        });
    }
    Ok(())
}

fn validate_retry(config: &WrenConfig) -> ConfigResult<()> {
    let retry = &config.transport.retry;

    if retry.base_delay_ms > retry.max_delay_ms {
        return Err(ConfigError::Validation {
            field: "transport.retry.baseDelayMs".to_owned(),
            message: "must not exceed maxDelayMs".to_owned(),
        });
    }

    if !retry.multiplier.is_finite() || retry.multiplier < 1.0 {
        return Err(ConfigError::Validation {
            field: "transport.retry.multiplier".to_owned(),
            message: "must be finite and at least 1.0".to_owned(),
        });
    }

    if !(0.0..=1.0).contains(&retry.jitter) {
        return Err(ConfigError::Validation {
            field: "transport.retry.jitter".to_owned(),
            message: "must be between 0.0 and 1.0".to_owned(),
        });
    }

    Ok(())
}
