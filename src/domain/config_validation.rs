//! Configuration validation.
//!
//! Every key is optional, but a key that is present must hold a usable value.

use crate::domain::app_config::StorageBackend;
use crate::domain::error::OunceError;
use crate::ports::config_port::{parse_bool, ConfigPort};

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), OunceError> {
    validate_storage(config)?;
    validate_positive(config, "account", "initial_cash")?;
    validate_positive(config, "account", "fx_rate")?;
    validate_daily_trade_limit(config)?;
    validate_positive(config, "guardrails", "max_position")?;
    validate_flag(config, "guardrails", "cooling_off")?;
    validate_log_level(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> OunceError {
    OunceError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn validate_storage(config: &dyn ConfigPort) -> Result<(), OunceError> {
    if let Some(backend) = config.get_string("storage", "backend") {
        if StorageBackend::parse(&backend).is_none() {
            return Err(invalid(
                "storage",
                "backend",
                format!("unknown backend '{backend}', expected json or sqlite"),
            ));
        }
    }
    if let Some(path) = config.get_string("storage", "path") {
        if path.trim().is_empty() {
            return Err(invalid("storage", "path", "path must not be empty"));
        }
    }
    Ok(())
}

fn validate_positive(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), OunceError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(());
    };
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(()),
        Ok(_) => Err(invalid(section, key, format!("{key} must be positive"))),
        Err(_) => Err(invalid(section, key, format!("'{raw}' is not a number"))),
    }
}

fn validate_daily_trade_limit(config: &dyn ConfigPort) -> Result<(), OunceError> {
    let Some(raw) = config.get_string("guardrails", "daily_trade_limit") else {
        return Ok(());
    };
    match raw.trim().parse::<u32>() {
        Ok(v) if v > 0 => Ok(()),
        _ => Err(invalid(
            "guardrails",
            "daily_trade_limit",
            "daily_trade_limit must be a positive whole number",
        )),
    }
}

fn validate_flag(config: &dyn ConfigPort, section: &str, key: &str) -> Result<(), OunceError> {
    match config.get_string(section, key) {
        Some(raw) if parse_bool(&raw).is_none() => Err(invalid(
            section,
            key,
            format!("'{raw}' is not true/false"),
        )),
        _ => Ok(()),
    }
}

fn validate_log_level(config: &dyn ConfigPort) -> Result<(), OunceError> {
    match config.get_string("logging", "level") {
        None => Ok(()),
        Some(level) => match level.trim().to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" | "off" => Ok(()),
            _ => Err(invalid(
                "logging",
                "level",
                format!("unknown level '{level}'"),
            )),
        },
    }
}
