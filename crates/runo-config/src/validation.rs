// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive durations and unique stage codes.

use std::collections::HashSet;

use crate::diagnostic::ConfigError;
use crate::model::RunoConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Longest follow-up cap a stage may declare (100 years).
pub const MAX_FOLLOW_UP_DAYS: u32 = 36_500;

/// Longest follow-up offset, default or per stage (100 years).
pub const MAX_FOLLOW_UP_HOURS: u32 = 876_000;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &RunoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.session.watchdog_timeout_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "session.watchdog_timeout_ms must be greater than 0".to_string(),
        });
    }

    if config.session.tick_interval_ms == 0 {
        errors.push(ConfigError::Validation {
            message: "session.tick_interval_ms must be greater than 0".to_string(),
        });
    } else if config.session.tick_interval_ms >= config.session.watchdog_timeout_ms
        && config.session.watchdog_timeout_ms > 0
    {
        errors.push(ConfigError::Validation {
            message: format!(
                "session.tick_interval_ms ({}) must be shorter than session.watchdog_timeout_ms ({})",
                config.session.tick_interval_ms, config.session.watchdog_timeout_ms
            ),
        });
    }

    if config.follow_up.default_hours == 0 {
        errors.push(ConfigError::Validation {
            message: "follow_up.default_hours must be greater than 0".to_string(),
        });
    } else if config.follow_up.default_hours > MAX_FOLLOW_UP_HOURS {
        errors.push(ConfigError::Validation {
            message: format!("follow_up.default_hours must be at most {MAX_FOLLOW_UP_HOURS}"),
        });
    }

    let mut seen_codes = HashSet::new();
    for (i, stage) in config.follow_up.stages.iter().enumerate() {
        let code = stage.code.trim();
        if code.is_empty() {
            errors.push(ConfigError::Validation {
                message: format!("follow_up.stages[{i}].code must not be empty"),
            });
            continue;
        }

        if !seen_codes.insert(code.to_string()) {
            errors.push(ConfigError::Validation {
                message: format!("duplicate stage code `{code}` in follow_up.stages"),
            });
        }

        match stage.max_days {
            Some(0) => errors.push(ConfigError::Validation {
                message: format!("follow_up.stages[{i}].max_days must be at least 1"),
            }),
            Some(days) if days > MAX_FOLLOW_UP_DAYS => errors.push(ConfigError::Validation {
                message: format!(
                    "follow_up.stages[{i}].max_days must be at most {MAX_FOLLOW_UP_DAYS}"
                ),
            }),
            _ => {}
        }

        match stage.auto_hours {
            Some(0) => errors.push(ConfigError::Validation {
                message: format!("follow_up.stages[{i}].auto_hours must be greater than 0"),
            }),
            Some(hours) if hours > MAX_FOLLOW_UP_HOURS => errors.push(ConfigError::Validation {
                message: format!(
                    "follow_up.stages[{i}].auto_hours must be at most {MAX_FOLLOW_UP_HOURS}"
                ),
            }),
            _ => {}
        }
    }

    let level = config.logging.level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "logging.level `{}` is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
