// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./runo.toml` > `~/.config/runo/runo.toml` > `/etc/runo/runo.toml`
//! with environment variable overrides via `RUNO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::RunoConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/runo/runo.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "runo.toml";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/runo/runo.toml` (system-wide)
/// 3. `~/.config/runo/runo.toml` (user XDG config)
/// 4. `./runo.toml` (local directory)
/// 5. `RUNO_*` environment variables
pub fn load_config() -> Result<RunoConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<RunoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RunoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<RunoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(RunoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(RunoConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// `~/.config/runo/runo.toml`, when the platform has a config dir.
pub fn user_config_path() -> Option<std::path::PathBuf> {
    dirs::config_dir().map(|d| d.join("runo").join("runo.toml"))
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `RUNO_SESSION_WATCHDOG_TIMEOUT_MS` must map to
/// `session.watchdog_timeout_ms`, and `RUNO_FOLLOW_UP_DEFAULT_HOURS` to
/// `follow_up.default_hours`.
fn env_provider() -> Env {
    Env::prefixed("RUNO_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("session_", "session.", 1)
            .replacen("follow_up_", "follow_up.", 1)
            .replacen("notifications_", "notifications.", 1)
            .replacen("logging_", "logging.", 1);
        mapped.into()
    })
}
