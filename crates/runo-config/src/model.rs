// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Runo call-session workspace.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Runo configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RunoConfig {
    /// Call session timing and termination matching.
    #[serde(default)]
    pub session: SessionConfig,

    /// Follow-up scheduling rules.
    #[serde(default)]
    pub follow_up: FollowUpConfig,

    /// User-visible notification settings.
    #[serde(default)]
    pub notifications: NotificationsConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Call session timing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// How long to wait for a termination signal before flagging no-response.
    #[serde(default = "default_watchdog_timeout_ms")]
    pub watchdog_timeout_ms: u64,

    /// Interval between elapsed-timer ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// How termination broadcasts are matched to the active session.
    #[serde(default)]
    pub match_policy: MatchPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            watchdog_timeout_ms: default_watchdog_timeout_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            match_policy: MatchPolicy::default(),
        }
    }
}

fn default_watchdog_timeout_ms() -> u64 {
    30_000
}

fn default_tick_interval_ms() -> u64 {
    500
}

/// Identifier-matching policy for termination broadcasts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Compare call ids when both sides have one, otherwise compare subject ids.
    #[default]
    CallIdThenSubject,
    /// Only events carrying the session's call id match.
    CallIdOnly,
    /// Only events carrying the session's subject id match.
    SubjectOnly,
}

/// Follow-up scheduling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FollowUpConfig {
    /// Offset of the auto-computed follow-up when no stage rule overrides it.
    #[serde(default = "default_follow_up_hours")]
    pub default_hours: u32,

    /// Per-stage follow-up rules.
    #[serde(default = "default_stage_rules")]
    pub stages: Vec<StageRuleConfig>,
}

impl Default for FollowUpConfig {
    fn default() -> Self {
        Self {
            default_hours: default_follow_up_hours(),
            stages: default_stage_rules(),
        }
    }
}

fn default_follow_up_hours() -> u32 {
    24
}

fn default_stage_rules() -> Vec<StageRuleConfig> {
    vec![
        StageRuleConfig {
            code: "Hot".to_string(),
            max_days: Some(3),
            auto_hours: None,
        },
        StageRuleConfig {
            code: "Warm".to_string(),
            max_days: Some(7),
            auto_hours: None,
        },
        StageRuleConfig {
            code: "Cold".to_string(),
            max_days: Some(30),
            auto_hours: Some(72),
        },
    ]
}

/// Follow-up rule for one stage code.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StageRuleConfig {
    /// Stage code as sent by the feedback form.
    pub code: String,

    /// Latest allowed follow-up, in days from now. `None` means uncapped.
    #[serde(default)]
    pub max_days: Option<u32>,

    /// Offset of the auto-computed follow-up for this stage.
    #[serde(default)]
    pub auto_hours: Option<u32>,
}

/// Notification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NotificationsConfig {
    /// Emit toast notifications for session transitions.
    #[serde(default = "default_notifications_enabled")]
    pub enabled: bool,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: default_notifications_enabled(),
        }
    }
}

fn default_notifications_enabled() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dialer_constants() {
        let config = RunoConfig::default();
        assert_eq!(config.session.watchdog_timeout_ms, 30_000);
        assert_eq!(config.session.tick_interval_ms, 500);
        assert_eq!(config.session.match_policy, MatchPolicy::CallIdThenSubject);
        assert_eq!(config.follow_up.default_hours, 24);
        assert!(config.notifications.enabled);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn default_stage_rules_are_present() {
        let config = FollowUpConfig::default();
        let codes: Vec<&str> = config.stages.iter().map(|s| s.code.as_str()).collect();
        assert_eq!(codes, vec!["Hot", "Warm", "Cold"]);
    }

    #[test]
    fn stages_override_replaces_defaults() {
        let toml_str = r#"
[follow_up]
stages = [{ code = "Enrolled", max_days = 2 }]
"#;
        let config: RunoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.follow_up.stages.len(), 1);
        assert_eq!(config.follow_up.stages[0].code, "Enrolled");
        assert_eq!(config.follow_up.stages[0].max_days, Some(2));
        assert_eq!(config.follow_up.stages[0].auto_hours, None);
    }

    #[test]
    fn match_policy_parses_snake_case() {
        let toml_str = r#"
[session]
match_policy = "subject_only"
"#;
        let config: RunoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.session.match_policy, MatchPolicy::SubjectOnly);
    }
}
