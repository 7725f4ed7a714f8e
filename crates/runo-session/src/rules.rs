// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Disposition rule table and follow-up policy.
//!
//! The table encodes business policy as it was given: every `Connected`
//! outcome needs a comment, `Not-Connected` outcomes do not, except
//! `Invalid Number`. Do not derive these entries from one another.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};
use runo_config::model::FollowUpConfig;
use runo_core::{Disposition, ValidationError};

use crate::profile::FeedbackRequirements;

pub const CONNECTED: &str = "Connected";
pub const NOT_CONNECTED: &str = "Not-Connected";

/// Per-outcome rule, keyed by `"L1:L2"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispositionRule {
    pub comment_mandatory: bool,
    /// Fill the follow-up date automatically when the operator leaves it empty.
    pub auto_follow_up: bool,
}

/// Follow-up rule for one stage code.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageRule {
    /// Latest allowed follow-up, in days from now.
    pub max_days: Option<u32>,
    /// Offset of the auto-computed follow-up, replacing the default.
    pub auto_hours: Option<u32>,
}

/// One row of the rule table, in cascade order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleRow<'a> {
    pub l1: &'a str,
    pub l2: &'a str,
    pub rule: DispositionRule,
}

// (L1, L2, comment_mandatory, auto_follow_up)
const BUILTIN: &[(&str, &str, bool, bool)] = &[
    (CONNECTED, "Discussed", true, false),
    (CONNECTED, "Interested", true, false),
    (CONNECTED, "Not Interested", true, false),
    (CONNECTED, "Call Back Later", true, true),
    (CONNECTED, "Already Enrolled", true, false),
    (CONNECTED, "Wrong Person", true, false),
    (NOT_CONNECTED, "Not Lifting", false, true),
    (NOT_CONNECTED, "Busy", false, true),
    (NOT_CONNECTED, "Switched Off", false, true),
    (NOT_CONNECTED, "Not Reachable", false, true),
    (NOT_CONNECTED, "Invalid Number", true, false),
];

/// Static lookup deciding comment and follow-up requirements.
#[derive(Debug, Clone)]
pub struct DispositionRules {
    cascade: Vec<(String, Vec<String>)>,
    rules: HashMap<String, DispositionRule>,
    stages: HashMap<String, StageRule>,
    default_follow_up: TimeDelta,
}

impl DispositionRules {
    /// The built-in outcome table with no stage rules and a 24h default follow-up.
    pub fn builtin() -> Self {
        let mut cascade: Vec<(String, Vec<String>)> = Vec::new();
        let mut rules = HashMap::new();

        for &(l1, l2, comment_mandatory, auto_follow_up) in BUILTIN {
            match cascade.iter_mut().find(|(name, _)| name == l1) {
                Some((_, l2s)) => l2s.push(l2.to_string()),
                None => cascade.push((l1.to_string(), vec![l2.to_string()])),
            }
            rules.insert(
                rule_key(l1, l2),
                DispositionRule {
                    comment_mandatory,
                    auto_follow_up,
                },
            );
        }

        Self {
            cascade,
            rules,
            stages: HashMap::new(),
            default_follow_up: TimeDelta::hours(24),
        }
    }

    /// The built-in outcome table with stage rules and default offset from config.
    pub fn from_config(config: &FollowUpConfig) -> Self {
        let mut rules = Self::builtin().with_default_follow_up_hours(config.default_hours);
        for stage in &config.stages {
            rules = rules.with_stage(
                stage.code.trim(),
                StageRule {
                    max_days: stage.max_days,
                    auto_hours: stage.auto_hours,
                },
            );
        }
        rules
    }

    pub fn with_stage(mut self, code: impl Into<String>, rule: StageRule) -> Self {
        self.stages.insert(code.into(), rule);
        self
    }

    pub fn with_default_follow_up_hours(mut self, hours: u32) -> Self {
        self.default_follow_up = TimeDelta::hours(i64::from(hours));
        self
    }

    /// L1 values in display order.
    pub fn l1_options(&self) -> impl Iterator<Item = &str> {
        self.cascade.iter().map(|(l1, _)| l1.as_str())
    }

    /// L2 values reachable from `l1`, or `None` for an unknown L1.
    pub fn l2_options(&self, l1: &str) -> Option<&[String]> {
        self.cascade
            .iter()
            .find(|(name, _)| name == l1)
            .map(|(_, l2s)| l2s.as_slice())
    }

    /// Every (L1, L2) pair with its rule, in cascade order.
    pub fn rows(&self) -> Vec<RuleRow<'_>> {
        self.cascade
            .iter()
            .flat_map(|(l1, l2s)| {
                l2s.iter().map(move |l2| RuleRow {
                    l1,
                    l2,
                    rule: self.rule(l1, l2),
                })
            })
            .collect()
    }

    /// Rule for the pair; unknown pairs get the default (nothing mandatory).
    pub fn rule(&self, l1: &str, l2: &str) -> DispositionRule {
        self.rules
            .get(&rule_key(l1, l2))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_comment_mandatory(&self, l1: &str, l2: &str) -> bool {
        self.rule(l1, l2).comment_mandatory
    }

    pub fn stage_rule(&self, stage: &str) -> Option<&StageRule> {
        self.stages.get(stage)
    }

    /// Auto follow-up: `now` plus the stage offset (default 24h), never past the stage cap.
    ///
    /// Fails with [`ValidationError::FollowUpOutOfRange`] when the offset
    /// leaves the representable date range.
    pub fn compute_auto_follow_up(
        &self,
        stage: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ValidationError> {
        let rule = stage.and_then(|s| self.stage_rule(s)).copied().unwrap_or_default();
        let offset = match rule.auto_hours {
            Some(h) => TimeDelta::try_hours(i64::from(h)),
            None => Some(self.default_follow_up),
        };
        let proposed = offset
            .and_then(|offset| now.checked_add_signed(offset))
            .ok_or(ValidationError::FollowUpOutOfRange)?;
        // A cap beyond the date range does not constrain anything.
        Ok(match rule.max_days.and_then(|days| cap_at(now, days)) {
            Some(cap) => proposed.min(cap),
            None => proposed,
        })
    }

    /// Rejects follow-ups in the past or beyond the stage cap.
    pub fn check_follow_up(
        &self,
        stage: Option<&str>,
        at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if at < now {
            return Err(ValidationError::FollowUpInPast);
        }
        let Some(stage) = stage else {
            return Ok(());
        };
        if let Some(max_days) = self.stage_rule(stage).and_then(|r| r.max_days) {
            if cap_at(now, max_days).is_some_and(|cap| at > cap) {
                return Err(ValidationError::FollowUpBeyondCap {
                    stage: stage.to_string(),
                    max_days,
                });
            }
        }
        Ok(())
    }

    /// Validates a disposition and returns it normalized (trimmed, with the
    /// auto follow-up filled in when the outcome asks for one).
    pub fn validate(
        &self,
        draft: &Disposition,
        requirements: FeedbackRequirements,
        now: DateTime<Utc>,
    ) -> Result<Disposition, ValidationError> {
        let mut d = draft.clone();
        d.l1 = d.l1.trim().to_string();
        d.l2 = d.l2.trim().to_string();
        d.stage = d.stage.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        d.level = d.level.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

        if d.l1.is_empty() {
            return Err(ValidationError::MissingL1);
        }
        let options = self
            .l2_options(&d.l1)
            .ok_or_else(|| ValidationError::UnknownL1 { l1: d.l1.clone() })?;
        if !options.is_empty() {
            if d.l2.is_empty() {
                return Err(ValidationError::MissingL2 { l1: d.l1.clone() });
            }
            if !options.iter().any(|o| *o == d.l2) {
                return Err(ValidationError::UnknownL2 {
                    l1: d.l1.clone(),
                    l2: d.l2.clone(),
                });
            }
        }

        let rule = self.rule(&d.l1, &d.l2);
        if rule.comment_mandatory && d.comment_text().is_empty() {
            return Err(ValidationError::CommentRequired {
                l1: d.l1.clone(),
                l2: d.l2.clone(),
            });
        }

        if requirements.stage && d.stage.is_none() {
            return Err(ValidationError::MissingStage);
        }
        if requirements.level && d.level.is_none() {
            return Err(ValidationError::MissingLevel);
        }

        match d.next_follow_up_at {
            Some(at) => self.check_follow_up(d.stage.as_deref(), at, now)?,
            None if rule.auto_follow_up => {
                d.next_follow_up_at = Some(self.compute_auto_follow_up(d.stage.as_deref(), now)?);
            }
            None => {}
        }

        Ok(d)
    }
}

impl Default for DispositionRules {
    fn default() -> Self {
        Self::builtin()
    }
}

fn cap_at(now: DateTime<Utc>, max_days: u32) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(i64::from(max_days)).and_then(|cap| now.checked_add_signed(cap))
}

/// The literal `"L1:L2"` lookup key.
pub fn rule_key(l1: &str, l2: &str) -> String {
    format!("{l1}:{l2}")
}
