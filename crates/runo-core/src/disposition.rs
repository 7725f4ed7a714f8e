// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The structured outcome of a call and its typed field setter.
//!
//! Feedback forms address fields by name. [`DispositionField`] is the closed set
//! of names a form may use; [`Disposition::apply`] parses the raw form value into
//! the typed field and keeps the L1 → L2 and stage → level cascades consistent.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::ValidationError;

/// Call disposition collected after a call ends or fails to connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Disposition {
    /// First-level outcome, e.g. `Connected`.
    pub l1: String,
    /// Second-level outcome, e.g. `Discussed`.
    pub l2: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub next_follow_up_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notify: bool,
}

impl Disposition {
    pub fn new(l1: impl Into<String>, l2: impl Into<String>) -> Self {
        Self {
            l1: l1.into(),
            l2: l2.into(),
            ..Self::default()
        }
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.stage = Some(stage.into());
        self
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = Some(level.into());
        self
    }

    pub fn with_follow_up(mut self, at: DateTime<Utc>) -> Self {
        self.next_follow_up_at = Some(at);
        self
    }

    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Trimmed comment; an all-whitespace comment counts as empty.
    pub fn comment_text(&self) -> &str {
        self.comment.trim()
    }

    /// Sets one field from its raw form value.
    ///
    /// Changing `l1` clears `l2`, changing `stage` clears `level`.
    pub fn apply(&mut self, field: DispositionField, raw: &str) -> Result<(), ValidationError> {
        let value = raw.trim();
        match field {
            DispositionField::L1 => {
                if self.l1 != value {
                    self.l1 = value.to_string();
                    self.l2.clear();
                }
            }
            DispositionField::L2 => self.l2 = value.to_string(),
            DispositionField::Stage => {
                let stage = non_empty(value);
                if self.stage != stage {
                    self.stage = stage;
                    self.level = None;
                }
            }
            DispositionField::Level => self.level = non_empty(value),
            DispositionField::Comment => self.comment = raw.to_string(),
            DispositionField::NextFollowUpAt => {
                self.next_follow_up_at = if value.is_empty() {
                    None
                } else {
                    Some(parse_follow_up(value).ok_or_else(|| invalid(field, raw))?)
                };
            }
            DispositionField::Notify => {
                self.notify = parse_flag(value).ok_or_else(|| invalid(field, raw))?;
            }
        }
        Ok(())
    }

    /// Sets a field addressed by its form name.
    pub fn apply_named(&mut self, name: &str, raw: &str) -> Result<(), ValidationError> {
        let field = DispositionField::from_str(name.trim())
            .map_err(|_| ValidationError::UnknownField(name.to_string()))?;
        self.apply(field, raw)
    }
}

/// Closed set of disposition fields a feedback form can set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum DispositionField {
    #[strum(to_string = "l1", serialize = "callStatus")]
    L1,
    #[strum(to_string = "l2", serialize = "subStatus")]
    L2,
    #[strum(to_string = "stage")]
    Stage,
    #[strum(to_string = "level")]
    Level,
    #[strum(to_string = "comment", serialize = "feedback")]
    Comment,
    #[strum(to_string = "nextFollowUpAt", serialize = "followUpDate")]
    NextFollowUpAt,
    #[strum(to_string = "notify")]
    Notify,
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn invalid(field: DispositionField, raw: &str) -> ValidationError {
    ValidationError::InvalidFieldValue {
        field: field.to_string(),
        value: raw.to_string(),
    }
}

/// Accepts RFC 3339, `datetime-local` input values, and bare dates (midnight UTC).
fn parse_follow_up(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Some(true),
        "false" | "off" | "no" | "0" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn changing_l1_clears_l2() {
        let mut d = Disposition::new("Connected", "Discussed");
        d.apply(DispositionField::L1, "Not-Connected").unwrap();
        assert_eq!(d.l1, "Not-Connected");
        assert!(d.l2.is_empty());
    }

    #[test]
    fn reapplying_same_l1_keeps_l2() {
        let mut d = Disposition::new("Connected", "Discussed");
        d.apply(DispositionField::L1, "Connected").unwrap();
        assert_eq!(d.l2, "Discussed");
    }

    #[test]
    fn changing_stage_clears_level() {
        let mut d = Disposition::new("Connected", "Discussed")
            .with_stage("Warm")
            .with_level("L2");
        d.apply(DispositionField::Stage, "Hot").unwrap();
        assert_eq!(d.stage.as_deref(), Some("Hot"));
        assert!(d.level.is_none());
    }

    #[test]
    fn form_names_map_to_fields() {
        let mut d = Disposition::default();
        d.apply_named("callStatus", "Connected").unwrap();
        d.apply_named("subStatus", "Discussed").unwrap();
        d.apply_named("feedback", "asked for brochure").unwrap();
        d.apply_named("NOTIFY", "on").unwrap();
        assert_eq!(d.l1, "Connected");
        assert_eq!(d.l2, "Discussed");
        assert_eq!(d.comment, "asked for brochure");
        assert!(d.notify);
    }

    #[test]
    fn unknown_form_name_is_rejected() {
        let mut d = Disposition::default();
        let err = d.apply_named("priority", "high").unwrap_err();
        assert_eq!(err, ValidationError::UnknownField("priority".into()));
    }

    #[test]
    fn follow_up_accepts_datetime_local_and_dates() {
        let mut d = Disposition::default();
        d.apply(DispositionField::NextFollowUpAt, "2026-03-02T10:30").unwrap();
        assert_eq!(
            d.next_follow_up_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 2, 10, 30, 0).unwrap())
        );

        d.apply(DispositionField::NextFollowUpAt, "2026-03-05").unwrap();
        assert_eq!(
            d.next_follow_up_at,
            Some(Utc.with_ymd_and_hms(2026, 3, 5, 0, 0, 0).unwrap())
        );

        d.apply(DispositionField::NextFollowUpAt, "").unwrap();
        assert!(d.next_follow_up_at.is_none());
    }

    #[test]
    fn unparsable_follow_up_is_a_validation_error() {
        let mut d = Disposition::default();
        let err = d
            .apply(DispositionField::NextFollowUpAt, "next tuesday")
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFieldValue { ref field, .. } if field == "nextFollowUpAt"));
    }

    #[test]
    fn whitespace_comment_counts_as_empty() {
        let d = Disposition::new("Connected", "Discussed").with_comment("   ");
        assert!(d.comment_text().is_empty());
    }
}
