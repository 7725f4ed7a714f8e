// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the call-session state machine and its collaborators.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Opaque identifier of the record being called (lead, enrollment, attendee).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(pub String);

impl SubjectId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the id is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(s: &str) -> Self {
        SubjectId(s.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(s: String) -> Self {
        SubjectId(s)
    }
}

/// Identifier assigned by the remote dialing service once dialing succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallId(pub String);

impl CallId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CallId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CallId {
    fn from(s: &str) -> Self {
        CallId(s.to_string())
    }
}

impl From<String> for CallId {
    fn from(s: String) -> Self {
        CallId(s)
    }
}

/// Unique identifier of one dialing attempt. Used by the stale-response guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub uuid::Uuid);

impl SessionId {
    pub fn new() -> Self {
        SessionId(uuid::Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle state of a call session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Idle,
    Dialing,
    InCall,
    NoResponse,
    Ended,
    Failed,
}

impl CallStatus {
    /// A call is being placed or is live; a second `start` must be rejected.
    pub fn is_active(self) -> bool {
        matches!(self, CallStatus::Dialing | CallStatus::InCall)
    }

    /// The call may still be connected and can be ended by the operator.
    pub fn is_live(self) -> bool {
        matches!(self, CallStatus::InCall | CallStatus::NoResponse)
    }

    /// The attempt is over and awaits a disposition.
    pub fn awaits_feedback(self) -> bool {
        matches!(self, CallStatus::Ended | CallStatus::Failed)
    }
}

/// Which calling context a session belongs to. Collaborators use it to pick
/// the remote endpoint they bind.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CallContextKind {
    Lead,
    CourseAllocation,
    WebinarAttendee,
}

/// Severity of a user-visible notification (toast).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A fire-and-forget, user-visible status message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, severity: Severity) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            severity,
        }
    }
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Dialer,
    Feedback,
    Notifier,
}

/// Successful response of the remote dial request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialResponse {
    pub call_id: CallId,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Out-of-band notification that a call has ended.
///
/// Delivered over a shared broadcast channel with no addressing; every field is
/// optional and empty strings are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TerminationEvent {
    #[serde(default, alias = "subject_id")]
    pub subject_id: Option<SubjectId>,
    #[serde(default, alias = "call_id")]
    pub call_id: Option<CallId>,
    #[serde(default, alias = "duration_seconds")]
    pub duration_seconds: Option<u64>,
}

impl TerminationEvent {
    /// Event addressed by the dialer's call id.
    pub fn for_call(call_id: impl Into<CallId>) -> Self {
        Self {
            call_id: Some(call_id.into()),
            ..Self::default()
        }
    }

    /// Event addressed by the subject id only.
    pub fn for_subject(subject_id: impl Into<SubjectId>) -> Self {
        Self {
            subject_id: Some(subject_id.into()),
            ..Self::default()
        }
    }

    /// Attaches the call duration reported by the dialer.
    pub fn with_duration(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    /// The call id, ignoring empty values.
    pub fn call_id(&self) -> Option<&CallId> {
        self.call_id.as_ref().filter(|c| !c.0.trim().is_empty())
    }

    /// The subject id, ignoring empty values.
    pub fn subject_id(&self) -> Option<&SubjectId> {
        self.subject_id.as_ref().filter(|s| !s.is_blank())
    }
}

/// Body of the remote feedback-submission request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPayload {
    pub context: CallContextKind,
    pub subject_id: SubjectId,
    pub call_id: Option<CallId>,
    pub feedback: String,
    pub next_follow_up_at: Option<DateTime<Utc>>,
    pub l1: String,
    pub l2: String,
    pub stage: Option<String>,
    pub level: Option<String>,
    pub notify: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn call_status_display_round_trip() {
        let variants = [
            CallStatus::Idle,
            CallStatus::Dialing,
            CallStatus::InCall,
            CallStatus::NoResponse,
            CallStatus::Ended,
            CallStatus::Failed,
        ];
        for variant in variants {
            let parsed = CallStatus::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
        assert_eq!(CallStatus::InCall.to_string(), "in_call");
        assert_eq!(CallStatus::NoResponse.to_string(), "no_response");
    }

    #[test]
    fn status_predicates() {
        assert!(CallStatus::Dialing.is_active());
        assert!(CallStatus::InCall.is_active());
        assert!(!CallStatus::NoResponse.is_active());
        assert!(CallStatus::NoResponse.is_live());
        assert!(CallStatus::Failed.awaits_feedback());
        assert!(!CallStatus::InCall.awaits_feedback());
    }

    #[test]
    fn termination_event_parses_platform_json() {
        let event: TerminationEvent =
            serde_json::from_str(r#"{"callId":"C1","durationSeconds":42}"#).unwrap();
        assert_eq!(event.call_id(), Some(&CallId::from("C1")));
        assert_eq!(event.duration_seconds, Some(42));
        assert!(event.subject_id().is_none());
    }

    #[test]
    fn termination_event_accepts_snake_case_keys() {
        let event: TerminationEvent =
            serde_json::from_str(r#"{"subject_id":"LEAD-1"}"#).unwrap();
        assert_eq!(event.subject_id(), Some(&SubjectId::from("LEAD-1")));
    }

    #[test]
    fn empty_identifiers_are_treated_as_absent() {
        let event = TerminationEvent {
            subject_id: Some(SubjectId::from("  ")),
            call_id: Some(CallId::from("")),
            duration_seconds: None,
        };
        assert!(event.call_id().is_none());
        assert!(event.subject_id().is_none());
    }

    #[test]
    fn feedback_payload_serializes_camel_case() {
        let payload = FeedbackPayload {
            context: CallContextKind::Lead,
            subject_id: SubjectId::from("LEAD-1"),
            call_id: Some(CallId::from("C1")),
            feedback: "spoke to parent".into(),
            next_follow_up_at: None,
            l1: "Connected".into(),
            l2: "Discussed".into(),
            stage: Some("Warm".into()),
            level: None,
            notify: false,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["subjectId"], "LEAD-1");
        assert_eq!(json["callId"], "C1");
        assert_eq!(json["context"], "lead");
        assert!(json["nextFollowUpAt"].is_null());
    }
}
