// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-attempt call session FSM.
//!
//! Each session goes through `Idle -> Dialing -> {InCall | Failed}`, then
//! `InCall -> {NoResponse | Ended}` and `NoResponse -> Ended`. `Ended` and
//! `Failed` open the feedback step. The session holds no tasks of its own;
//! the controller drives it and owns the watchdog.

use std::time::Duration;

use chrono::{DateTime, Utc};
use runo_config::MatchPolicy;
use runo_core::{
    CallId, CallStatus, DialResponse, Disposition, SessionId, SubjectId, TerminationEvent,
    ValidationError,
};
use serde::Serialize;
use tokio::time::Instant;

use crate::timer::ElapsedTimer;

/// Read-only view of the session published to view layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub session_id: Option<SessionId>,
    pub status: CallStatus,
    pub subject_id: Option<SubjectId>,
    pub call_id: Option<CallId>,
    pub display_name: Option<String>,
    pub elapsed: String,
    pub feedback_open: bool,
    pub last_error: Option<String>,
}

impl SessionSnapshot {
    /// Snapshot of a controller with no session.
    pub fn idle() -> Self {
        Self {
            session_id: None,
            status: CallStatus::Idle,
            subject_id: None,
            call_id: None,
            display_name: None,
            elapsed: "00:00".to_string(),
            feedback_open: false,
            last_error: None,
        }
    }
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::idle()
    }
}

/// One dialing attempt for one subject.
#[derive(Debug, Clone)]
pub struct CallSession {
    id: SessionId,
    subject_id: SubjectId,
    external_call_id: Option<CallId>,
    display_name: Option<String>,
    status: CallStatus,
    started_at: Option<DateTime<Utc>>,
    timer: ElapsedTimer,
    feedback_open: bool,
    disposition: Option<Disposition>,
    last_error: Option<String>,
}

impl CallSession {
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            id: SessionId::new(),
            subject_id,
            external_call_id: None,
            display_name: None,
            status: CallStatus::Idle,
            started_at: None,
            timer: ElapsedTimer::new(),
            feedback_open: false,
            disposition: None,
            last_error: None,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn subject_id(&self) -> &SubjectId {
        &self.subject_id
    }

    pub fn call_id(&self) -> Option<&CallId> {
        self.external_call_id.as_ref()
    }

    pub fn status(&self) -> CallStatus {
        self.status
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn is_feedback_open(&self) -> bool {
        self.feedback_open
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        self.timer.elapsed(now)
    }

    pub fn elapsed_label(&self, now: Instant) -> String {
        self.timer.label(now)
    }

    pub fn disposition(&self) -> Option<&Disposition> {
        self.disposition.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `Idle -> Dialing`. Records the start time and restarts the timer from zero.
    pub fn begin_dialing(
        &mut self,
        wall_clock: DateTime<Utc>,
        now: Instant,
    ) -> Result<(), ValidationError> {
        self.require(CallStatus::Idle, "start")?;
        self.started_at = Some(wall_clock);
        self.timer.start(now);
        self.status = CallStatus::Dialing;
        Ok(())
    }

    /// `Dialing -> InCall` with the dialer's call id.
    pub fn connect(&mut self, response: DialResponse) -> Result<(), ValidationError> {
        self.require(CallStatus::Dialing, "connect")?;
        self.external_call_id = Some(response.call_id);
        self.display_name = response.display_name.filter(|n| !n.trim().is_empty());
        self.status = CallStatus::InCall;
        Ok(())
    }

    /// `Dialing -> Failed`. Stops the timer and opens feedback.
    pub fn fail_dial(&mut self, message: String, now: Instant) -> Result<(), ValidationError> {
        self.require(CallStatus::Dialing, "fail")?;
        self.timer.stop(now);
        self.status = CallStatus::Failed;
        self.feedback_open = true;
        self.last_error = Some(message);
        Ok(())
    }

    /// Whether a termination broadcast is addressed to this session.
    pub fn matches(&self, event: &TerminationEvent, policy: MatchPolicy) -> bool {
        let by_call = match (event.call_id(), self.external_call_id.as_ref()) {
            (Some(theirs), Some(ours)) => Some(theirs == ours),
            _ => None,
        };
        let by_subject = event.subject_id().map(|s| *s == self.subject_id);

        match policy {
            MatchPolicy::CallIdThenSubject => by_call.or(by_subject).unwrap_or(false),
            MatchPolicy::CallIdOnly => by_call.unwrap_or(false),
            MatchPolicy::SubjectOnly => by_subject.unwrap_or(false),
        }
    }

    /// `InCall | NoResponse -> Ended` from a termination broadcast.
    ///
    /// A reported duration replaces the measured elapsed value. Returns
    /// `false` when the session was not live, which makes duplicates no-ops.
    pub fn terminate(&mut self, reported: Option<Duration>, now: Instant) -> bool {
        if !self.status.is_live() {
            return false;
        }
        self.timer.stop(now);
        if let Some(duration) = reported {
            self.timer.override_elapsed(duration, now);
        }
        self.status = CallStatus::Ended;
        self.feedback_open = true;
        true
    }

    /// `InCall -> NoResponse`. Feedback stays closed and the timer keeps running.
    pub fn mark_no_response(&mut self) -> bool {
        if self.status != CallStatus::InCall {
            return false;
        }
        self.status = CallStatus::NoResponse;
        true
    }

    /// `InCall | NoResponse -> Ended` on operator request.
    pub fn end(&mut self, now: Instant) -> Result<(), ValidationError> {
        if !self.status.is_live() {
            return Err(ValidationError::InvalidTransition {
                operation: "end",
                status: self.status,
            });
        }
        self.timer.stop(now);
        self.status = CallStatus::Ended;
        self.feedback_open = true;
        Ok(())
    }

    /// Keeps the latest validated disposition so a failed submission can be retried.
    pub fn retain(&mut self, disposition: Disposition) {
        self.disposition = Some(disposition);
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.last_error = Some(message.into());
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        SessionSnapshot {
            session_id: Some(self.id),
            status: self.status,
            subject_id: Some(self.subject_id.clone()),
            call_id: self.external_call_id.clone(),
            display_name: self.display_name.clone(),
            elapsed: self.timer.label(now),
            feedback_open: self.feedback_open,
            last_error: self.last_error.clone(),
        }
    }

    fn require(&self, expected: CallStatus, operation: &'static str) -> Result<(), ValidationError> {
        if self.status == expected {
            Ok(())
        } else {
            Err(ValidationError::InvalidTransition {
                operation,
                status: self.status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn in_call(subject: &str, call: &str) -> CallSession {
        let now = Instant::now();
        let mut session = CallSession::new(subject.into());
        session.begin_dialing(Utc::now(), now).unwrap();
        session
            .connect(DialResponse {
                call_id: call.into(),
                display_name: None,
            })
            .unwrap();
        session
    }

    #[test]
    fn begin_dialing_only_from_idle() {
        let now = Instant::now();
        let mut session = CallSession::new("LEAD-1".into());
        session.begin_dialing(Utc::now(), now).unwrap();
        assert_eq!(session.status(), CallStatus::Dialing);
        assert!(session.is_timer_running());
        assert!(session.started_at().is_some());

        let err = session.begin_dialing(Utc::now(), now).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidTransition { status: CallStatus::Dialing, .. }));
    }

    #[test]
    fn fail_dial_stops_timer_and_opens_feedback() {
        let t0 = Instant::now();
        let mut session = CallSession::new("LEAD-2".into());
        session.begin_dialing(Utc::now(), t0).unwrap();
        session
            .fail_dial("busy".into(), t0 + Duration::from_secs(2))
            .unwrap();
        assert_eq!(session.status(), CallStatus::Failed);
        assert!(session.is_feedback_open());
        assert!(!session.is_timer_running());
        assert_eq!(session.last_error(), Some("busy"));
    }

    #[test]
    fn terminate_overrides_elapsed_with_reported_duration() {
        let mut session = in_call("LEAD-1", "C1");
        let later = Instant::now() + Duration::from_secs(3);
        assert!(session.terminate(Some(Duration::from_secs(42)), later));
        assert_eq!(session.status(), CallStatus::Ended);
        assert_eq!(session.elapsed_label(later + Duration::from_secs(9)), "00:42");
        assert!(session.is_feedback_open());
    }

    #[test]
    fn duplicate_terminate_is_noop() {
        let mut session = in_call("LEAD-1", "C1");
        let now = Instant::now();
        assert!(session.terminate(Some(Duration::from_secs(10)), now));
        assert!(!session.terminate(Some(Duration::from_secs(99)), now));
        assert_eq!(session.elapsed_label(now), "00:10");
    }

    #[test]
    fn no_response_only_from_in_call() {
        let mut session = in_call("LEAD-1", "C1");
        assert!(session.mark_no_response());
        assert!(!session.mark_no_response());
        assert_eq!(session.status(), CallStatus::NoResponse);
        assert!(session.is_timer_running());
        assert!(!session.is_feedback_open());
    }

    #[test]
    fn end_from_no_response() {
        let mut session = in_call("LEAD-1", "C1");
        session.mark_no_response();
        session.end(Instant::now()).unwrap();
        assert_eq!(session.status(), CallStatus::Ended);
        assert!(session.end(Instant::now()).is_err());
    }

    #[test]
    fn call_id_takes_precedence_over_subject() {
        let session = in_call("LEAD-1", "C1");
        let policy = MatchPolicy::CallIdThenSubject;
        assert!(session.matches(&TerminationEvent::for_call("C1"), policy));
        assert!(!session.matches(&TerminationEvent::for_call("C2"), policy));

        let mut wrong_call_same_subject = TerminationEvent::for_call("C2");
        wrong_call_same_subject.subject_id = Some("LEAD-1".into());
        assert!(!session.matches(&wrong_call_same_subject, policy));

        assert!(session.matches(&TerminationEvent::for_subject("LEAD-1"), policy));
        assert!(!session.matches(&TerminationEvent::default(), policy));
    }

    #[test]
    fn subject_fallback_before_call_id_is_known() {
        let now = Instant::now();
        let mut session = CallSession::new("LEAD-1".into());
        session.begin_dialing(Utc::now(), now).unwrap();
        let event = TerminationEvent::for_call("C1");
        assert!(!session.matches(&event, MatchPolicy::CallIdThenSubject));
        let mut event = event;
        event.subject_id = Some("LEAD-1".into());
        assert!(session.matches(&event, MatchPolicy::CallIdThenSubject));
    }

    #[test]
    fn strict_policies() {
        let session = in_call("LEAD-1", "C1");
        assert!(!session.matches(&TerminationEvent::for_subject("LEAD-1"), MatchPolicy::CallIdOnly));
        assert!(!session.matches(&TerminationEvent::for_call("C1"), MatchPolicy::SubjectOnly));
        assert!(session.matches(&TerminationEvent::for_subject("LEAD-1"), MatchPolicy::SubjectOnly));
    }

    #[test]
    fn blank_identifiers_never_match() {
        let session = in_call("LEAD-1", "C1");
        let mut event = TerminationEvent::for_call("  ");
        event.subject_id = Some("".into());
        assert!(!session.matches(&event, MatchPolicy::CallIdThenSubject));
    }

    proptest! {
        #[test]
        fn foreign_identifiers_never_match(call in "[A-Z0-9]{1,8}", subject in "[A-Z0-9-]{1,12}") {
            prop_assume!(call != "C1" && subject != "LEAD-1");
            let session = in_call("LEAD-1", "C1");
            let mut event = TerminationEvent::for_call(call);
            event.subject_id = Some(subject.into());
            for policy in [MatchPolicy::CallIdThenSubject, MatchPolicy::CallIdOnly, MatchPolicy::SubjectOnly] {
                prop_assert!(!session.matches(&event, policy));
            }
        }
    }
}
