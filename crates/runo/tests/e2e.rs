// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the complete call pipeline.
//!
//! Each test builds an isolated TestHarness from a TOML configuration, with
//! mock collaborators and a private termination bus. Tests are independent
//! and order-insensitive.

use chrono::{TimeDelta, Utc};
use runo_config::load_and_validate_str;
use runo_core::{CallContextKind, CallStatus, Disposition, RunoError, TerminationEvent, ValidationError};
use runo_session::{CallProfile, DispositionRules, SessionSettings, SessionUpdate};
use runo_test_utils::{DialOutcome, TestHarness};

const CONFIG: &str = r#"
[session]
watchdog_timeout_ms = 10000
tick_interval_ms = 1000

[follow_up]
default_hours = 12

[[follow_up.stages]]
code = "Hot"
max_days = 2

[[follow_up.stages]]
code = "Cold"
max_days = 20
auto_hours = 96
"#;

fn harness_from_config(profile: CallProfile, outcomes: Vec<DialOutcome>) -> TestHarness {
    let config = load_and_validate_str(CONFIG).expect("test config should be valid");
    TestHarness::builder()
        .with_profile(profile)
        .with_settings(SessionSettings::from_config(&config))
        .with_rules(DispositionRules::from_config(&config.follow_up))
        .with_dial_outcomes(outcomes)
        .build()
}

// ---- Lead call: dial, terminate, feedback ----

#[tokio::test(start_paused = true)]
async fn test_lead_call_full_lifecycle() {
    let mut harness = harness_from_config(CallProfile::lead(), vec![DialOutcome::connect("C1")]);

    assert_eq!(
        harness.connect("LEAD-1").await,
        Some(SessionUpdate::Connected("C1".into()))
    );
    harness.broadcast(TerminationEvent::for_call("C1").with_duration(42));
    assert_eq!(harness.next_update().await, Some(SessionUpdate::Ended));
    assert_eq!(harness.controller.elapsed_label(), "00:42");

    let draft = Disposition::new("Connected", "Call Back Later")
        .with_comment("call after exams")
        .with_stage("Cold");
    let before = Utc::now();
    let receipt = harness.controller.submit_feedback(draft).await.unwrap();
    assert_eq!(receipt.subject_id.as_str(), "LEAD-1");

    let payload = &harness.feedback.submitted().await[0];
    assert_eq!(payload.context, CallContextKind::Lead);
    assert_eq!(payload.call_id.as_ref().map(|c| c.as_str()), Some("C1"));
    assert_eq!(payload.feedback, "call after exams");
    let follow_up = payload.next_follow_up_at.expect("auto follow-up");
    assert!(follow_up >= before + TimeDelta::hours(96));
    assert!(follow_up <= Utc::now() + TimeDelta::hours(96));

    assert_eq!(harness.controller.status(), CallStatus::Idle);
    assert_eq!(
        harness.dialer.calls().await,
        vec![(CallContextKind::Lead, "LEAD-1".into())]
    );
}

// ---- Configured follow-up defaults and caps ----

#[tokio::test(start_paused = true)]
async fn test_configured_default_follow_up_applies() {
    let mut harness =
        harness_from_config(CallProfile::webinar_attendee(), vec![DialOutcome::connect("C1")]);
    harness.connect("W-1").await;
    harness.controller.end_manually().unwrap();

    let before = Utc::now();
    let receipt = harness
        .controller
        .submit_feedback(Disposition::new("Not-Connected", "Busy"))
        .await
        .unwrap();
    let follow_up = receipt.disposition.next_follow_up_at.expect("auto follow-up");
    assert!(follow_up >= before + TimeDelta::hours(12));
    assert!(follow_up <= Utc::now() + TimeDelta::hours(12));
}

#[tokio::test(start_paused = true)]
async fn test_follow_up_beyond_stage_cap_is_rejected() {
    let mut harness = harness_from_config(CallProfile::lead(), vec![DialOutcome::connect("C1")]);
    harness.connect("LEAD-1").await;
    harness.controller.end_manually().unwrap();

    let draft = Disposition::new("Connected", "Interested")
        .with_comment("hot lead")
        .with_stage("Hot")
        .with_follow_up(Utc::now() + TimeDelta::days(5));
    let err = harness.controller.submit_feedback(draft).await.unwrap_err();
    assert!(err.user_message().contains("2 day"));
    match err {
        RunoError::Validation(ValidationError::FollowUpBeyondCap { stage, max_days }) => {
            assert_eq!(stage, "Hot");
            assert_eq!(max_days, 2);
        }
        other => panic!("expected FollowUpBeyondCap, got {other:?}"),
    }
    assert_eq!(harness.controller.status(), CallStatus::Ended);
    assert_eq!(harness.feedback.submitted_count().await, 0);
}

// ---- Configured watchdog deadline ----

#[tokio::test(start_paused = true)]
async fn test_configured_watchdog_deadline() {
    let mut harness = harness_from_config(CallProfile::lead(), vec![DialOutcome::connect("C1")]);
    harness.connect("LEAD-1").await;

    let started = tokio::time::Instant::now();
    assert_eq!(harness.next_update().await, Some(SessionUpdate::NoResponse));
    assert_eq!(started.elapsed(), std::time::Duration::from_secs(10));
    assert!(harness.controller.is_timer_running());
}

// ---- Retry after a failed dial ----

#[tokio::test(start_paused = true)]
async fn test_failed_dial_then_fresh_session() {
    let mut harness = harness_from_config(
        CallProfile::webinar_attendee(),
        vec![DialOutcome::fail("Agent offline"), DialOutcome::connect("C2")],
    );

    harness.controller.start("W-2").unwrap();
    assert_eq!(
        harness.next_update().await,
        Some(SessionUpdate::DialFailed("Agent offline".into()))
    );
    let first = harness.controller.session().map(|s| s.id());

    harness.controller.cancel().unwrap();
    assert_eq!(
        harness.connect("W-2").await,
        Some(SessionUpdate::Connected("C2".into()))
    );
    assert_ne!(harness.controller.session().map(|s| s.id()), first);
}

// ---- Termination matching across controllers ----

#[tokio::test(start_paused = true)]
async fn test_termination_only_reaches_matching_controller() {
    let mut lead = harness_from_config(CallProfile::lead(), vec![DialOutcome::connect("C1")]);
    let mut webinar =
        harness_from_config(CallProfile::webinar_attendee(), vec![DialOutcome::connect("C2")]);
    lead.connect("LEAD-1").await;
    webinar.connect("W-1").await;

    // Each harness owns its bus; deliver the same event to both.
    let event = TerminationEvent::for_call("C2");
    assert_eq!(lead.controller.on_termination_signal(&event), SessionUpdate::Stale);
    assert_eq!(webinar.controller.on_termination_signal(&event), SessionUpdate::Ended);

    assert_eq!(lead.controller.status(), CallStatus::InCall);
    assert_eq!(webinar.controller.status(), CallStatus::Ended);
}

// ---- Platform event shape ----

#[test]
fn test_platform_event_json_is_accepted() {
    let event: TerminationEvent =
        serde_json::from_str(r#"{"subjectId":"LEAD-1","callId":"C1","durationSeconds":42}"#)
            .unwrap();
    assert_eq!(event.call_id().map(|c| c.as_str()), Some("C1"));
    assert_eq!(event.duration_seconds, Some(42));
}
