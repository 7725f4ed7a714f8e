// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end controller testing.
//!
//! `TestHarness` assembles a [`CallController`] wired to mock collaborators
//! and a fresh [`TerminationBus`], and provides helpers to drive it.

use std::sync::Arc;
use std::time::Duration;

use runo_core::TerminationEvent;
use runo_session::{
    CallController, CallProfile, Collaborators, DispositionRules, SessionSettings,
    SessionUpdate, TerminationBus,
};

use crate::mock_dialer::{DialOutcome, MockDialer};
use crate::mock_feedback::MockFeedback;
use crate::mock_notifier::RecordingNotifier;

/// Upper bound on how long [`TestHarness::next_update`] waits, in (paused) test time.
pub const SETTLE_TIMEOUT: Duration = Duration::from_secs(120);

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    profile: CallProfile,
    settings: SessionSettings,
    rules: DispositionRules,
    outcomes: Vec<DialOutcome>,
    gated: bool,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            profile: CallProfile::webinar_attendee(),
            settings: SessionSettings::default(),
            rules: DispositionRules::builtin(),
            outcomes: Vec::new(),
            gated: false,
        }
    }

    pub fn with_profile(mut self, profile: CallProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_rules(mut self, rules: DispositionRules) -> Self {
        self.rules = rules;
        self
    }

    /// Script dial results in the order they will be returned.
    pub fn with_dial_outcomes(mut self, outcomes: Vec<DialOutcome>) -> Self {
        self.outcomes = outcomes;
        self
    }

    /// Hold every dial until [`MockDialer::release`] is called.
    pub fn with_gated_dialer(mut self) -> Self {
        self.gated = true;
        self
    }

    pub fn build(self) -> TestHarness {
        let mut dialer = MockDialer::with_outcomes(self.outcomes);
        if self.gated {
            dialer = dialer.gated();
        }
        let dialer = Arc::new(dialer);
        let feedback = Arc::new(MockFeedback::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let bus = TerminationBus::new();

        let collaborators = Collaborators {
            dialer: dialer.clone(),
            feedback: feedback.clone(),
            notifier: notifier.clone(),
        };
        let controller = CallController::new(
            self.profile,
            self.settings,
            self.rules,
            collaborators,
            bus.subscribe(),
        );

        TestHarness {
            controller,
            bus,
            dialer,
            feedback,
            notifier,
        }
    }
}

/// A controller plus the mocks behind it.
pub struct TestHarness {
    pub controller: CallController,
    pub bus: TerminationBus,
    pub dialer: Arc<MockDialer>,
    pub feedback: Arc<MockFeedback>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Publishes a termination event on the shared bus.
    pub fn broadcast(&self, event: TerminationEvent) -> usize {
        self.bus.publish(event)
    }

    /// Pumps the controller until something other than a timer tick happens.
    /// Returns `None` if nothing does within [`SETTLE_TIMEOUT`].
    pub async fn next_update(&mut self) -> Option<SessionUpdate> {
        let deadline = tokio::time::Instant::now() + SETTLE_TIMEOUT;
        loop {
            match tokio::time::timeout_at(deadline, self.controller.pump()).await {
                Ok(SessionUpdate::Tick(_)) => continue,
                Ok(update) => return Some(update),
                Err(_) => return None,
            }
        }
    }

    /// Starts a call for `subject` and waits for the dial result.
    pub async fn connect(&mut self, subject: &str) -> Option<SessionUpdate> {
        self.controller.start(subject).ok()?;
        self.next_update().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runo_core::CallStatus;

    #[tokio::test(start_paused = true)]
    async fn harness_connects_with_scripted_call_id() {
        let mut harness = TestHarness::builder()
            .with_dial_outcomes(vec![DialOutcome::connect("C9")])
            .build();

        let update = harness.connect("LEAD-9").await;
        assert_eq!(update, Some(SessionUpdate::Connected("C9".into())));
        assert_eq!(harness.controller.status(), CallStatus::InCall);
        assert_eq!(harness.dialer.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn next_update_times_out_when_idle() {
        let mut harness = TestHarness::builder().build();
        assert_eq!(harness.next_update().await, None);
    }

    #[tokio::test]
    async fn bus_has_controller_subscribed() {
        let harness = TestHarness::builder().build();
        assert_eq!(harness.bus.subscriber_count(), 1);
    }
}
