// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call controller: one session at a time, driven from a single task.
//!
//! Direct calls (`start`, `end_manually`, `cancel`, `submit_feedback`) apply
//! immediately. Everything asynchronous (dial results, watchdog deadlines,
//! termination broadcasts, timer ticks) is applied by [`CallController::pump`],
//! one stimulus per call. Dial results and deadlines are tagged with the
//! [`SessionId`] they were issued for and dropped if the session moved on.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use runo_config::{MatchPolicy, RunoConfig};
use runo_core::{
    CallId, CallStatus, DialAdapter, DialResponse, Disposition, FeedbackAdapter,
    FeedbackPayload, NotificationSink, Notification, RemoteError, RunoError, SessionId, Severity,
    SubjectId, TerminationEvent, ValidationError,
};
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::bus::TerminationSubscription;
use crate::profile::CallProfile;
use crate::rules::DispositionRules;
use crate::session::{CallSession, SessionSnapshot};
use crate::watchdog::{DEFAULT_NO_RESPONSE_TIMEOUT, Watchdog};

/// Timing and matching knobs for a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub watchdog_timeout: Duration,
    pub tick_interval: Duration,
    pub match_policy: MatchPolicy,
    pub notifications_enabled: bool,
}

impl SessionSettings {
    pub fn from_config(config: &RunoConfig) -> Self {
        Self {
            watchdog_timeout: Duration::from_millis(config.session.watchdog_timeout_ms),
            tick_interval: Duration::from_millis(config.session.tick_interval_ms),
            match_policy: config.session.match_policy,
            notifications_enabled: config.notifications.enabled,
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            watchdog_timeout: DEFAULT_NO_RESPONSE_TIMEOUT,
            tick_interval: Duration::from_millis(500),
            match_policy: MatchPolicy::default(),
            notifications_enabled: true,
        }
    }
}

/// Remote collaborators injected at construction.
#[derive(Clone)]
pub struct Collaborators {
    pub dialer: Arc<dyn DialAdapter>,
    pub feedback: Arc<dyn FeedbackAdapter>,
    pub notifier: Arc<dyn NotificationSink>,
}

/// What a single [`CallController::pump`] step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionUpdate {
    Connected(CallId),
    DialFailed(String),
    NoResponse,
    Ended,
    /// Timer tick with the current `mm:ss` label.
    Tick(String),
    /// The stimulus did not belong to the current session and was dropped.
    Stale,
    /// The termination bus closed; no further broadcasts will arrive.
    Disconnected,
}

/// Result of a successful feedback submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackReceipt {
    pub session_id: SessionId,
    pub subject_id: SubjectId,
    pub call_id: Option<CallId>,
    pub disposition: Disposition,
}

enum Completion {
    Dial {
        session_id: SessionId,
        result: Result<DialResponse, RemoteError>,
    },
    Watchdog {
        session_id: SessionId,
    },
}

/// Parameterized call-session state machine shared by every calling context.
pub struct CallController {
    profile: CallProfile,
    settings: SessionSettings,
    rules: DispositionRules,
    collaborators: Collaborators,
    session: Option<CallSession>,
    watchdog: Watchdog,
    ticker: Option<Interval>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    termination: Option<TerminationSubscription>,
    snapshots: watch::Sender<SessionSnapshot>,
}

impl CallController {
    pub fn new(
        profile: CallProfile,
        settings: SessionSettings,
        rules: DispositionRules,
        collaborators: Collaborators,
        termination: TerminationSubscription,
    ) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots, _) = watch::channel(SessionSnapshot::idle());
        debug!(
            context = %profile.kind,
            dialer = collaborators.dialer.name(),
            feedback = collaborators.feedback.name(),
            notifier = collaborators.notifier.name(),
            "call controller ready"
        );
        Self {
            profile,
            settings,
            rules,
            collaborators,
            session: None,
            watchdog: Watchdog::new(),
            ticker: None,
            completions_tx,
            completions_rx,
            termination: Some(termination),
            snapshots,
        }
    }

    pub fn profile(&self) -> &CallProfile {
        &self.profile
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn rules(&self) -> &DispositionRules {
        &self.rules
    }

    pub fn session(&self) -> Option<&CallSession> {
        self.session.as_ref()
    }

    /// `Idle` when there is no session.
    pub fn status(&self) -> CallStatus {
        self.session
            .as_ref()
            .map(CallSession::status)
            .unwrap_or(CallStatus::Idle)
    }

    pub fn elapsed_label(&self) -> String {
        self.session
            .as_ref()
            .map(|s| s.elapsed_label(Instant::now()))
            .unwrap_or_else(|| SessionSnapshot::idle().elapsed)
    }

    pub fn is_timer_running(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(CallSession::is_timer_running)
    }

    pub fn is_feedback_open(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(CallSession::is_feedback_open)
    }

    pub fn watchdog_armed(&self) -> bool {
        self.watchdog.is_armed()
    }

    pub fn retained_disposition(&self) -> Option<&Disposition> {
        self.session.as_ref().and_then(CallSession::disposition)
    }

    /// Form state to show: the retained disposition after a failed
    /// submission, else an empty one with the profile's notify default.
    pub fn draft(&self) -> Disposition {
        self.retained_disposition()
            .cloned()
            .unwrap_or_else(|| Disposition::default().with_notify(self.profile.notify_by_default))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session
            .as_ref()
            .map(|s| s.snapshot(Instant::now()))
            .unwrap_or_default()
    }

    /// Receiver updated after every transition and timer tick.
    pub fn subscribe_snapshots(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    /// Starts dialing `subject_id`. The dial result is applied by a later [`pump`](Self::pump).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&mut self, subject_id: impl Into<SubjectId>) -> Result<SessionId, RunoError> {
        let subject_id = subject_id.into();
        if subject_id.is_blank() {
            return Err(ValidationError::EmptySubject.into());
        }
        if let Some(current) = &self.session {
            let status = current.status();
            if status.is_active() && *current.subject_id() == subject_id {
                debug!(subject_id = %subject_id, %status, "duplicate start rejected");
                return Err(ValidationError::AlreadyActive { subject_id, status }.into());
            }
            return Err(ValidationError::SessionBusy {
                subject_id: current.subject_id().clone(),
                status,
            }
            .into());
        }

        let now = Instant::now();
        let mut session = CallSession::new(subject_id.clone());
        session.begin_dialing(Utc::now(), now)?;
        let session_id = session.id();

        self.watchdog.cancel();
        self.ticker = Some(ticker(self.settings.tick_interval, now));
        self.session = Some(session);

        info!(
            session_id = %session_id,
            subject_id = %subject_id,
            context = %self.profile.kind,
            status = %CallStatus::Dialing,
            "dialing"
        );
        self.spawn_dial(session_id, subject_id);
        self.publish_snapshot();
        Ok(session_id)
    }

    /// Waits for the next dial result, deadline, termination broadcast or
    /// timer tick, and applies it.
    pub async fn pump(&mut self) -> SessionUpdate {
        let ticking = self.is_timer_running() && self.ticker.is_some();
        tokio::select! {
            Some(completion) = self.completions_rx.recv() => self.apply_completion(completion),
            event = next_termination(&mut self.termination) => match event {
                Some(event) => self.on_termination_signal(&event),
                None => {
                    warn!("termination bus closed");
                    self.termination = None;
                    SessionUpdate::Disconnected
                }
            },
            _ = next_tick(&mut self.ticker), if ticking => self.on_tick(),
        }
    }

    /// Applies a termination broadcast. Events for other calls, duplicates,
    /// and events arriving while still dialing are ignored.
    pub fn on_termination_signal(&mut self, event: &TerminationEvent) -> SessionUpdate {
        let policy = self.settings.match_policy;
        let Some(session) = self.session.as_mut() else {
            debug!(?event, "termination event with no session ignored");
            return SessionUpdate::Stale;
        };
        if !session.matches(event, policy) {
            debug!(
                session_id = %session.id(),
                event_call_id = ?event.call_id,
                event_subject_id = ?event.subject_id,
                "termination event for another call ignored"
            );
            return SessionUpdate::Stale;
        }
        let reported = event.duration_seconds.map(Duration::from_secs);
        if !session.terminate(reported, Instant::now()) {
            debug!(
                session_id = %session.id(),
                status = %session.status(),
                "termination event ignored in current state"
            );
            return SessionUpdate::Stale;
        }

        info!(
            session_id = %session.id(),
            subject_id = %session.subject_id(),
            call_id = ?session.call_id(),
            status = %session.status(),
            "call ended by dialer"
        );
        self.watchdog.cancel();
        self.notify("Call ended", "Call ended. Please record feedback.", Severity::Info);
        self.publish_snapshot();
        SessionUpdate::Ended
    }

    /// Flags a live call with no termination signal. Only applies while `InCall`;
    /// feedback stays closed and the timer keeps running.
    pub fn watchdog_fire(&mut self) -> SessionUpdate {
        let Some(session) = self.session.as_mut() else {
            return SessionUpdate::Stale;
        };
        if !session.mark_no_response() {
            debug!(
                session_id = %session.id(),
                status = %session.status(),
                "no-response deadline ignored in current state"
            );
            return SessionUpdate::Stale;
        }
        warn!(
            session_id = %session.id(),
            subject_id = %session.subject_id(),
            call_id = ?session.call_id(),
            status = %CallStatus::NoResponse,
            "no termination signal before deadline"
        );
        self.notify(
            "No response",
            "No response from the dialer. End the call manually if it is over.",
            Severity::Warning,
        );
        self.publish_snapshot();
        SessionUpdate::NoResponse
    }

    /// Operator hang-up from `InCall` or `NoResponse`.
    pub fn end_manually(&mut self) -> Result<(), RunoError> {
        let session = self
            .session
            .as_mut()
            .ok_or(ValidationError::NoActiveSession { operation: "end" })?;
        session.end(Instant::now())?;
        info!(
            session_id = %session.id(),
            subject_id = %session.subject_id(),
            call_id = ?session.call_id(),
            status = %session.status(),
            "call ended by operator"
        );
        self.watchdog.cancel();
        self.notify("Call ended", "Call ended. Please record feedback.", Severity::Info);
        self.publish_snapshot();
        Ok(())
    }

    /// Discards a session that never placed a call (`Idle`, `Dialing`, `Failed`).
    /// With no session this is a no-op.
    pub fn cancel(&mut self) -> Result<(), RunoError> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        let status = session.status();
        if !matches!(
            status,
            CallStatus::Idle | CallStatus::Dialing | CallStatus::Failed
        ) {
            return Err(ValidationError::InvalidTransition {
                operation: "cancel",
                status,
            }
            .into());
        }
        info!(session_id = %session.id(), subject_id = %session.subject_id(), %status, "session cancelled");
        self.discard();
        Ok(())
    }

    /// Validates and submits the disposition. On success the session is
    /// discarded; on remote failure it is kept with the disposition retained.
    pub async fn submit_feedback(
        &mut self,
        draft: Disposition,
    ) -> Result<FeedbackReceipt, RunoError> {
        let requirements = self.profile.requirements();
        let context = self.profile.kind;
        let session = self
            .session
            .as_mut()
            .ok_or(ValidationError::NoActiveSession {
                operation: "submit feedback",
            })?;
        if !session.is_feedback_open() {
            return Err(ValidationError::FeedbackNotOpen.into());
        }

        let disposition = match self.rules.validate(&draft, requirements, Utc::now()) {
            Ok(disposition) => disposition,
            Err(err) => {
                debug!(session_id = %session.id(), error = %err, "feedback rejected");
                return Err(err.into());
            }
        };
        session.retain(disposition.clone());

        let receipt = FeedbackReceipt {
            session_id: session.id(),
            subject_id: session.subject_id().clone(),
            call_id: session.call_id().cloned(),
            disposition: disposition.clone(),
        };
        let payload = FeedbackPayload {
            context,
            subject_id: receipt.subject_id.clone(),
            call_id: receipt.call_id.clone(),
            feedback: disposition.comment_text().to_string(),
            next_follow_up_at: disposition.next_follow_up_at,
            l1: disposition.l1,
            l2: disposition.l2,
            stage: disposition.stage,
            level: disposition.level,
            notify: disposition.notify,
        };

        let feedback = Arc::clone(&self.collaborators.feedback);
        match feedback.submit(payload).await {
            Ok(()) => {
                info!(
                    session_id = %receipt.session_id,
                    subject_id = %receipt.subject_id,
                    call_id = ?receipt.call_id,
                    "feedback submitted"
                );
                self.discard();
                self.notify("Feedback saved", "Feedback submitted.", Severity::Success);
                Ok(receipt)
            }
            Err(err) => {
                let err = RunoError::submission(err);
                let message = err.user_message();
                warn!(session_id = %receipt.session_id, error = %message, "feedback submission failed");
                if let Some(session) = self.session.as_mut() {
                    session.record_error(message.clone());
                }
                self.notify("Feedback not saved", message, Severity::Error);
                self.publish_snapshot();
                Err(err)
            }
        }
    }

    fn spawn_dial(&self, session_id: SessionId, subject_id: SubjectId) {
        let dialer = Arc::clone(&self.collaborators.dialer);
        let completions = self.completions_tx.clone();
        let context = self.profile.kind;
        tokio::spawn(async move {
            let result = dialer.dial(context, &subject_id).await;
            if completions
                .send(Completion::Dial { session_id, result })
                .is_err()
            {
                debug!(session_id = %session_id, "controller dropped before dial completed");
            }
        });
    }

    fn arm_watchdog(&mut self, session_id: SessionId) {
        let completions = self.completions_tx.clone();
        self.watchdog
            .arm(self.settings.watchdog_timeout, move || {
                let _ = completions.send(Completion::Watchdog { session_id });
            });
    }

    fn apply_completion(&mut self, completion: Completion) -> SessionUpdate {
        match completion {
            Completion::Dial { session_id, result } => self.apply_dial(session_id, result),
            Completion::Watchdog { session_id } => {
                if !self.is_current(session_id) {
                    debug!(session_id = %session_id, "stale no-response deadline ignored");
                    return SessionUpdate::Stale;
                }
                self.watchdog_fire()
            }
        }
    }

    fn apply_dial(
        &mut self,
        session_id: SessionId,
        result: Result<DialResponse, RemoteError>,
    ) -> SessionUpdate {
        let current = self
            .session
            .as_mut()
            .filter(|s| s.id() == session_id && s.status() == CallStatus::Dialing);
        let Some(session) = current else {
            debug!(session_id = %session_id, ok = result.is_ok(), "stale dial result ignored");
            return SessionUpdate::Stale;
        };

        match result {
            Ok(response) => {
                let call_id = response.call_id.clone();
                if let Err(err) = session.connect(response) {
                    debug!(session_id = %session_id, error = %err, "dial result rejected");
                    return SessionUpdate::Stale;
                }
                info!(
                    session_id = %session_id,
                    subject_id = %session.subject_id(),
                    call_id = %call_id,
                    status = %CallStatus::InCall,
                    "call connected"
                );
                let title = session
                    .snapshot(Instant::now())
                    .display_name
                    .map(|name| format!("Calling {name}"))
                    .unwrap_or_else(|| "Call started".to_string());
                self.arm_watchdog(session_id);
                self.notify(title, "Call in progress.", Severity::Success);
                self.publish_snapshot();
                SessionUpdate::Connected(call_id)
            }
            Err(err) => {
                let message = RunoError::dial(err).user_message();
                if let Err(err) = session.fail_dial(message.clone(), Instant::now()) {
                    debug!(session_id = %session_id, error = %err, "dial failure rejected");
                    return SessionUpdate::Stale;
                }
                warn!(
                    session_id = %session_id,
                    subject_id = %session.subject_id(),
                    status = %CallStatus::Failed,
                    error = %message,
                    "dial failed"
                );
                self.notify("Call failed", message.clone(), Severity::Error);
                self.publish_snapshot();
                SessionUpdate::DialFailed(message)
            }
        }
    }

    fn on_tick(&mut self) -> SessionUpdate {
        let Some(session) = &self.session else {
            return SessionUpdate::Stale;
        };
        let label = session.elapsed_label(Instant::now());
        self.publish_snapshot();
        SessionUpdate::Tick(label)
    }

    fn is_current(&self, session_id: SessionId) -> bool {
        self.session.as_ref().is_some_and(|s| s.id() == session_id)
    }

    fn discard(&mut self) {
        self.watchdog.cancel();
        self.ticker = None;
        self.session = None;
        self.publish_snapshot();
    }

    fn notify(&self, title: impl Into<String>, message: impl Into<String>, severity: Severity) {
        if self.settings.notifications_enabled {
            self.collaborators
                .notifier
                .notify(Notification::new(title, message, severity));
        }
    }

    fn publish_snapshot(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

fn ticker(period: Duration, now: Instant) -> Interval {
    let mut interval = tokio::time::interval_at(now + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn next_termination(
    subscription: &mut Option<TerminationSubscription>,
) -> Option<TerminationEvent> {
    match subscription {
        Some(subscription) => subscription.recv().await,
        None => std::future::pending().await,
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}
