// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `runo simulate`: one call session against in-process loopback collaborators.
//!
//! The loopback dialer hands out a fresh call id and, unless silent,
//! publishes the matching termination event on the bus after the requested
//! duration. Feedback is accepted and logged; notifications go to stderr.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use runo_config::RunoConfig;
use runo_core::{
    Adapter, AdapterType, CallContextKind, CallId, CallStatus, DialAdapter, DialResponse,
    Disposition, FeedbackAdapter, FeedbackPayload, Notification, NotificationSink, RemoteError,
    RunoError, Severity, SubjectId, TerminationEvent,
};
use runo_session::{
    CallController, CallProfile, Collaborators, DispositionRules, FeedbackReceipt,
    SessionSettings, SessionUpdate, TerminationBus,
};
use tracing::info;

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    pub subject: String,
    pub profile: CallProfile,
    pub fail_dial: bool,
    pub duration_secs: u64,
    pub silent: bool,
}

/// How the simulated session finished.
#[derive(Debug)]
pub struct SimulationReport {
    pub final_status: CallStatus,
    pub elapsed: String,
    pub receipt: FeedbackReceipt,
}

struct LoopbackDialer {
    bus: TerminationBus,
    fail: bool,
    duration: Duration,
    silent: bool,
}

impl Adapter for LoopbackDialer {
    fn name(&self) -> &str {
        "loopback-dialer"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Dialer
    }
}

#[async_trait]
impl DialAdapter for LoopbackDialer {
    async fn dial(
        &self,
        context: CallContextKind,
        subject_id: &SubjectId,
    ) -> Result<DialResponse, RemoteError> {
        if self.fail {
            return Err(RemoteError::from_payload(&serde_json::json!({
                "body": { "message": format!("Dialer rejected the call to {subject_id}") }
            })));
        }

        let call_id = CallId::from(format!("LOOP-{}", uuid::Uuid::new_v4().simple()));
        info!(%context, subject_id = %subject_id, call_id = %call_id, "loopback dial placed");

        if !self.silent {
            let bus = self.bus.clone();
            let event = TerminationEvent::for_call(call_id.clone())
                .with_duration(self.duration.as_secs());
            let duration = self.duration;
            tokio::spawn(async move {
                tokio::time::sleep(duration).await;
                bus.publish(event);
            });
        }

        Ok(DialResponse {
            call_id,
            display_name: Some(subject_id.to_string()),
        })
    }
}

struct LoopbackFeedback;

impl Adapter for LoopbackFeedback {
    fn name(&self) -> &str {
        "loopback-feedback"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Feedback
    }
}

#[async_trait]
impl FeedbackAdapter for LoopbackFeedback {
    async fn submit(&self, payload: FeedbackPayload) -> Result<(), RemoteError> {
        let body = serde_json::to_string(&payload)
            .map_err(|e| RemoteError::new("feedback payload is not serializable").with_source(e))?;
        info!(payload = %body, "loopback feedback accepted");
        Ok(())
    }
}

struct ConsoleNotifier {
    use_color: bool,
}

impl Adapter for ConsoleNotifier {
    fn name(&self) -> &str {
        "console-notifier"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Notifier
    }
}

impl NotificationSink for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let tag = format!("[{}]", notification.severity);
        let tag = if self.use_color {
            use colored::Colorize;
            match notification.severity {
                Severity::Success => tag.green().to_string(),
                Severity::Info => tag.cyan().to_string(),
                Severity::Warning => tag.yellow().to_string(),
                Severity::Error => tag.red().to_string(),
            }
        } else {
            tag
        };
        eprintln!("{tag} {}: {}", notification.title, notification.message);
    }
}

/// Run one session to completion and submit a canned disposition.
pub async fn run_simulate(
    config: &RunoConfig,
    options: SimulateOptions,
    use_color: bool,
) -> Result<SimulationReport, RunoError> {
    let bus = TerminationBus::new();
    let collaborators = Collaborators {
        dialer: Arc::new(LoopbackDialer {
            bus: bus.clone(),
            fail: options.fail_dial,
            duration: Duration::from_secs(options.duration_secs),
            silent: options.silent,
        }),
        feedback: Arc::new(LoopbackFeedback),
        notifier: Arc::new(ConsoleNotifier { use_color }),
    };
    let mut controller = CallController::new(
        options.profile,
        SessionSettings::from_config(config),
        DispositionRules::from_config(&config.follow_up),
        collaborators,
        bus.subscribe(),
    );

    controller.start(options.subject.as_str())?;
    print_snapshot(&controller);

    loop {
        let update = controller.pump().await;
        if update != SessionUpdate::Stale {
            print_snapshot(&controller);
        }
        match update {
            SessionUpdate::Connected(_) | SessionUpdate::Tick(_) | SessionUpdate::Stale => {}
            SessionUpdate::NoResponse => {
                controller.end_manually()?;
                print_snapshot(&controller);
                break;
            }
            SessionUpdate::Ended | SessionUpdate::DialFailed(_) => break,
            SessionUpdate::Disconnected => {
                return Err(RunoError::Internal("termination bus closed".to_string()));
            }
        }
    }

    let final_status = controller.status();
    let elapsed = controller.elapsed_label();
    let draft = canned_disposition(&controller, final_status);
    let receipt = controller.submit_feedback(draft).await?;
    println!(
        "feedback submitted: {} / {} (follow-up {})",
        receipt.disposition.l1,
        receipt.disposition.l2,
        receipt
            .disposition
            .next_follow_up_at
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "none".to_string())
    );

    Ok(SimulationReport {
        final_status,
        elapsed,
        receipt,
    })
}

fn canned_disposition(controller: &CallController, status: CallStatus) -> Disposition {
    let mut draft = controller.draft();
    if status == CallStatus::Failed {
        draft.l1 = "Not-Connected".to_string();
        draft.l2 = "Not Reachable".to_string();
    } else {
        draft.l1 = "Connected".to_string();
        draft.l2 = "Call Back Later".to_string();
        draft.comment = "Simulated call".to_string();
    }
    let profile = controller.profile();
    if profile.requires_stage {
        draft.stage = Some("Warm".to_string());
    }
    if profile.requires_level {
        draft.level = Some("Beginner".to_string());
    }
    draft
}

fn print_snapshot(controller: &CallController) {
    match serde_json::to_string(&controller.snapshot()) {
        Ok(line) => println!("{line}"),
        Err(e) => eprintln!("runo: failed to render snapshot: {e}"),
    }
}
