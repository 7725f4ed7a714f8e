// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock dial adapter for deterministic testing.
//!
//! `MockDialer` implements `DialAdapter` with pre-configured outcomes,
//! enabling fast, CI-runnable tests without a telephony backend.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Semaphore};

use runo_core::traits::adapter::Adapter;
use runo_core::traits::dialer::DialAdapter;
use runo_core::types::{AdapterType, CallContextKind, CallId, DialResponse, SubjectId};
use runo_core::RemoteError;

/// One scripted dial result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialOutcome {
    Connect {
        call_id: String,
        display_name: Option<String>,
    },
    /// Failure with the given payload message, or an opaque failure when `None`.
    Fail(Option<String>),
}

impl DialOutcome {
    pub fn connect(call_id: impl Into<String>) -> Self {
        DialOutcome::Connect {
            call_id: call_id.into(),
            display_name: None,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        DialOutcome::Fail(Some(message.into()))
    }
}

/// A mock dialer that returns scripted outcomes.
///
/// Outcomes are popped from a FIFO queue. When the queue is empty the call
/// connects with a generated `CALL-<n>` id.
pub struct MockDialer {
    outcomes: Arc<Mutex<VecDeque<DialOutcome>>>,
    calls: Arc<Mutex<Vec<(CallContextKind, SubjectId)>>>,
    gate: Option<Arc<Semaphore>>,
    counter: AtomicUsize,
}

impl MockDialer {
    pub fn new() -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            gate: None,
            counter: AtomicUsize::new(0),
        }
    }

    pub fn with_outcomes(outcomes: Vec<DialOutcome>) -> Self {
        Self {
            outcomes: Arc::new(Mutex::new(VecDeque::from(outcomes))),
            ..Self::new()
        }
    }

    /// Holds every dial until [`release`](Self::release) is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Lets one held dial complete.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub async fn push_outcome(&self, outcome: DialOutcome) {
        self.outcomes.lock().await.push_back(outcome);
    }

    /// Every dial request received, in order.
    pub async fn calls(&self) -> Vec<(CallContextKind, SubjectId)> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn next_outcome(&self) -> DialOutcome {
        match self.outcomes.lock().await.pop_front() {
            Some(outcome) => outcome,
            None => {
                let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                DialOutcome::connect(format!("CALL-{n}"))
            }
        }
    }
}

impl Default for MockDialer {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for MockDialer {
    fn name(&self) -> &str {
        "mock-dialer"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Dialer
    }
}

#[async_trait]
impl DialAdapter for MockDialer {
    async fn dial(
        &self,
        context: CallContextKind,
        subject_id: &SubjectId,
    ) -> Result<DialResponse, RemoteError> {
        self.calls.lock().await.push((context, subject_id.clone()));

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| RemoteError::new("dial gate closed").with_source(e))?
                .forget();
        }

        match self.next_outcome().await {
            DialOutcome::Connect {
                call_id,
                display_name,
            } => Ok(DialResponse {
                call_id: CallId::from(call_id),
                display_name,
            }),
            DialOutcome::Fail(Some(message)) => Err(RemoteError::new(message)),
            DialOutcome::Fail(None) => Err(RemoteError::opaque()),
        }
    }
}
