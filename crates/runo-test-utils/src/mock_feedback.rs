// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock feedback adapter capturing submitted payloads.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use runo_core::traits::adapter::Adapter;
use runo_core::traits::feedback::FeedbackAdapter;
use runo_core::types::{AdapterType, FeedbackPayload};
use runo_core::RemoteError;

/// A mock feedback service.
///
/// Scripted failures are consumed first; once the queue is empty every
/// submission succeeds. Every payload is captured, including failed ones.
pub struct MockFeedback {
    failures: Arc<Mutex<VecDeque<Option<String>>>>,
    submitted: Arc<Mutex<Vec<FeedbackPayload>>>,
}

impl MockFeedback {
    pub fn new() -> Self {
        Self {
            failures: Arc::new(Mutex::new(VecDeque::new())),
            submitted: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Makes the next submission fail with `message` as the payload text.
    pub async fn fail_next(&self, message: impl Into<String>) {
        self.failures.lock().await.push_back(Some(message.into()));
    }

    /// Makes the next submission fail without a readable payload.
    pub async fn fail_next_opaque(&self) {
        self.failures.lock().await.push_back(None);
    }

    pub async fn submitted(&self) -> Vec<FeedbackPayload> {
        self.submitted.lock().await.clone()
    }

    pub async fn submitted_count(&self) -> usize {
        self.submitted.lock().await.len()
    }
}

impl Default for MockFeedback {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for MockFeedback {
    fn name(&self) -> &str {
        "mock-feedback"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Feedback
    }
}

#[async_trait]
impl FeedbackAdapter for MockFeedback {
    async fn submit(&self, payload: FeedbackPayload) -> Result<(), RemoteError> {
        self.submitted.lock().await.push(payload);
        match self.failures.lock().await.pop_front() {
            None => Ok(()),
            Some(Some(message)) => Err(RemoteError::new(message)),
            Some(None) => Err(RemoteError::opaque()),
        }
    }
}
