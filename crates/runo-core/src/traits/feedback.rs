// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Feedback adapter trait for recording call dispositions remotely.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::traits::adapter::Adapter;
use crate::types::FeedbackPayload;

/// Records a call disposition with the remote service.
#[async_trait]
pub trait FeedbackAdapter: Adapter {
    /// Submits the disposition. Never retried by the caller automatically.
    async fn submit(&self, payload: FeedbackPayload) -> Result<(), RemoteError>;
}
