// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dial adapter trait for the remote dialing service.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::traits::adapter::Adapter;
use crate::types::{CallContextKind, DialResponse, SubjectId};

/// Places outbound calls through the remote dialing service.
///
/// The returned future resolves once the dialer has accepted the call and
/// assigned it an id; call termination arrives separately on the
/// termination broadcast.
#[async_trait]
pub trait DialAdapter: Adapter {
    /// Requests an outbound call to `subject_id` within the given context.
    async fn dial(
        &self,
        context: CallContextKind,
        subject_id: &SubjectId,
    ) -> Result<DialResponse, RemoteError>;
}
