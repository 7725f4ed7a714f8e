// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink for user-visible status messages.

use crate::traits::adapter::Adapter;
use crate::types::Notification;

/// Fire-and-forget sink for toast-style notifications.
///
/// Implementations must not block and cannot fail the calling operation.
pub trait NotificationSink: Adapter {
    fn notify(&self, notification: Notification);
}
