// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collaborator traits injected into the call-session controller.
//!
//! Remote collaborators use `#[async_trait]` so they can be held as
//! `Arc<dyn …>` trait objects.

pub mod adapter;
pub mod dialer;
pub mod feedback;
pub mod notifier;

pub use adapter::Adapter;
pub use dialer::DialAdapter;
pub use feedback::FeedbackAdapter;
pub use notifier::NotificationSink;
