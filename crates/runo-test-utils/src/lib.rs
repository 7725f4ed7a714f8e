// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Runo integration tests.
//!
//! Provides mock collaborators and test harness infrastructure for fast,
//! deterministic, CI-runnable tests without a dialer or feedback backend.
//!
//! # Components
//!
//! - [`MockDialer`] - Dial adapter with scripted outcomes and an optional gate
//! - [`MockFeedback`] - Feedback adapter capturing payloads, with scripted failures
//! - [`RecordingNotifier`] - Notification sink recording every notification
//! - [`TestHarness`] - Controller wired to the mocks and a termination bus

pub mod harness;
pub mod mock_dialer;
pub mod mock_feedback;
pub mod mock_notifier;

pub use harness::TestHarness;
pub use mock_dialer::{DialOutcome, MockDialer};
pub use mock_feedback::MockFeedback;
pub use mock_notifier::RecordingNotifier;
