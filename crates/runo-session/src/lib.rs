// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Call-session state machine for the Runo workspace.
//!
//! The [`CallController`] is the central coordinator that:
//! - Places dial requests through the injected [`DialAdapter`](runo_core::DialAdapter)
//! - Tracks elapsed time and flags calls that never report termination
//! - Matches termination broadcasts against the active session
//! - Validates dispositions against the [`DispositionRules`] and submits them

pub mod bus;
pub mod controller;
pub mod profile;
pub mod rules;
pub mod session;
pub mod timer;
pub mod watchdog;

pub use bus::{TerminationBus, TerminationSubscription};
pub use controller::{
    CallController, Collaborators, FeedbackReceipt, SessionSettings, SessionUpdate,
};
pub use profile::{CallProfile, FeedbackRequirements};
pub use rules::{DispositionRule, DispositionRules, StageRule};
pub use session::{CallSession, SessionSnapshot};
pub use timer::{ElapsedTimer, format_elapsed};
pub use watchdog::{DEFAULT_NO_RESPONSE_TIMEOUT, Watchdog};
