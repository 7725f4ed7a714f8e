// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Runo call-session workspace.
//!
//! This crate provides the collaborator traits, error types, and common types
//! used by the call-session state machine. Dialer, feedback, and notification
//! integrations implement the traits defined here.

pub mod disposition;
pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use disposition::{Disposition, DispositionField};
pub use error::{RemoteError, RunoError, ValidationError};
pub use types::{
    AdapterType, CallContextKind, CallId, CallStatus, DialResponse, FeedbackPayload,
    Notification, SessionId, Severity, SubjectId, TerminationEvent,
};

pub use traits::{Adapter, DialAdapter, FeedbackAdapter, NotificationSink};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runo_error_has_all_variants() {
        let _validation = RunoError::Validation(ValidationError::EmptySubject);
        let _dial = RunoError::Dial {
            message: "test".into(),
            source: None,
        };
        let _submission = RunoError::Submission {
            message: "test".into(),
            source: None,
        };
        let _config = RunoError::Config("test".into());
        let _internal = RunoError::Internal("test".into());
    }

    #[test]
    fn adapter_type_round_trips() {
        use std::str::FromStr;

        for variant in [AdapterType::Dialer, AdapterType::Feedback, AdapterType::Notifier] {
            let parsed = AdapterType::from_str(&variant.to_string()).expect("should parse back");
            assert_eq!(variant, parsed);
        }
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_dialer<T: DialAdapter>() {}
        fn _assert_feedback<T: FeedbackAdapter>() {}
        fn _assert_notifier<T: NotificationSink>() {}
    }

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }
}
