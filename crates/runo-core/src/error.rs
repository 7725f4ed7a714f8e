// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Runo call-session workspace.

use thiserror::Error;

use crate::types::{CallStatus, SubjectId};

/// Message shown when a remote failure carries no readable text.
pub const GENERIC_REMOTE_FAILURE: &str = "Something went wrong while contacting the dialer service";

/// The primary error type returned by call-session operations.
#[derive(Debug, Error)]
pub enum RunoError {
    /// Local validation failure. The session state is left unchanged.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The remote dial request failed. The session moves to `Failed`.
    #[error("dial failed: {message}")]
    Dial {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The remote feedback submission failed. The disposition is retained.
    #[error("feedback submission failed: {message}")]
    Submission {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RunoError {
    /// Builds a [`RunoError::Dial`] from an adapter failure.
    pub fn dial(err: RemoteError) -> Self {
        let message = err.display_message();
        RunoError::Dial {
            message,
            source: Some(Box::new(err)),
        }
    }

    /// Builds a [`RunoError::Submission`] from an adapter failure.
    pub fn submission(err: RemoteError) -> Self {
        let message = err.display_message();
        RunoError::Submission {
            message,
            source: Some(Box::new(err)),
        }
    }

    /// Returns the text a view layer should show for this error.
    pub fn user_message(&self) -> String {
        match self {
            RunoError::Validation(v) => v.to_string(),
            RunoError::Dial { message, .. } | RunoError::Submission { message, .. } => {
                message.clone()
            }
            RunoError::Config(m) | RunoError::Internal(m) => m.clone(),
        }
    }

    /// Returns `true` for locally recoverable validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, RunoError::Validation(_))
    }
}

/// Local validation failures. Never fatal; the caller re-enters data and retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("subject id must not be empty")]
    EmptySubject,

    #[error("a call for `{subject_id}` is already {status}")]
    AlreadyActive {
        subject_id: SubjectId,
        status: CallStatus,
    },

    #[error("the current call for `{subject_id}` is {status}; finish it before starting another")]
    SessionBusy {
        subject_id: SubjectId,
        status: CallStatus,
    },

    #[error("no active call session for `{operation}`")]
    NoActiveSession { operation: &'static str },

    #[error("cannot {operation} while the call is {status}")]
    InvalidTransition {
        operation: &'static str,
        status: CallStatus,
    },

    #[error("feedback is not open for this call")]
    FeedbackNotOpen,

    #[error("please select a call status (L1)")]
    MissingL1,

    #[error("unknown call status `{l1}`")]
    UnknownL1 { l1: String },

    #[error("please select a call sub-status (L2) for `{l1}`")]
    MissingL2 { l1: String },

    #[error("`{l2}` is not a valid sub-status for `{l1}`")]
    UnknownL2 { l1: String, l2: String },

    #[error("a comment is mandatory for `{l1}` / `{l2}`")]
    CommentRequired { l1: String, l2: String },

    #[error("please select a stage")]
    MissingStage,

    #[error("please select a level")]
    MissingLevel,

    #[error("follow-up for stage `{stage}` cannot be more than {max_days} day(s) ahead")]
    FollowUpBeyondCap { stage: String, max_days: u32 },

    #[error("follow-up date cannot be in the past")]
    FollowUpInPast,

    #[error("follow-up date is out of range")]
    FollowUpOutOfRange,

    #[error("unknown feedback field `{0}`")]
    UnknownField(String),

    #[error("invalid value `{value}` for field `{field}`")]
    InvalidFieldValue { field: String, value: String },
}

/// A failure reported by a remote collaborator (dialer or feedback service).
///
/// `message` holds the human-readable text extracted from the failure payload,
/// when the payload had one.
#[derive(Debug, Error)]
#[error("{}", .message.as_deref().unwrap_or(GENERIC_REMOTE_FAILURE))]
pub struct RemoteError {
    pub message: Option<String>,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RemoteError {
    /// A failure with a readable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            source: None,
        }
    }

    /// A failure with nothing readable attached.
    pub fn opaque() -> Self {
        Self {
            message: None,
            source: None,
        }
    }

    /// Attaches the underlying transport error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Extracts a message from a JSON failure payload.
    ///
    /// Looks at `body.message`, `body[0].message`, `message` and `error`, in that order.
    pub fn from_payload(payload: &serde_json::Value) -> Self {
        let candidates = [
            payload.pointer("/body/message"),
            payload.pointer("/body/0/message"),
            payload.get("message"),
            payload.get("error"),
        ];
        let message = candidates
            .into_iter()
            .flatten()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string);
        Self {
            message,
            source: None,
        }
    }

    /// The message to surface to the user, or the generic fallback.
    pub fn display_message(&self) -> String {
        match self.message.as_deref().map(str::trim) {
            Some(m) if !m.is_empty() => m.to_string(),
            _ => GENERIC_REMOTE_FAILURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_message_is_extracted_from_body() {
        let err = RemoteError::from_payload(&json!({ "body": { "message": "Agent is offline" } }));
        assert_eq!(err.display_message(), "Agent is offline");
    }

    #[test]
    fn payload_message_is_extracted_from_body_array() {
        let err = RemoteError::from_payload(&json!({ "body": [{ "message": "Invalid lead" }] }));
        assert_eq!(err.display_message(), "Invalid lead");
    }

    #[test]
    fn blank_payload_falls_back_to_generic_message() {
        let err = RemoteError::from_payload(&json!({ "message": "   " }));
        assert!(err.message.is_none());
        assert_eq!(err.display_message(), GENERIC_REMOTE_FAILURE);
        assert_eq!(err.to_string(), GENERIC_REMOTE_FAILURE);
    }

    #[test]
    fn dial_error_carries_remote_message() {
        let err = RunoError::dial(RemoteError::new("Number is on DND"));
        assert_eq!(err.user_message(), "Number is on DND");
        assert_eq!(err.to_string(), "dial failed: Number is on DND");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn validation_errors_convert_into_runo_error() {
        let err: RunoError = ValidationError::MissingL1.into();
        assert!(err.is_validation());
        assert_eq!(err.user_message(), "please select a call status (L1)");
    }

    #[test]
    fn follow_up_cap_error_names_the_cap() {
        let err = ValidationError::FollowUpBeyondCap {
            stage: "Hot".into(),
            max_days: 3,
        };
        assert!(err.to_string().contains("3 day(s)"));
        assert!(err.to_string().contains("Hot"));
    }
}
