// SPDX-FileCopyrightText: 2026 Runo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Calling-context profiles.
//!
//! Lead, course-allocation and webinar-attendee calls share one state
//! machine; a profile only says which context the collaborators bind and
//! which disposition fields the context insists on.

use std::str::FromStr;

use runo_core::{CallContextKind, RunoError};

/// Disposition fields a calling context makes mandatory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackRequirements {
    pub stage: bool,
    pub level: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallProfile {
    pub kind: CallContextKind,
    pub requires_stage: bool,
    pub requires_level: bool,
    /// Initial value of the disposition's `notify` flag.
    pub notify_by_default: bool,
}

impl CallProfile {
    pub fn lead() -> Self {
        Self {
            kind: CallContextKind::Lead,
            requires_stage: true,
            requires_level: false,
            notify_by_default: false,
        }
    }

    pub fn course_allocation() -> Self {
        Self {
            kind: CallContextKind::CourseAllocation,
            requires_stage: true,
            requires_level: true,
            notify_by_default: false,
        }
    }

    pub fn webinar_attendee() -> Self {
        Self {
            kind: CallContextKind::WebinarAttendee,
            requires_stage: false,
            requires_level: false,
            notify_by_default: true,
        }
    }

    pub fn for_kind(kind: CallContextKind) -> Self {
        match kind {
            CallContextKind::Lead => Self::lead(),
            CallContextKind::CourseAllocation => Self::course_allocation(),
            CallContextKind::WebinarAttendee => Self::webinar_attendee(),
        }
    }

    pub fn requirements(&self) -> FeedbackRequirements {
        FeedbackRequirements {
            stage: self.requires_stage,
            level: self.requires_level,
        }
    }
}

impl FromStr for CallProfile {
    type Err = RunoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CallContextKind::from_str(s)
            .map(Self::for_kind)
            .map_err(|_| RunoError::Config(format!("unknown call profile: {s}")))
    }
}
