use thiserror::Error;

use crate::model::profile::UserType;

/// Malformed or out-of-range user input. State is never touched when one of
/// these is returned; the caller is expected to re-prompt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Name cannot be empty")]
    EmptyName,

    #[error("{label} cannot be empty")]
    EmptyClassLabel { label: String },

    #[error("Unknown user type: '{input}' (expected school or college)")]
    UnknownUserType { input: String },

    #[error("Invalid {field}: '{input}' is not a non-negative whole number")]
    InvalidCount { field: String, input: String },

    #[error("Invalid goal: '{input}' is not a whole number")]
    InvalidGoal { input: String },

    #[error("Goal must be between 0 and 100, got {value}")]
    GoalOutOfRange { value: i64 },

    #[error("Unknown day: '{input}'")]
    UnknownDay { input: String },

    #[error("Ambiguous day: '{input}' matches {candidates:?}")]
    AmbiguousDay {
        input: String,
        candidates: Vec<&'static str>,
    },

    #[error("Week {week} is out of range (1..={len})")]
    WeekOutOfRange { week: u32, len: usize },

    #[error("Attended ({attended}) cannot exceed total ({total})")]
    AttendedExceedsTotal { attended: u32, total: u32 },
}

impl ValidationError {
    pub fn invalid_count(field: impl Into<String>, input: impl Into<String>) -> Self {
        Self::InvalidCount {
            field: field.into(),
            input: input.into(),
        }
    }

    pub fn empty_class_label(label: impl Into<String>) -> Self {
        Self::EmptyClassLabel {
            label: label.into(),
        }
    }
}

/// Errors surfaced by the attendance service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AttendanceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No profile yet: complete onboarding first")]
    NotOnboarded,

    #[error("Already onboarded as {name}; reset to start over")]
    AlreadyOnboarded { name: String },

    #[error("This action needs {expected} mode, but the profile is {actual}")]
    WrongMode { expected: UserType, actual: UserType },
}

pub type AttendanceResult<T> = std::result::Result<T, AttendanceError>;
