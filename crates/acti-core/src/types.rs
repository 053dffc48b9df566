//! Core type definitions with validation.

use std::fmt;

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for model types and evaluator actions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// A sleep window would end before it starts.
    #[error("sleep onset {onset} is after wakeup {wakeup}")]
    OnsetAfterWakeup {
        onset: DateTime<Utc>,
        wakeup: DateTime<Utc>,
    },

    /// A UTC offset outside the range chrono accepts (±24h exclusive).
    #[error("invalid UTC offset: {seconds} seconds")]
    InvalidOffset { seconds: i32 },

    /// No sleep window exists at the given position on a day.
    #[error("no sleep window at index {index} (day has {len})")]
    UnknownInterval { index: usize, len: usize },

    /// A sleep window would overlap another window on the same day.
    #[error("sleep window overlaps window {other} on the same day")]
    OverlappingInterval { other: usize },

    /// A day must keep at least one sleep window.
    #[error("cannot remove the last sleep window of a day")]
    LastInterval,

    /// The requested day is not one of the subject's reviewable days.
    #[error("day index {index} out of range (subject has {days} days)")]
    DayOutOfRange { index: usize, days: usize },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated subject identifier.
    ///
    /// Subject IDs must be non-blank. They name one participant's recording and
    /// are unique across the study, though uniqueness is the storage layer's job.
    SubjectId, "subject ID"
);

/// Builds a [`FixedOffset`] from a signed seconds value.
pub fn offset_from_seconds(seconds: i32) -> Result<FixedOffset, ValidationError> {
    FixedOffset::east_opt(seconds).ok_or(ValidationError::InvalidOffset { seconds })
}
