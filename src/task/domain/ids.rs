//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype with the shared accessors.
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $noun:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", $noun, " identifier.")]
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", $noun, " identifier from an existing UUID.")]
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a task record.
    TaskId,
    "task"
);

uuid_identifier!(
    /// Unique identifier for a recurring schedule window.
    ScheduleId,
    "schedule"
);

uuid_identifier!(
    /// Unique identifier for a task note.
    NoteId,
    "note"
);

uuid_identifier!(
    /// Unique identifier for a task report.
    ReportId,
    "report"
);

impl ScheduleId {
    /// Smallest identifier in the total order, used as a range bound.
    pub(crate) const MIN: Self = Self(Uuid::nil());

    /// Largest identifier in the total order, used as a range bound.
    pub(crate) const MAX: Self = Self(Uuid::max());
}

/// Longest title accepted for tasks and subjects.
const MAX_TITLE_CHARS: usize = 64;

/// Trims a title and checks it against the shared length rules.
fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.chars().count() > MAX_TITLE_CHARS {
        return None;
    }
    Some(trimmed.to_owned())
}

/// Validated task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Creates a validated task title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTaskTitle`] when the value is blank and
    /// [`TaskDomainError::TaskTitleTooLong`] when it exceeds 64 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(TaskDomainError::EmptyTaskTitle);
        }
        normalize_title(&raw)
            .map(Self)
            .ok_or(TaskDomainError::TaskTitleTooLong(raw))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TaskTitle {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Title of the subject a task is filed under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectTitle(String);

impl SubjectTitle {
    /// Creates a validated subject title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidSubjectTitle`] when the value is
    /// blank or exceeds 64 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        normalize_title(&raw)
            .map(Self)
            .ok_or(TaskDomainError::InvalidSubjectTitle(raw))
    }

    /// Returns the subject title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
