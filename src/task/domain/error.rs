//! Error types for task domain validation and parsing.

use chrono::NaiveTime;
use thiserror::Error;

/// Errors returned while constructing domain task values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTaskTitle,

    /// The task title exceeds the 64-character storage limit.
    #[error("task title exceeds 64 character limit: {0}")]
    TaskTitleTooLong(String),

    /// The subject title is blank or too long.
    #[error("invalid subject title '{0}', expected 1 to 64 characters")]
    InvalidSubjectTitle(String),

    /// The schedule window does not start before it ends.
    #[error("schedule must start before it ends, got {start}-{end}")]
    InvalidTimeWindow {
        /// Requested start time.
        start: NaiveTime,
        /// Requested end time.
        end: NaiveTime,
    },

    /// The schedule has no weekday flag set.
    #[error("schedule must recur on at least one weekday")]
    NoWeekdays,
}

/// Error returned while parsing task states from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task state: {0}")]
pub struct ParseTaskStateError(pub String);
