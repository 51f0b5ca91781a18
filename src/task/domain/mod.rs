//! Domain model for task lifecycle management.
//!
//! The task domain models tasks, their recurring schedule windows, the
//! transition table that governs lifecycle states and the conflict index
//! over active windows, while keeping all infrastructure concerns outside of
//! the domain boundary.

mod attachment;
mod conflict;
mod error;
mod ids;
mod schedule;
mod schedule_index;
mod task;
mod transition;

pub use attachment::{DEFAULT_NOTE_TITLE, Note, Report};
pub use conflict::{ConflictRecord, TaskConflict};
pub use error::{ParseTaskStateError, TaskDomainError};
pub use ids::{NoteId, ReportId, ScheduleId, SubjectTitle, TaskId, TaskTitle};
pub use schedule::{ALL_WEEKDAYS, Schedule, TimeWindow, Weekday, WeekdaySet, weekday_name};
pub use schedule_index::{ActivationError, ActiveWindow, ConflictIndex, ConflictReporting};
pub use task::{PersistedTaskData, Task, TaskEdits, TaskState};
pub use transition::{ScheduleEffect, TRANSITIONS, transition_effect};

pub(crate) use transition::describe_states;
