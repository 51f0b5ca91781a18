//! Business conflicts surfaced to callers of the task lifecycle.
//!
//! Conflicts are expected outcomes of normal operation: each one carries a
//! stable [`TaskConflict::code`], a human-readable message explaining the fix,
//! and a structured [`TaskConflict::detail`] payload.

use super::{ScheduleId, TaskId, TaskState, TaskTitle, TimeWindow, WeekdaySet, describe_states};
use serde::Serialize;
use serde_json::{Value, json};
use std::fmt;
use thiserror::Error;

/// Collision between a tested schedule and a window already in force.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConflictRecord {
    /// Task owning the window already in force.
    pub task_id: TaskId,
    /// Title of the task owning the window already in force.
    pub task_title: TaskTitle,
    /// Schedule already in force.
    pub schedule_id: ScheduleId,
    /// Time window of the schedule already in force.
    pub window: TimeWindow,
    /// Weekdays on which both windows recur.
    pub weekdays: WeekdaySet,
    /// Schedule that was tested against the index.
    pub candidate: ScheduleId,
}

impl fmt::Display for ConflictRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' at {} on {}",
            self.task_title, self.window, self.weekdays
        )
    }
}

/// User-fixable conflicts raised by lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskConflict {
    /// The transition table has no row for the requested pair.
    #[error("{}", describe_invalid_transition(.task_id, .from, .to, .allowed))]
    InvalidTransition {
        /// Task whose transition was rejected.
        task_id: TaskId,
        /// Current state.
        from: TaskState,
        /// Requested state.
        to: TaskState,
        /// States reachable from `from`.
        allowed: Vec<TaskState>,
    },

    /// A task was requested in a state other than the initial one.
    #[error(
        "a task can only be created in state '{}', not '{requested}'",
        TaskState::INITIAL
    )]
    InvalidCreationState {
        /// State supplied by the caller.
        requested: TaskState,
    },

    /// Activation was requested for a task without schedules.
    #[error(
        "task {task_id} needs at least one schedule before it can become '{}'",
        TaskState::Active
    )]
    MissingSchedules {
        /// Task that has no schedules.
        task_id: TaskId,
    },

    /// The task's schedules collide with windows already in force.
    #[error("{}", describe_schedule_conflict(.task_id, .conflicts))]
    ScheduleConflict {
        /// Task whose activation was rejected.
        task_id: TaskId,
        /// One record per conflicting schedule of the task.
        conflicts: Vec<ConflictRecord>,
    },

    /// Guarded deletion was requested from a non-deletable state.
    #[error(
        "task {task_id} in state '{state}' cannot be deleted; deletion is only possible from {}",
        describe_states(.allowed)
    )]
    DeleteConflict {
        /// Task whose deletion was rejected.
        task_id: TaskId,
        /// Current state of the task.
        state: TaskState,
        /// States from which deletion is permitted.
        allowed: Vec<TaskState>,
    },

    /// Schedules were edited on a task whose schedules must stay fixed.
    #[error(
        "schedules of task {task_id} cannot change in state '{state}'; only {} tasks accept schedule changes",
        describe_states(&[TaskState::Planned, TaskState::Paused])
    )]
    ScheduleEditRejected {
        /// Task whose schedules were to change.
        task_id: TaskId,
        /// Current state of the task.
        state: TaskState,
    },
}

impl TaskConflict {
    /// Builds a delete conflict listing the deletable states.
    #[must_use]
    pub fn delete_conflict(task_id: TaskId, state: TaskState) -> Self {
        Self::DeleteConflict {
            task_id,
            state,
            allowed: TaskState::DELETABLE.to_vec(),
        }
    }

    /// Returns the stable conflict identifier.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::InvalidCreationState { .. } => "invalid_creation_state",
            Self::MissingSchedules { .. } => "missing_schedules",
            Self::ScheduleConflict { .. } => "schedule_conflict",
            Self::DeleteConflict { .. } => "delete_conflict",
            Self::ScheduleEditRejected { .. } => "schedule_edit_rejected",
        }
    }

    /// Returns the structured conflict payload.
    #[must_use]
    pub fn detail(&self) -> Value {
        match self {
            Self::InvalidTransition {
                task_id,
                from,
                to,
                allowed,
            } => json!({
                "task_id": task_id,
                "from": from,
                "to": to,
                "allowed": allowed,
            }),
            Self::InvalidCreationState { requested } => json!({
                "requested": requested,
                "allowed": [TaskState::INITIAL],
            }),
            Self::MissingSchedules { task_id } => json!({ "task_id": task_id }),
            Self::ScheduleConflict { task_id, conflicts } => json!({
                "task_id": task_id,
                "conflicts": conflicts,
            }),
            Self::DeleteConflict {
                task_id,
                state,
                allowed,
            } => json!({
                "task_id": task_id,
                "state": state,
                "allowed": allowed,
            }),
            Self::ScheduleEditRejected { task_id, state } => json!({
                "task_id": task_id,
                "state": state,
                "allowed": [TaskState::Planned, TaskState::Paused],
            }),
        }
    }
}

fn describe_invalid_transition(
    task_id: &TaskId,
    from: &TaskState,
    to: &TaskState,
    allowed: &[TaskState],
) -> String {
    let prefix = format!("task {task_id} cannot move from '{from}' to '{to}'");
    match allowed {
        [] => format!("{prefix}; no transition out of '{from}' is possible"),
        [_] => format!(
            "{prefix}; from '{from}' only the transition to state {} is possible",
            describe_states(allowed)
        ),
        _ => format!(
            "{prefix}; from '{from}' only the transitions to states {} are possible",
            describe_states(allowed)
        ),
    }
}

fn describe_schedule_conflict(task_id: &TaskId, conflicts: &[ConflictRecord]) -> String {
    let listed: Vec<String> = conflicts.iter().map(ToString::to_string).collect();
    format!(
        "schedules of task {task_id} conflict with active schedules ({}); change the schedules \
         of this task or of the other tasks, or move the other tasks to '{}'",
        listed.join("; "),
        TaskState::Paused
    )
}
