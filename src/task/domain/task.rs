//! Task aggregate root and related task lifecycle types.

use super::{
    ParseTaskStateError, ScheduleEffect, SubjectTitle, TaskConflict, TaskId, TaskTitle,
    transition_effect,
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Task has been created but its schedules are not enforced.
    Planned,
    /// Task schedules are enforced against other active tasks.
    Active,
    /// Task work is temporarily paused; schedules are kept but not enforced.
    Paused,
    /// Task has been completed and its schedules discarded.
    Finished,
    /// Finished task moved out of the working set.
    Archived,
}

impl TaskState {
    /// State every task starts in.
    pub const INITIAL: Self = Self::Planned;

    /// States from which a task may be deleted without force.
    pub const DELETABLE: [Self; 3] = [Self::Planned, Self::Finished, Self::Archived];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Finished => "finished",
            Self::Archived => "archived",
        }
    }

    /// Returns whether a guarded delete is permitted from this state.
    #[must_use]
    pub fn is_deletable(self) -> bool {
        Self::DELETABLE.contains(&self)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskState {
    type Error = ParseTaskStateError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "planned" => Ok(Self::Planned),
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "finished" => Ok(Self::Finished),
            "archived" => Ok(Self::Archived),
            _ => Err(ParseTaskStateError(value.to_owned())),
        }
    }
}

/// Editable task fields carried alongside a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdits {
    /// Replacement title.
    pub title: Option<TaskTitle>,
    /// Replacement subject; `Some(None)` clears it.
    pub subject: Option<Option<SubjectTitle>>,
    /// Replacement description.
    pub description: Option<String>,
}

impl TaskEdits {
    /// Returns whether no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none() && self.subject.is_none() && self.description.is_none()
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: TaskTitle,
    subject: Option<SubjectTitle>,
    description: String,
    state: TaskState,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted subject, if any.
    pub subject: Option<SubjectTitle>,
    /// Persisted description.
    pub description: String,
    /// Persisted lifecycle state.
    pub state: TaskState,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new planned task.
    #[must_use]
    pub fn new(
        title: TaskTitle,
        subject: Option<SubjectTitle>,
        description: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        let timestamp = clock.utc();
        Self {
            id: TaskId::new(),
            title,
            subject,
            description: description.into(),
            state: TaskState::INITIAL,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            subject: data.subject,
            description: data.description,
            state: data.state,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the subject, if any.
    #[must_use]
    pub const fn subject(&self) -> Option<&SubjectTitle> {
        self.subject.as_ref()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task lifecycle state.
    #[must_use]
    pub const fn state(&self) -> TaskState {
        self.state
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Applies field edits without touching the lifecycle state.
    pub fn apply_edits(&mut self, edits: TaskEdits, clock: &impl Clock) {
        if edits.is_empty() {
            return;
        }
        if let Some(title) = edits.title {
            self.title = title;
        }
        if let Some(subject) = edits.subject {
            self.subject = subject;
        }
        if let Some(description) = edits.description {
            self.description = description;
        }
        self.touch(clock);
    }

    /// Moves the task to `target` and returns the schedule effect the caller
    /// must carry out before persisting.
    ///
    /// Requesting the current state succeeds with [`ScheduleEffect::None`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskConflict::InvalidTransition`] when the transition table
    /// has no row for the pair; the task is left unchanged.
    pub fn transition_to(
        &mut self,
        target: TaskState,
        clock: &impl Clock,
    ) -> Result<ScheduleEffect, TaskConflict> {
        if self.state == target {
            return Ok(ScheduleEffect::None);
        }
        let effect = transition_effect(self.state, target).ok_or_else(|| {
            TaskConflict::InvalidTransition {
                task_id: self.id,
                from: self.state,
                to: target,
                allowed: self.state.allowed_targets(),
            }
        })?;
        self.state = target;
        self.touch(clock);
        Ok(effect)
    }

    /// Updates the `updated_at` timestamp to the current clock time.
    fn touch(&mut self, clock: &impl Clock) {
        self.updated_at = clock.utc();
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} id:{} [{}]", self.title, self.id, self.state)
    }
}
