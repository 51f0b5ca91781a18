//! Request payloads accepted by the task lifecycle service.

use crate::task::domain::{
    Schedule, SubjectTitle, TaskDomainError, TaskEdits, TaskId, TaskState, TaskTitle, TimeWindow,
    Weekday, WeekdaySet,
};
use chrono::NaiveTime;

/// Request payload for a recurring schedule window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    start_time: NaiveTime,
    end_time: NaiveTime,
    weekdays: Vec<Weekday>,
}

impl ScheduleRequest {
    /// Creates a schedule request.
    #[must_use]
    pub fn new(
        start_time: NaiveTime,
        end_time: NaiveTime,
        weekdays: impl IntoIterator<Item = Weekday>,
    ) -> Self {
        Self {
            start_time,
            end_time,
            weekdays: weekdays.into_iter().collect(),
        }
    }

    /// Validates the request into a schedule owned by `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTimeWindow`] unless the window starts
    /// before it ends, and [`TaskDomainError::NoWeekdays`] when no weekday is
    /// given.
    pub fn into_schedule(self, task_id: TaskId) -> Result<Schedule, TaskDomainError> {
        let window = TimeWindow::new(self.start_time, self.end_time)?;
        Schedule::new(task_id, window, WeekdaySet::from_days(self.weekdays))
    }
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    subject: Option<String>,
    description: Option<String>,
    state: Option<TaskState>,
    schedules: Vec<ScheduleRequest>,
}

impl CreateTaskRequest {
    /// Creates a request with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subject: None,
            description: None,
            state: None,
            schedules: Vec::new(),
        }
    }

    /// Sets the subject title.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Requests an explicit initial state.
    #[must_use]
    pub const fn with_state(mut self, state: TaskState) -> Self {
        self.state = Some(state);
        self
    }

    /// Adds a schedule window.
    #[must_use]
    pub fn with_schedule(mut self, schedule: ScheduleRequest) -> Self {
        self.schedules.push(schedule);
        self
    }

    pub(super) const fn requested_state(&self) -> Option<TaskState> {
        self.state
    }

    pub(super) fn into_parts(
        self,
    ) -> Result<(TaskTitle, Option<SubjectTitle>, String, Vec<ScheduleRequest>), TaskDomainError>
    {
        let title = TaskTitle::new(self.title)?;
        let subject = self.subject.map(SubjectTitle::new).transpose()?;
        Ok((
            title,
            subject,
            self.description.unwrap_or_default(),
            self.schedules,
        ))
    }
}

/// Request payload for moving a task to a state and editing its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionTaskRequest {
    task_id: TaskId,
    target_state: Option<TaskState>,
    title: Option<String>,
    subject: Option<Option<String>>,
    description: Option<String>,
}

impl TransitionTaskRequest {
    /// Creates a request moving `task_id` to `target_state`.
    #[must_use]
    pub const fn new(task_id: TaskId, target_state: TaskState) -> Self {
        Self {
            task_id,
            target_state: Some(target_state),
            title: None,
            subject: None,
            description: None,
        }
    }

    /// Creates a request that edits fields and keeps the current state.
    #[must_use]
    pub const fn edit(task_id: TaskId) -> Self {
        Self {
            task_id,
            target_state: None,
            title: None,
            subject: None,
            description: None,
        }
    }

    /// Replaces the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Replaces the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(Some(subject.into()));
        self
    }

    /// Clears the subject.
    #[must_use]
    pub fn without_subject(mut self) -> Self {
        self.subject = Some(None);
        self
    }

    /// Replaces the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the task the request targets.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the requested state, if any.
    #[must_use]
    pub const fn target_state(&self) -> Option<TaskState> {
        self.target_state
    }

    pub(super) fn into_edits(self) -> Result<TaskEdits, TaskDomainError> {
        let title = self.title.map(TaskTitle::new).transpose()?;
        let subject = self
            .subject
            .map(|subject| subject.map(SubjectTitle::new).transpose())
            .transpose()?;
        Ok(TaskEdits {
            title,
            subject,
            description: self.description,
        })
    }
}

/// Whether deletion honours the lifecycle delete gate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeletionPolicy {
    /// Deletion is only permitted from deletable states.
    #[default]
    Guarded,
    /// Administrative override: delete regardless of state.
    Forced,
}
