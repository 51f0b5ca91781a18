//! Repository port for task, schedule, note and report persistence.

use crate::task::domain::{
    ActiveWindow, Note, Report, Schedule, ScheduleId, Task, TaskId, TaskState,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateTask`] when the task ID already
    /// exists.
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task (fields, state, timestamps).
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn update(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Persists changes to an existing task and deletes all of its schedules
    /// as one unit.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist;
    /// nothing is changed in that case.
    async fn update_and_purge_schedules(&self, task: &Task) -> TaskRepositoryResult<()>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>>;

    /// Returns every stored task.
    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>>;

    /// Returns every task currently in `state`.
    async fn find_by_state(&self, state: TaskState) -> TaskRepositoryResult<Vec<Task>>;

    /// Deletes a task together with its schedules, notes and reports.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()>;

    /// Stores a new schedule for an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the owning task does not
    /// exist or [`TaskRepositoryError::DuplicateSchedule`] when the schedule
    /// ID is taken.
    async fn store_schedule(&self, schedule: &Schedule) -> TaskRepositoryResult<()>;

    /// Returns the schedules of a task.
    async fn schedules_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Schedule>>;

    /// Returns the windows of every schedule whose task is active.
    async fn active_schedules(&self) -> TaskRepositoryResult<Vec<ActiveWindow>>;

    /// Stores a note for an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn store_note(&self, note: &Note) -> TaskRepositoryResult<()>;

    /// Returns the notes of a task.
    async fn notes_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Note>>;

    /// Stores a report for an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when the task does not exist.
    async fn store_report(&self, report: &Report) -> TaskRepositoryResult<()>;

    /// Returns the reports of a task.
    async fn reports_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Report>>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A schedule with the same identifier already exists.
    #[error("duplicate schedule identifier: {0}")]
    DuplicateSchedule(ScheduleId),

    /// The task was not found.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
