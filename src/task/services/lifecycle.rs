//! Service layer for the task lifecycle state machine.
//!
//! Every public operation runs behind one async gate shared by all clones of
//! the service. Holding it makes each pair of index mutation and persisted
//! write a single unit: when the write fails, the index change is undone
//! before the error is returned.

use super::{
    CreateTaskRequest, DeletionPolicy, ScheduleRequest, ScheduleStore, TransitionTaskRequest,
};
use crate::task::{
    domain::{
        Note, Report, Schedule, ScheduleEffect, Task, TaskConflict, TaskDomainError, TaskId,
        TaskState,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

/// Service-level errors for task lifecycle operations.
#[derive(Debug, Error)]
pub enum TaskLifecycleError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),
    /// A lifecycle rule rejected the operation.
    #[error(transparent)]
    Conflict(#[from] TaskConflict),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] TaskRepositoryError),
    /// No task exists with the given identifier.
    #[error("task {0} not found")]
    NotFound(TaskId),
}

impl TaskLifecycleError {
    /// Returns the business conflict, when the error is one.
    #[must_use]
    pub const fn conflict(&self) -> Option<&TaskConflict> {
        match self {
            Self::Conflict(conflict) => Some(conflict),
            _ => None,
        }
    }
}

/// Result type for task lifecycle service operations.
pub type TaskLifecycleResult<T> = Result<T, TaskLifecycleError>;

/// Task lifecycle orchestration service.
///
/// Clones share the repository, the schedule store and the gate.
pub struct TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    schedules: Arc<ScheduleStore>,
    clock: Arc<C>,
    gate: Arc<Mutex<()>>,
}

impl<R, C> Clone for TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            schedules: Arc::clone(&self.schedules),
            clock: Arc::clone(&self.clock),
            gate: Arc::clone(&self.gate),
        }
    }
}

impl<R, C> TaskLifecycleService<R, C>
where
    R: TaskRepository,
    C: Clock + Send + Sync,
{
    /// Creates a new task lifecycle service around a shared schedule store.
    ///
    /// Call [`Self::initialize`] before serving requests so the store
    /// reflects persisted active tasks.
    #[must_use]
    pub fn new(repository: Arc<R>, schedules: Arc<ScheduleStore>, clock: Arc<C>) -> Self {
        Self {
            repository,
            schedules,
            clock,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Rebuilds the schedule store from persisted active tasks.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the query fails.
    pub async fn initialize(&self) -> TaskLifecycleResult<usize> {
        let _gate = self.gate.lock().await;
        Ok(self.schedules.initialize(&*self.repository).await?)
    }

    /// Creates a planned task with its optional schedules.
    ///
    /// # Errors
    ///
    /// Returns [`TaskConflict::InvalidCreationState`] when a state other than
    /// `planned` is requested, domain errors for invalid fields or schedules,
    /// and repository errors when persistence fails.
    pub async fn create_task(&self, request: CreateTaskRequest) -> TaskLifecycleResult<Task> {
        if let Some(requested) = request.requested_state()
            && requested != TaskState::INITIAL
        {
            return Err(TaskConflict::InvalidCreationState { requested }.into());
        }

        let (title, subject, description, schedule_requests) = request.into_parts()?;
        let task = Task::new(title, subject, description, &*self.clock);
        let schedules = schedule_requests
            .into_iter()
            .map(|schedule| schedule.into_schedule(task.id()))
            .collect::<Result<Vec<_>, _>>()?;

        let _gate = self.gate.lock().await;
        self.repository.store(&task).await?;
        for schedule in &schedules {
            if let Err(err) = self.repository.store_schedule(schedule).await {
                self.discard_partial_task(task.id()).await;
                return Err(err.into());
            }
        }

        tracing::info!(
            task_id = %task.id(),
            title = %task.title(),
            schedules = schedules.len(),
            "task created"
        );
        Ok(task)
    }

    /// Attaches a schedule to a planned or paused task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskConflict::ScheduleEditRejected`] for tasks in any other state,
    /// domain errors for invalid windows and repository errors.
    pub async fn attach_schedule(
        &self,
        task_id: TaskId,
        request: ScheduleRequest,
    ) -> TaskLifecycleResult<Schedule> {
        let _gate = self.gate.lock().await;
        let task = self.find_task_or_error(task_id).await?;
        if !matches!(task.state(), TaskState::Planned | TaskState::Paused) {
            return Err(TaskConflict::ScheduleEditRejected {
                task_id,
                state: task.state(),
            }
            .into());
        }
        let schedule = request.into_schedule(task_id)?;
        self.repository.store_schedule(&schedule).await?;
        tracing::debug!(task_id = %task_id, schedule = %schedule, "schedule attached");
        Ok(schedule)
    }

    /// Moves a task to the requested state and applies field edits.
    ///
    /// A request for the task's current state only applies the edits.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks, domain
    /// errors for invalid edits, [`TaskConflict::InvalidTransition`],
    /// [`TaskConflict::MissingSchedules`] and
    /// [`TaskConflict::ScheduleConflict`] for rejected transitions, and
    /// repository errors. Nothing is changed when an error is returned.
    ///
    /// # Panics
    ///
    /// Panics when the schedule store has diverged from persisted state.
    pub async fn transition_task(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let _gate = self.gate.lock().await;
        self.transition_locked(request).await
    }

    /// Deletes a task with its schedules, notes and reports.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks,
    /// [`TaskConflict::DeleteConflict`] for guarded deletes of active or
    /// paused tasks, and repository errors.
    ///
    /// # Panics
    ///
    /// Panics when the schedule store has diverged from persisted state.
    pub async fn delete_task(
        &self,
        task_id: TaskId,
        policy: DeletionPolicy,
    ) -> TaskLifecycleResult<()> {
        let _gate = self.gate.lock().await;
        let task = self.find_task_or_error(task_id).await?;
        if policy == DeletionPolicy::Guarded && !task.state().is_deletable() {
            return Err(TaskConflict::delete_conflict(task_id, task.state()).into());
        }

        if task.state() == TaskState::Active {
            let schedules = self.repository.schedules_for_task(task_id).await?;
            self.schedules.remove_task_schedules(&task, &schedules);
            if let Err(err) = self.repository.delete(task_id).await {
                tracing::warn!(task_id = %task_id, error = %err, "delete not persisted; restoring index");
                self.reinstate(&task, &schedules);
                return Err(err.into());
            }
        } else {
            self.repository.delete(task_id).await?;
        }

        tracing::info!(task_id = %task_id, state = %task.state(), "task deleted");
        Ok(())
    }

    /// Pauses every active task through the regular transition path.
    ///
    /// # Errors
    ///
    /// Returns the first error raised while pausing; tasks paused before it
    /// stay paused.
    ///
    /// # Panics
    ///
    /// Panics when the schedule store has diverged from persisted state.
    pub async fn pause_all_active(&self) -> TaskLifecycleResult<Vec<Task>> {
        let _gate = self.gate.lock().await;
        let active = self.repository.find_by_state(TaskState::Active).await?;
        let mut paused = Vec::with_capacity(active.len());
        for task in active {
            let request = TransitionTaskRequest::new(task.id(), TaskState::Paused);
            paused.push(self.transition_locked(request).await?);
        }
        tracing::info!(count = paused.len(), "all active tasks paused");
        Ok(paused)
    }

    /// Deletes every task and rebuilds the schedule store.
    ///
    /// # Errors
    ///
    /// Returns [`TaskConflict::DeleteConflict`] naming the first active or
    /// paused task when `policy` is guarded, and repository errors. The store
    /// is rebuilt from whatever remains even when a delete fails.
    ///
    /// # Panics
    ///
    /// Panics when the rebuilt store finds duplicated persisted schedules.
    pub async fn remove_all(&self, policy: DeletionPolicy) -> TaskLifecycleResult<usize> {
        let _gate = self.gate.lock().await;
        let tasks = self.repository.list_all().await?;
        if policy == DeletionPolicy::Guarded
            && let Some(blocking) = tasks
                .iter()
                .find(|task| matches!(task.state(), TaskState::Active | TaskState::Paused))
        {
            return Err(TaskConflict::delete_conflict(blocking.id(), blocking.state()).into());
        }

        let deleted = self.delete_every(&tasks).await;
        self.schedules.reinitialize(&*self.repository).await?;
        let count = deleted?;
        tracing::info!(count, "all tasks removed");
        Ok(count)
    }

    /// Attaches a note to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks and
    /// repository errors.
    pub async fn attach_note(
        &self,
        task_id: TaskId,
        title: Option<String>,
        text: impl Into<String>,
    ) -> TaskLifecycleResult<Note> {
        self.find_task_or_error(task_id).await?;
        let note = Note::new(task_id, title, text, &*self.clock);
        self.repository.store_note(&note).await?;
        Ok(note)
    }

    /// Attaches a report to an existing task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::NotFound`] for unknown tasks and
    /// repository errors.
    pub async fn attach_report(
        &self,
        task_id: TaskId,
        text: impl Into<String>,
    ) -> TaskLifecycleResult<Report> {
        self.find_task_or_error(task_id).await?;
        let report = Report::new(task_id, text, &*self.clock);
        self.repository.store_report(&report).await?;
        Ok(report)
    }

    /// Retrieves a task by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn find_by_id(&self, task_id: TaskId) -> TaskLifecycleResult<Option<Task>> {
        Ok(self.repository.find_by_id(task_id).await?)
    }

    /// Returns the persisted schedules of a task.
    ///
    /// # Errors
    ///
    /// Returns [`TaskLifecycleError::Repository`] when the lookup fails.
    pub async fn schedules_for(&self, task_id: TaskId) -> TaskLifecycleResult<Vec<Schedule>> {
        Ok(self.repository.schedules_for_task(task_id).await?)
    }

    async fn find_task_or_error(&self, task_id: TaskId) -> TaskLifecycleResult<Task> {
        self.repository
            .find_by_id(task_id)
            .await?
            .ok_or(TaskLifecycleError::NotFound(task_id))
    }

    async fn transition_locked(
        &self,
        request: TransitionTaskRequest,
    ) -> TaskLifecycleResult<Task> {
        let current = self.find_task_or_error(request.task_id()).await?;
        let target = request
            .target_state()
            .unwrap_or_else(|| current.state());
        let edits = request.into_edits()?;

        let mut updated = current.clone();
        let effect = updated.transition_to(target, &*self.clock)?;
        updated.apply_edits(edits, &*self.clock);

        match effect {
            ScheduleEffect::None if is_active_retitle(&current, &updated) => {
                self.retitle(&current, &updated).await?;
            }
            ScheduleEffect::None => self.repository.update(&updated).await?,
            ScheduleEffect::Enforce => self.enforce(&updated).await?,
            ScheduleEffect::Release => self.release(&current, &updated, false).await?,
            ScheduleEffect::ReleaseAndPurge => self.release(&current, &updated, true).await?,
            ScheduleEffect::Purge => {
                self.repository.update_and_purge_schedules(&updated).await?;
            }
        }

        tracing::info!(
            task_id = %updated.id(),
            from = %current.state(),
            to = %updated.state(),
            "task transitioned"
        );
        Ok(updated)
    }

    /// Puts the task's schedules in force, then persists the new state.
    async fn enforce(&self, updated: &Task) -> TaskLifecycleResult<()> {
        let schedules = self.repository.schedules_for_task(updated.id()).await?;
        self.schedules
            .add_task_schedules(updated, &schedules)
            .map_err(TaskConflict::from)?;

        if let Err(err) = self.repository.update(updated).await {
            tracing::warn!(task_id = %updated.id(), error = %err, "activation not persisted; releasing index entries");
            self.schedules.remove_task_schedules(updated, &schedules);
            return Err(err.into());
        }
        Ok(())
    }

    /// Takes the task's schedules out of force, then persists the new state,
    /// optionally deleting the persisted schedules with it.
    async fn release(
        &self,
        current: &Task,
        updated: &Task,
        purge: bool,
    ) -> TaskLifecycleResult<()> {
        let schedules = self.repository.schedules_for_task(current.id()).await?;
        self.schedules.remove_task_schedules(current, &schedules);

        let persisted = if purge {
            self.repository.update_and_purge_schedules(updated).await
        } else {
            self.repository.update(updated).await
        };
        if let Err(err) = persisted {
            tracing::warn!(task_id = %current.id(), error = %err, "release not persisted; restoring index");
            self.reinstate(current, &schedules);
            return Err(err.into());
        }
        Ok(())
    }

    /// Re-indexes an active task under its new title, then persists it.
    async fn retitle(&self, current: &Task, updated: &Task) -> TaskLifecycleResult<()> {
        let schedules = self.repository.schedules_for_task(current.id()).await?;
        self.schedules.remove_task_schedules(current, &schedules);
        self.reinstate(updated, &schedules);

        if let Err(err) = self.repository.update(updated).await {
            tracing::warn!(task_id = %current.id(), error = %err, "edit not persisted; restoring index");
            self.schedules.remove_task_schedules(updated, &schedules);
            self.reinstate(current, &schedules);
            return Err(err.into());
        }
        Ok(())
    }

    /// Puts back windows that were in force moments ago under the gate.
    fn reinstate(&self, task: &Task, schedules: &[Schedule]) {
        if let Err(err) = self.schedules.add_task_schedules(task, schedules) {
            panic!(
                "task {} could not re-enter the schedule index it just left: {err}",
                task.id()
            );
        }
    }

    async fn delete_every(&self, tasks: &[Task]) -> TaskLifecycleResult<usize> {
        for task in tasks {
            self.repository.delete(task.id()).await?;
        }
        Ok(tasks.len())
    }

    async fn discard_partial_task(&self, task_id: TaskId) {
        if let Err(err) = self.repository.delete(task_id).await {
            tracing::warn!(task_id = %task_id, error = %err, "failed to discard partially created task");
        }
    }
}

fn is_active_retitle(current: &Task, updated: &Task) -> bool {
    current.state() == TaskState::Active && current.title() != updated.title()
}
