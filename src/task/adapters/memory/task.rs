//! In-memory repository for task lifecycle tests and embedding.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::task::{
    domain::{
        ActiveWindow, Note, NoteId, Report, ReportId, Schedule, ScheduleId, Task, TaskId,
        TaskState,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    schedules: HashMap<ScheduleId, Schedule>,
    notes: HashMap<NoteId, Note>,
    reports: HashMap<ReportId, Report>,
}

impl InMemoryTaskState {
    fn ensure_task(&self, task_id: TaskId) -> TaskRepositoryResult<()> {
        if self.tasks.contains_key(&task_id) {
            Ok(())
        } else {
            Err(TaskRepositoryError::NotFound(task_id))
        }
    }

    fn replace_task(&mut self, task: &Task) -> TaskRepositoryResult<()> {
        let stored = self
            .tasks
            .get_mut(&task.id())
            .ok_or(TaskRepositoryError::NotFound(task.id()))?;
        *stored = task.clone();
        Ok(())
    }

    fn purge_schedules(&mut self, task_id: TaskId) {
        self.schedules
            .retain(|_, schedule| schedule.task_id() != task_id);
    }
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> TaskRepositoryResult<RwLockReadGuard<'_, InMemoryTaskState>> {
        self.state.read().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }

    fn write(&self) -> TaskRepositoryResult<RwLockWriteGuard<'_, InMemoryTaskState>> {
        self.state.write().map_err(|err| {
            TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
        })
    }
}

/// Collects values owned by `task_id`, ordered by `sort_key`.
fn owned_by<T, K>(
    values: &HashMap<impl std::hash::Hash + Eq, T>,
    task_id: TaskId,
    owner: impl Fn(&T) -> TaskId,
    sort_key: impl Fn(&T) -> K,
) -> Vec<T>
where
    T: Clone,
    K: Ord,
{
    let mut owned: Vec<T> = values
        .values()
        .filter(|value| owner(*value) == task_id)
        .cloned()
        .collect();
    owned.sort_by_key(|value| sort_key(value));
    owned
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn store(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }
        state.tasks.insert(task.id(), task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        self.write()?.replace_task(task)
    }

    async fn update_and_purge_schedules(&self, task: &Task) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.replace_task(task)?;
        state.purge_schedules(task.id());
        Ok(())
    }

    async fn find_by_id(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list_all(&self) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
        tasks.sort_by_key(|task| (task.created_at(), task.id()));
        Ok(tasks)
    }

    async fn find_by_state(&self, task_state: TaskState) -> TaskRepositoryResult<Vec<Task>> {
        let mut tasks = self.list_all().await?;
        tasks.retain(|task| task.state() == task_state);
        Ok(tasks)
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        if state.tasks.remove(&id).is_none() {
            return Err(TaskRepositoryError::NotFound(id));
        }
        state.purge_schedules(id);
        state.notes.retain(|_, note| note.task_id() != id);
        state.reports.retain(|_, report| report.task_id() != id);
        Ok(())
    }

    async fn store_schedule(&self, schedule: &Schedule) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_task(schedule.task_id())?;
        if state.schedules.contains_key(&schedule.id()) {
            return Err(TaskRepositoryError::DuplicateSchedule(schedule.id()));
        }
        state.schedules.insert(schedule.id(), schedule.clone());
        Ok(())
    }

    async fn schedules_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Schedule>> {
        let state = self.read()?;
        Ok(owned_by(&state.schedules, task_id, Schedule::task_id, |schedule| {
            (schedule.window().start(), schedule.id())
        }))
    }

    async fn active_schedules(&self) -> TaskRepositoryResult<Vec<ActiveWindow>> {
        let state = self.read()?;
        let windows = state
            .schedules
            .values()
            .filter_map(|schedule| {
                state
                    .tasks
                    .get(&schedule.task_id())
                    .filter(|task| task.state() == TaskState::Active)
                    .map(|task| ActiveWindow::new(task, schedule))
            })
            .collect();
        Ok(windows)
    }

    async fn store_note(&self, note: &Note) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_task(note.task_id())?;
        state.notes.insert(note.id(), note.clone());
        Ok(())
    }

    async fn notes_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Note>> {
        let state = self.read()?;
        Ok(owned_by(&state.notes, task_id, Note::task_id, |note| {
            (note.created_at(), note.id())
        }))
    }

    async fn store_report(&self, report: &Report) -> TaskRepositoryResult<()> {
        let mut state = self.write()?;
        state.ensure_task(report.task_id())?;
        state.reports.insert(report.id(), report.clone());
        Ok(())
    }

    async fn reports_for_task(&self, task_id: TaskId) -> TaskRepositoryResult<Vec<Report>> {
        let state = self.read()?;
        Ok(owned_by(&state.reports, task_id, Report::task_id, |report| {
            (report.created_at(), report.id())
        }))
    }
}
