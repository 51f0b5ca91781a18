//! Shared owner of the schedule conflict index.
//!
//! One store is constructed by the composition root and shared by `Arc`
//! between every consumer. All reads and writes go through a single mutex so
//! the two orderings inside [`ConflictIndex`] are never seen half-updated.
//! Nothing blocks while the lock is held.

use crate::config::SchedulerConfig;
use crate::task::{
    domain::{ActivationError, ActiveWindow, ConflictIndex, ConflictRecord, Schedule, Task},
    ports::{TaskRepository, TaskRepositoryResult},
};
use std::sync::{Mutex, MutexGuard};

/// In-memory index of the windows of every active task.
#[derive(Debug, Default)]
pub struct ScheduleStore {
    index: Mutex<ConflictIndex>,
    config: SchedulerConfig,
}

impl ScheduleStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            index: Mutex::new(ConflictIndex::new()),
            config,
        }
    }

    /// Returns the configuration the store was built with.
    #[must_use]
    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Replaces the index with the schedules of every active task.
    ///
    /// Callers must not run this concurrently with any mutation; the
    /// lifecycle service serializes it behind its gate.
    ///
    /// # Errors
    ///
    /// Returns repository errors; the index is unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics when the persisted data repeats a schedule identifier or the
    /// index lock is poisoned.
    pub async fn initialize<R>(&self, repository: &R) -> TaskRepositoryResult<usize>
    where
        R: TaskRepository + ?Sized,
    {
        let windows = repository.active_schedules().await?;
        let rebuilt = ConflictIndex::from_windows(windows);
        let count = rebuilt.len();
        if self.config.log_index_contents {
            for window in rebuilt.windows() {
                tracing::debug!(
                    task_id = %window.task_id,
                    schedule_id = %window.schedule_id,
                    window = %window.window,
                    weekdays = %window.weekdays,
                    "indexed active window"
                );
            }
        }
        *self.lock() = rebuilt;
        tracing::info!(windows = count, "schedule index initialized");
        Ok(count)
    }

    /// Rebuilds the index after a bulk reset.
    ///
    /// # Errors
    ///
    /// Returns repository errors; the index is unchanged in that case.
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`Self::initialize`].
    pub async fn reinitialize<R>(&self, repository: &R) -> TaskRepositoryResult<usize>
    where
        R: TaskRepository + ?Sized,
    {
        tracing::info!("schedule index reinitializing");
        self.initialize(repository).await
    }

    /// Adds all schedules of `task` to the index, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::MissingSchedules`] when `schedules` is empty
    /// and [`ActivationError::Conflicts`] when any schedule collides with a
    /// window in force.
    ///
    /// # Panics
    ///
    /// Panics when a schedule belongs to another task, is already indexed, or
    /// the index lock is poisoned.
    pub fn add_task_schedules(
        &self,
        task: &Task,
        schedules: &[Schedule],
    ) -> Result<(), ActivationError> {
        let outcome = self
            .lock()
            .try_add_task(task, schedules, self.config.conflict_reporting);
        match &outcome {
            Ok(()) => tracing::debug!(
                task_id = %task.id(),
                schedules = schedules.len(),
                "task schedules added to index"
            ),
            Err(ActivationError::Conflicts { conflicts, .. }) => {
                for conflict in conflicts {
                    tracing::warn!(
                        task_id = %task.id(),
                        candidate = %conflict.candidate,
                        conflicting_task = %conflict.task_id,
                        window = %conflict.window,
                        weekdays = %conflict.weekdays,
                        "schedule conflict detected"
                    );
                }
            }
            Err(ActivationError::MissingSchedules(_)) => {}
        }
        outcome
    }

    /// Removes all schedules of `task` from the index.
    ///
    /// # Panics
    ///
    /// Panics when `schedules` is empty, when any schedule is not indexed, or
    /// the index lock is poisoned; each means the index has diverged from the
    /// active tasks.
    pub fn remove_task_schedules(&self, task: &Task, schedules: &[Schedule]) {
        self.lock().remove_task(task, schedules);
        tracing::debug!(
            task_id = %task.id(),
            schedules = schedules.len(),
            "task schedules removed from index"
        );
    }

    /// Reports conflicts for `schedules` without changing the index.
    ///
    /// # Panics
    ///
    /// Panics when the index lock is poisoned.
    #[must_use]
    pub fn check_conflicts(&self, schedules: &[Schedule]) -> Vec<ConflictRecord> {
        self.lock()
            .find_conflicts(schedules, self.config.conflict_reporting)
    }

    /// Returns the indexed windows ordered by start time.
    ///
    /// # Panics
    ///
    /// Panics when the index lock is poisoned.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ActiveWindow> {
        self.lock().windows()
    }

    /// Returns the number of indexed windows.
    ///
    /// # Panics
    ///
    /// Panics when the index lock is poisoned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns whether no window is indexed.
    ///
    /// # Panics
    ///
    /// Panics when the index lock is poisoned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, ConflictIndex> {
        match self.index.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("schedule index lock poisoned by an earlier invariant violation"),
        }
    }
}
