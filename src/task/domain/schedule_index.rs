//! Ordered conflict index over the windows of active tasks.
//!
//! The index keeps every window twice: once ordered by start time and once
//! ordered by end time. A tested window `[s, e)` can only overlap entries
//! whose start is before `e` and whose end is after `s`, so conflict lookup
//! is two range scans and an intersection, followed by a weekday check.

use super::{
    ConflictRecord, Schedule, ScheduleId, Task, TaskConflict, TaskId, TaskTitle, TimeWindow,
    WeekdaySet,
};
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::ops::Bound;
use thiserror::Error;

/// How many conflict records a single activation check collects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictReporting {
    /// One record for every schedule of the task that has a hit.
    #[default]
    PerSchedule,
    /// Stop at the first schedule of the task that has a hit.
    FirstOnly,
}

/// Window held by the index, owned by an active task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    /// Indexed schedule.
    pub schedule_id: ScheduleId,
    /// Task owning the schedule.
    pub task_id: TaskId,
    /// Title of the owning task, reported in conflicts.
    pub task_title: TaskTitle,
    /// Time-of-day window.
    pub window: TimeWindow,
    /// Weekdays on which the window recurs.
    pub weekdays: WeekdaySet,
}

impl ActiveWindow {
    /// Builds the index entry for one schedule of `task`.
    #[must_use]
    pub fn new(task: &Task, schedule: &Schedule) -> Self {
        Self {
            schedule_id: schedule.id(),
            task_id: task.id(),
            task_title: task.title().clone(),
            window: schedule.window(),
            weekdays: schedule.weekdays(),
        }
    }
}

/// Reasons an activation cannot enter the index.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ActivationError {
    /// The task has no schedules to enforce.
    #[error("task {0} has no schedules")]
    MissingSchedules(TaskId),
    /// At least one schedule collides with a window in force.
    #[error("task {task_id} has {} conflicting schedule(s)", .conflicts.len())]
    Conflicts {
        /// Task being activated.
        task_id: TaskId,
        /// Collected conflict records.
        conflicts: Vec<ConflictRecord>,
    },
}

impl From<ActivationError> for TaskConflict {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::MissingSchedules(task_id) => Self::MissingSchedules { task_id },
            ActivationError::Conflicts { task_id, conflicts } => {
                Self::ScheduleConflict { task_id, conflicts }
            }
        }
    }
}

type TimeKey = (NaiveTime, ScheduleId);

/// Conflict index over the windows of active tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictIndex {
    windows: HashMap<ScheduleId, ActiveWindow>,
    by_start: BTreeSet<TimeKey>,
    by_end: BTreeSet<TimeKey>,
}

impl ConflictIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index holding `windows`.
    ///
    /// Windows are loaded as-is; persisted data is trusted not to conflict.
    ///
    /// # Panics
    ///
    /// Panics when two windows share a schedule identifier.
    #[must_use]
    pub fn from_windows(windows: impl IntoIterator<Item = ActiveWindow>) -> Self {
        let mut index = Self::new();
        for window in windows {
            index.insert(window);
        }
        index
    }

    /// Returns the number of indexed windows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Returns whether the index holds no window.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Returns whether the schedule is indexed.
    #[must_use]
    pub fn contains(&self, schedule_id: ScheduleId) -> bool {
        self.windows.contains_key(&schedule_id)
    }

    /// Returns the indexed windows ordered by start time.
    #[must_use]
    pub fn windows(&self) -> Vec<ActiveWindow> {
        self.by_start
            .iter()
            .filter_map(|(_, schedule_id)| self.windows.get(schedule_id))
            .cloned()
            .collect()
    }

    /// Finds a window in force that collides with `schedule`.
    ///
    /// Among several hits the one with the lowest task identifier, then
    /// schedule identifier, is reported.
    #[must_use]
    pub fn find_conflict(&self, schedule: &Schedule) -> Option<ConflictRecord> {
        let window = schedule.window();
        let starting_before_end: HashSet<ScheduleId> = self
            .by_start
            .range(..(window.end(), ScheduleId::MIN))
            .map(|(_, schedule_id)| *schedule_id)
            .collect();

        self.by_end
            .range((
                Bound::Excluded((window.start(), ScheduleId::MAX)),
                Bound::Unbounded,
            ))
            .filter(|(_, schedule_id)| starting_before_end.contains(schedule_id))
            .filter_map(|(_, schedule_id)| self.windows.get(schedule_id))
            .filter(|active| active.window.overlaps(window))
            .filter_map(|active| {
                let shared = active.weekdays.intersection(schedule.weekdays());
                (!shared.is_empty()).then_some((active, shared))
            })
            .min_by_key(|(active, _)| (active.task_id, active.schedule_id))
            .map(|(active, shared)| ConflictRecord {
                task_id: active.task_id,
                task_title: active.task_title.clone(),
                schedule_id: active.schedule_id,
                window: active.window,
                weekdays: shared,
                candidate: schedule.id(),
            })
    }

    /// Collects conflicts for every schedule of a task.
    #[must_use]
    pub fn find_conflicts(
        &self,
        schedules: &[Schedule],
        reporting: ConflictReporting,
    ) -> Vec<ConflictRecord> {
        let found = schedules
            .iter()
            .filter_map(|schedule| self.find_conflict(schedule));
        match reporting {
            ConflictReporting::PerSchedule => found.collect(),
            ConflictReporting::FirstOnly => found.take(1).collect(),
        }
    }

    /// Adds every schedule of `task`, or none of them.
    ///
    /// # Errors
    ///
    /// Returns [`ActivationError::MissingSchedules`] for an empty schedule set
    /// and [`ActivationError::Conflicts`] when any schedule collides with a
    /// window in force.
    ///
    /// # Panics
    ///
    /// Panics when a schedule belongs to another task or is already indexed.
    pub fn try_add_task(
        &mut self,
        task: &Task,
        schedules: &[Schedule],
        reporting: ConflictReporting,
    ) -> Result<(), ActivationError> {
        if schedules.is_empty() {
            return Err(ActivationError::MissingSchedules(task.id()));
        }
        assert_owned_by(task, schedules);

        let conflicts = self.find_conflicts(schedules, reporting);
        if !conflicts.is_empty() {
            return Err(ActivationError::Conflicts {
                task_id: task.id(),
                conflicts,
            });
        }

        for schedule in schedules {
            self.insert(ActiveWindow::new(task, schedule));
        }
        Ok(())
    }

    /// Removes every schedule of `task`.
    ///
    /// # Panics
    ///
    /// Panics when `schedules` is empty, when a schedule belongs to another
    /// task, or when a schedule is missing from either ordered index. Each of
    /// these means the index no longer mirrors the active tasks.
    pub fn remove_task(&mut self, task: &Task, schedules: &[Schedule]) {
        assert!(
            !schedules.is_empty(),
            "task {} left the conflict index without any schedule",
            task.id()
        );
        assert_owned_by(task, schedules);

        for schedule in schedules {
            self.remove(schedule.id());
        }
    }

    fn insert(&mut self, window: ActiveWindow) {
        let schedule_id = window.schedule_id;
        let start_added = self.by_start.insert((window.window.start(), schedule_id));
        let end_added = self.by_end.insert((window.window.end(), schedule_id));
        let previous = self.windows.insert(schedule_id, window);
        assert!(
            start_added && end_added && previous.is_none(),
            "schedule {schedule_id} is already in the conflict index"
        );
    }

    fn remove(&mut self, schedule_id: ScheduleId) {
        let Some(window) = self.windows.remove(&schedule_id) else {
            panic!("schedule {schedule_id} is missing from the conflict index");
        };
        let start_removed = self.by_start.remove(&(window.window.start(), schedule_id));
        let end_removed = self.by_end.remove(&(window.window.end(), schedule_id));
        assert!(
            start_removed && end_removed,
            "conflict index orderings disagree on schedule {schedule_id}"
        );
    }
}

fn assert_owned_by(task: &Task, schedules: &[Schedule]) {
    if let Some(stray) = schedules.iter().find(|s| s.task_id() != task.id()) {
        panic!(
            "schedule {} belongs to task {}, not {}",
            stray.id(),
            stray.task_id(),
            task.id()
        );
    }
}
