//! Shared world state for task scheduling BDD scenarios.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveTime;
use mockable::DefaultClock;
use rstest::fixture;
use timebox::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{TaskId, TaskState, Weekday},
    services::{ScheduleRequest, ScheduleStore, TaskLifecycleError, TaskLifecycleService},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

/// Scenario world for task scheduling behaviour tests.
pub struct SchedulingWorld {
    pub repository: Arc<InMemoryTaskRepository>,
    pub store: Arc<ScheduleStore>,
    pub service: TestTaskService,
    pub tasks: HashMap<String, TaskId>,
    pub last_result: Option<Result<(), TaskLifecycleError>>,
}

impl SchedulingWorld {
    /// Creates a world with an empty repository and schedule store.
    #[must_use]
    pub fn new() -> Self {
        let repository = Arc::new(InMemoryTaskRepository::new());
        let store = Arc::new(ScheduleStore::default());
        let service = TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::clone(&store),
            Arc::new(DefaultClock),
        );

        Self {
            repository,
            store,
            service,
            tasks: HashMap::new(),
            last_result: None,
        }
    }

    /// Looks up a task created earlier in the scenario by title.
    ///
    /// # Errors
    ///
    /// Returns an error when no task with `title` was created.
    pub fn task_id(&self, title: &str) -> Result<TaskId, eyre::Report> {
        self.tasks
            .get(title)
            .copied()
            .ok_or_else(|| eyre::eyre!("no task titled '{title}' in scenario world"))
    }
}

impl Default for SchedulingWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> SchedulingWorld {
    SchedulingWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

/// Parses a lifecycle state named in a scenario.
///
/// # Errors
///
/// Returns an error for unknown state names.
pub fn parse_state(state: &str) -> Result<TaskState, eyre::Report> {
    TaskState::try_from(state).map_err(|err| eyre::eyre!("invalid state in scenario: {err}"))
}

/// Parses a `HH:MM` time of day named in a scenario.
///
/// # Errors
///
/// Returns an error for malformed times.
pub fn parse_time(time: &str) -> Result<NaiveTime, eyre::Report> {
    NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|err| eyre::eyre!("invalid time '{time}' in scenario: {err}"))
}

/// Builds a schedule request from scenario text.
///
/// # Errors
///
/// Returns an error for unknown weekdays or malformed times.
pub fn schedule_request(day: &str, start: &str, end: &str) -> Result<ScheduleRequest, eyre::Report> {
    let weekday: Weekday = day
        .parse()
        .map_err(|_| eyre::eyre!("invalid weekday '{day}' in scenario"))?;
    Ok(ScheduleRequest::new(
        parse_time(start)?,
        parse_time(end)?,
        [weekday],
    ))
}
