//! Shared test helpers for in-memory integration tests.

use std::sync::Arc;

use chrono::NaiveTime;
use mockable::DefaultClock;
use rstest::fixture;
use timebox::{
    config::SchedulerConfig,
    task::{
        adapters::memory::InMemoryTaskRepository,
        domain::{TaskId, TaskState, Weekday},
        services::{
            CreateTaskRequest, ScheduleRequest, ScheduleStore, TaskLifecycleService,
            TransitionTaskRequest,
        },
    },
};

/// Service type wired to the in-memory repository.
pub type TestService = TaskLifecycleService<InMemoryTaskRepository, DefaultClock>;

/// Composition root for one test: the repository, the shared store and the
/// service built over both.
pub struct Scheduler {
    pub repository: Arc<InMemoryTaskRepository>,
    pub store: Arc<ScheduleStore>,
    pub service: TestService,
}

impl Scheduler {
    /// Wires a scheduler with `config` over `repository`.
    #[must_use]
    pub fn over(repository: Arc<InMemoryTaskRepository>, config: SchedulerConfig) -> Self {
        let store = Arc::new(ScheduleStore::new(config));
        let service = TaskLifecycleService::new(
            Arc::clone(&repository),
            Arc::clone(&store),
            Arc::new(DefaultClock),
        );
        Self {
            repository,
            store,
            service,
        }
    }
}

/// Provides a scheduler with default configuration.
#[fixture]
pub fn scheduler() -> Scheduler {
    Scheduler::over(
        Arc::new(InMemoryTaskRepository::new()),
        SchedulerConfig::default(),
    )
}

/// Builds a schedule request for whole hours on one weekday.
///
/// # Panics
///
/// Panics when an hour is outside `0..24`.
#[must_use]
pub fn hours(start: u32, end: u32, day: Weekday) -> ScheduleRequest {
    ScheduleRequest::new(
        NaiveTime::from_hms_opt(start, 0, 0).expect("valid start hour"),
        NaiveTime::from_hms_opt(end, 0, 0).expect("valid end hour"),
        [day],
    )
}

/// Creates a planned task with the given schedules.
///
/// # Errors
///
/// Returns an error when creation fails.
pub async fn create_task(
    service: &TestService,
    title: &str,
    schedules: Vec<ScheduleRequest>,
) -> eyre::Result<TaskId> {
    let request = schedules
        .into_iter()
        .fold(CreateTaskRequest::new(title), CreateTaskRequest::with_schedule);
    Ok(service.create_task(request).await?.id())
}

/// Creates a task and activates it.
///
/// # Errors
///
/// Returns an error when creation or activation fails.
pub async fn create_active_task(
    service: &TestService,
    title: &str,
    schedules: Vec<ScheduleRequest>,
) -> eyre::Result<TaskId> {
    let task_id = create_task(service, title, schedules).await?;
    transition(service, task_id, TaskState::Active).await?;
    Ok(task_id)
}

/// Moves a task to `state`.
///
/// # Errors
///
/// Returns an error when the transition is rejected.
pub async fn transition(service: &TestService, task_id: TaskId, state: TaskState) -> eyre::Result<()> {
    service
        .transition_task(TransitionTaskRequest::new(task_id, state))
        .await?;
    Ok(())
}
