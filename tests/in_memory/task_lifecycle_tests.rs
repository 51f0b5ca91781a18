//! In-memory integration tests for task lifecycle operations.

use std::sync::Arc;

use super::helpers::{
    Scheduler, create_active_task, create_task, hours, scheduler, transition,
};
use cap_std::{ambient_authority, fs_utf8::Dir};
use rstest::rstest;
use timebox::{
    config::{ConflictReporting, SchedulerConfig},
    task::{
        domain::{TaskConflict, TaskState, Weekday},
        services::{TaskLifecycleError, TransitionTaskRequest},
    },
};

fn schedule_conflicts(result: Result<impl Sized, TaskLifecycleError>) -> Option<usize> {
    match result {
        Err(TaskLifecycleError::Conflict(TaskConflict::ScheduleConflict { conflicts, .. })) => {
            Some(conflicts.len())
        }
        _ => None,
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_round_trip(scheduler: Scheduler) -> eyre::Result<()> {
    let Scheduler { store, service, .. } = scheduler;
    let task_id = create_task(&service, "Thesis", vec![hours(9, 11, Weekday::Tue)]).await?;

    for state in [
        TaskState::Active,
        TaskState::Paused,
        TaskState::Active,
        TaskState::Finished,
        TaskState::Archived,
        TaskState::Finished,
    ] {
        transition(&service, task_id, state).await?;
    }

    let stored = service
        .find_by_id(task_id)
        .await?
        .ok_or_else(|| eyre::eyre!("task should still exist"))?;
    eyre::ensure!(stored.state() == TaskState::Finished);
    eyre::ensure!(store.is_empty());
    eyre::ensure!(service.schedules_for(task_id).await?.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn paused_task_frees_its_windows_for_others(scheduler: Scheduler) -> eyre::Result<()> {
    let Scheduler { service, .. } = scheduler;
    let first = create_active_task(&service, "First", vec![hours(10, 12, Weekday::Mon)]).await?;
    let second = create_task(&service, "Second", vec![hours(11, 13, Weekday::Mon)]).await?;

    transition(&service, first, TaskState::Paused).await?;
    transition(&service, second, TaskState::Active).await?;

    let resumed = service
        .transition_task(TransitionTaskRequest::new(first, TaskState::Active))
        .await;
    eyre::ensure!(schedule_conflicts(resumed) == Some(1));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn schedule_attached_while_paused_is_enforced_on_resume(
    scheduler: Scheduler,
) -> eyre::Result<()> {
    let Scheduler { store, service, .. } = scheduler;
    let task_id = create_active_task(&service, "Growing", vec![hours(6, 7, Weekday::Sun)]).await?;
    transition(&service, task_id, TaskState::Paused).await?;

    service
        .attach_schedule(task_id, hours(20, 21, Weekday::Sun))
        .await?;
    transition(&service, task_id, TaskState::Active).await?;

    eyre::ensure!(store.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn restarted_store_rebuilds_from_persisted_active_tasks(
    scheduler: Scheduler,
) -> eyre::Result<()> {
    let Scheduler {
        repository,
        store,
        service,
    } = scheduler;
    create_active_task(&service, "Kept", vec![hours(10, 12, Weekday::Mon)]).await?;
    let paused = create_active_task(&service, "Resting", vec![hours(14, 15, Weekday::Mon)]).await?;
    transition(&service, paused, TaskState::Paused).await?;
    let before_restart = store.snapshot();

    let restarted = Scheduler::over(repository, SchedulerConfig::default());
    let loaded = restarted.service.initialize().await?;

    eyre::ensure!(loaded == 1);
    eyre::ensure!(restarted.store.snapshot() == before_restart);
    let clashing = create_task(&restarted.service, "Clash", vec![hours(11, 12, Weekday::Mon)]).await?;
    let result = restarted
        .service
        .transition_task(TransitionTaskRequest::new(clashing, TaskState::Active))
        .await;
    eyre::ensure!(schedule_conflicts(result) == Some(1));
    Ok(())
}

#[rstest]
#[case(ConflictReporting::PerSchedule, 2)]
#[case(ConflictReporting::FirstOnly, 1)]
#[tokio::test(flavor = "multi_thread")]
async fn conflict_reporting_follows_configuration(
    #[case] conflict_reporting: ConflictReporting,
    #[case] expected: usize,
) -> eyre::Result<()> {
    let Scheduler { service, .. } = Scheduler::over(
        Arc::default(),
        SchedulerConfig {
            conflict_reporting,
            log_index_contents: false,
        },
    );
    create_active_task(
        &service,
        "Holder",
        vec![hours(8, 9, Weekday::Fri), hours(15, 16, Weekday::Fri)],
    )
    .await?;
    let tested = create_task(
        &service,
        "Tested",
        vec![hours(8, 10, Weekday::Fri), hours(15, 17, Weekday::Fri)],
    )
    .await?;

    let result = service
        .transition_task(TransitionTaskRequest::new(tested, TaskState::Active))
        .await;

    eyre::ensure!(schedule_conflicts(result) == Some(expected));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn configuration_file_drives_the_store() -> eyre::Result<()> {
    let dir = Dir::open_ambient_dir(
        concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"),
        ambient_authority(),
    )?;
    let config = SchedulerConfig::load(&dir, "scheduler.toml")?;

    let Scheduler { store, .. } = Scheduler::over(Arc::default(), config);

    eyre::ensure!(store.config().conflict_reporting == ConflictReporting::FirstOnly);
    eyre::ensure!(store.config().log_index_contents);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn concurrent_activations_of_overlapping_tasks_admit_one(
    scheduler: Scheduler,
) -> eyre::Result<()> {
    let Scheduler { store, service, .. } = scheduler;
    let mut task_ids = Vec::new();
    for title in ["One", "Two", "Three", "Four"] {
        task_ids.push(create_task(&service, title, vec![hours(9, 10, Weekday::Wed)]).await?);
    }

    let handles: Vec<_> = task_ids
        .into_iter()
        .map(|task_id| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .transition_task(TransitionTaskRequest::new(task_id, TaskState::Active))
                    .await
            })
        })
        .collect();

    let mut activated = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await? {
            Ok(_) => activated += 1,
            Err(TaskLifecycleError::Conflict(TaskConflict::ScheduleConflict { .. })) => {
                rejected += 1;
            }
            Err(other) => return Err(other.into()),
        }
    }

    eyre::ensure!(activated == 1, "exactly one activation should win");
    eyre::ensure!(rejected == 3);
    eyre::ensure!(store.len() == 1);
    Ok(())
}
