//! In-memory repository contract tests.

use chrono::NaiveTime;
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use timebox::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Note, Report, Schedule, Task, TaskId, TaskState, TaskTitle, TimeWindow, Weekday, WeekdaySet},
    ports::{TaskRepository, TaskRepositoryError},
};

#[fixture]
fn repo() -> InMemoryTaskRepository {
    InMemoryTaskRepository::new()
}

fn task(title: &str) -> Task {
    Task::new(
        TaskTitle::new(title).expect("valid title"),
        None,
        "",
        &DefaultClock,
    )
}

fn schedule(owner: &Task, start: u32, end: u32) -> Schedule {
    let window = TimeWindow::new(
        NaiveTime::from_hms_opt(start, 0, 0).expect("valid start"),
        NaiveTime::from_hms_opt(end, 0, 0).expect("valid end"),
    )
    .expect("valid window");
    Schedule::new(owner.id(), window, WeekdaySet::from_days([Weekday::Mon])).expect("valid schedule")
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_task_is_rejected(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let stored = task("Once");
    repo.store(&stored).await?;

    let result = repo.store(&stored).await;

    eyre::ensure!(matches!(result, Err(TaskRepositoryError::DuplicateTask(id)) if id == stored.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn updating_unknown_task_reports_not_found(repo: InMemoryTaskRepository) {
    let missing = task("Missing");
    let result = repo.update(&missing).await;
    assert!(matches!(result, Err(TaskRepositoryError::NotFound(_))));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn schedules_require_an_owner(repo: InMemoryTaskRepository) {
    let orphan = task("Orphan");
    let result = repo.store_schedule(&schedule(&orphan, 9, 10)).await;
    assert!(matches!(result, Err(TaskRepositoryError::NotFound(id)) if id == orphan.id()));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn schedules_are_listed_by_start_time(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let owner = task("Owner");
    repo.store(&owner).await?;
    let late = schedule(&owner, 15, 16);
    let early = schedule(&owner, 7, 8);
    repo.store_schedule(&late).await?;
    repo.store_schedule(&early).await?;

    let listed = repo.schedules_for_task(owner.id()).await?;

    eyre::ensure!(listed == vec![early, late]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_and_purge_removes_only_that_tasks_schedules(
    repo: InMemoryTaskRepository,
) -> eyre::Result<()> {
    let finishing = task("Finishing");
    let other = task("Other");
    repo.store(&finishing).await?;
    repo.store(&other).await?;
    repo.store_schedule(&schedule(&finishing, 9, 10)).await?;
    repo.store_schedule(&schedule(&other, 9, 10)).await?;

    repo.update_and_purge_schedules(&finishing).await?;

    eyre::ensure!(repo.schedules_for_task(finishing.id()).await?.is_empty());
    eyre::ensure!(repo.schedules_for_task(other.id()).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn active_schedules_skip_inactive_tasks(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let mut active = task("Active");
    active.transition_to(TaskState::Active, &DefaultClock)?;
    let planned = task("Planned");
    repo.store(&active).await?;
    repo.store(&planned).await?;
    repo.store_schedule(&schedule(&active, 9, 10)).await?;
    repo.store_schedule(&schedule(&planned, 11, 12)).await?;

    let windows = repo.active_schedules().await?;

    eyre::ensure!(windows.len() == 1);
    eyre::ensure!(windows.iter().all(|window| window.task_id == active.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_cascades_to_attachments(repo: InMemoryTaskRepository) -> eyre::Result<()> {
    let doomed = task("Doomed");
    let survivor = task("Survivor");
    repo.store(&doomed).await?;
    repo.store(&survivor).await?;
    repo.store_schedule(&schedule(&doomed, 9, 10)).await?;
    repo.store_note(&Note::new(doomed.id(), None, "bye", &DefaultClock)).await?;
    repo.store_report(&Report::new(doomed.id(), "done", &DefaultClock)).await?;
    repo.store_note(&Note::new(survivor.id(), None, "stay", &DefaultClock)).await?;

    repo.delete(doomed.id()).await?;

    eyre::ensure!(repo.find_by_id(doomed.id()).await?.is_none());
    eyre::ensure!(repo.schedules_for_task(doomed.id()).await?.is_empty());
    eyre::ensure!(repo.notes_for_task(doomed.id()).await?.is_empty());
    eyre::ensure!(repo.reports_for_task(doomed.id()).await?.is_empty());
    eyre::ensure!(repo.notes_for_task(survivor.id()).await?.len() == 1);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn deleting_unknown_task_reports_not_found(repo: InMemoryTaskRepository) {
    let result = repo.delete(TaskId::new()).await;
    assert!(matches!(result, Err(TaskRepositoryError::NotFound(_))));
}
