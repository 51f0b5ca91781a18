//! Given steps for task scheduling BDD scenarios.

use super::world::{SchedulingWorld, parse_state, run_async, schedule_request};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use timebox::task::services::{CreateTaskRequest, TransitionTaskRequest};

fn create(world: &mut SchedulingWorld, request: CreateTaskRequest, title: String) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create_task(request))
        .wrap_err("create task in scenario setup")?;
    world.tasks.insert(title, created.id());
    Ok(())
}

#[given(r#"a task "{title}" scheduled on "{day}" from "{start}" to "{end}""#)]
fn scheduled_task(
    world: &mut SchedulingWorld,
    title: String,
    day: String,
    start: String,
    end: String,
) -> Result<(), eyre::Report> {
    let request =
        CreateTaskRequest::new(title.clone()).with_schedule(schedule_request(&day, &start, &end)?);
    create(world, request, title)
}

#[given(r#"a task "{title}" without schedules"#)]
fn unscheduled_task(world: &mut SchedulingWorld, title: String) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(title.clone());
    create(world, request, title)
}

#[given(r#"the task "{title}" has been transitioned to "{state}""#)]
fn task_has_been_transitioned(
    world: &mut SchedulingWorld,
    title: String,
    state: String,
) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    let target = parse_state(&state)?;
    run_async(
        world
            .service
            .transition_task(TransitionTaskRequest::new(task_id, target)),
    )
    .wrap_err("transition task in scenario setup")?;
    Ok(())
}

#[given(r#"the task "{title}" has a note "{note}""#)]
fn task_has_note(world: &mut SchedulingWorld, title: String, note: String) -> Result<(), eyre::Report> {
    let task_id = world.task_id(&title)?;
    run_async(world.service.attach_note(task_id, Some(note), "Written during the scenario"))
        .wrap_err("attach note in scenario setup")?;
    Ok(())
}
