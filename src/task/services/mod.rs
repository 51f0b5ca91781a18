//! Application services for task lifecycle orchestration.

mod lifecycle;
mod requests;
mod schedule_store;

pub use lifecycle::{TaskLifecycleError, TaskLifecycleResult, TaskLifecycleService};
pub use requests::{CreateTaskRequest, DeletionPolicy, ScheduleRequest, TransitionTaskRequest};
pub use schedule_store::ScheduleStore;
