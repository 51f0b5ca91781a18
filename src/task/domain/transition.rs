//! Task state transition table.
//!
//! Every permitted `(from, to)` pair is one row of [`TRANSITIONS`], paired
//! with the effect the transition has on the schedule conflict index and the
//! persisted schedules. Adding a state or a transition is a table edit.

use super::TaskState;

/// Side effect a transition has on the task's schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleEffect {
    /// Schedules are untouched.
    None,
    /// Schedules enter the conflict index.
    Enforce,
    /// Schedules leave the conflict index; persisted rows are kept.
    Release,
    /// Schedules leave the conflict index and persisted rows are deleted.
    ReleaseAndPurge,
    /// Persisted rows are deleted; the index holds nothing for the task.
    Purge,
}

/// Permitted transitions with their schedule effects.
pub const TRANSITIONS: [(TaskState, TaskState, ScheduleEffect); 7] = [
    (TaskState::Planned, TaskState::Active, ScheduleEffect::Enforce),
    (TaskState::Active, TaskState::Paused, ScheduleEffect::Release),
    (
        TaskState::Active,
        TaskState::Finished,
        ScheduleEffect::ReleaseAndPurge,
    ),
    (TaskState::Paused, TaskState::Active, ScheduleEffect::Enforce),
    (TaskState::Paused, TaskState::Finished, ScheduleEffect::Purge),
    (TaskState::Finished, TaskState::Archived, ScheduleEffect::None),
    (TaskState::Archived, TaskState::Finished, ScheduleEffect::None),
];

/// Looks up the effect of moving from `from` to `to`.
///
/// Returns `None` when the table has no such row. Same-state requests are
/// not table rows; callers treat them as no-ops.
#[must_use]
pub fn transition_effect(from: TaskState, to: TaskState) -> Option<ScheduleEffect> {
    TRANSITIONS
        .iter()
        .find(|(source, target, _)| *source == from && *target == to)
        .map(|(_, _, effect)| *effect)
}

impl TaskState {
    /// Returns whether the table permits moving from `self` to `target`.
    #[must_use]
    pub fn can_transition_to(self, target: Self) -> bool {
        transition_effect(self, target).is_some()
    }

    /// Returns every state reachable from `self` in table order.
    #[must_use]
    pub fn allowed_targets(self) -> Vec<Self> {
        TRANSITIONS
            .iter()
            .filter(|(source, _, _)| *source == self)
            .map(|(_, target, _)| *target)
            .collect()
    }
}

/// Renders states as `'a'`, `'a' and 'b'`, or `'a', 'b' and 'c'`.
pub(crate) fn describe_states(states: &[TaskState]) -> String {
    let quoted: Vec<String> = states.iter().map(|state| format!("'{state}'")).collect();
    match quoted.split_last() {
        None => String::new(),
        Some((last, [])) => last.clone(),
        Some((last, rest)) => format!("{} and {last}", rest.join(", ")),
    }
}
