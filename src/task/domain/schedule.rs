//! Recurring weekly schedule windows attached to tasks.

use super::{ScheduleId, TaskDomainError, TaskId};
pub use chrono::Weekday;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Days of the week in Monday-first order.
pub const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Set of weekday flags, one bit per day starting at Monday.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Weekday>", from = "Vec<Weekday>")]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    /// Set with no day flagged.
    pub const EMPTY: Self = Self(0);

    /// Returns a set holding the given days.
    #[must_use]
    pub fn from_days(days: impl IntoIterator<Item = Weekday>) -> Self {
        days.into_iter().fold(Self::EMPTY, Self::with)
    }

    /// Returns a copy of the set with `day` flagged.
    #[must_use]
    pub const fn with(self, day: Weekday) -> Self {
        Self(self.0 | bit(day))
    }

    /// Returns whether `day` is flagged.
    #[must_use]
    pub const fn contains(self, day: Weekday) -> bool {
        self.0 & bit(day) != 0
    }

    /// Returns whether no day is flagged.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the number of flagged days.
    #[must_use]
    pub const fn len(self) -> u32 {
        self.0.count_ones()
    }

    /// Returns the days flagged in both sets.
    #[must_use]
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Iterates over flagged days in Monday-first order.
    pub fn iter(self) -> impl Iterator<Item = Weekday> {
        ALL_WEEKDAYS.into_iter().filter(move |day| self.contains(*day))
    }
}

const fn bit(day: Weekday) -> u8 {
    1 << day.num_days_from_monday()
}

impl From<Vec<Weekday>> for WeekdaySet {
    fn from(days: Vec<Weekday>) -> Self {
        Self::from_days(days)
    }
}

impl From<WeekdaySet> for Vec<Weekday> {
    fn from(set: WeekdaySet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Weekday> for WeekdaySet {
    fn from_iter<I: IntoIterator<Item = Weekday>>(iter: I) -> Self {
        Self::from_days(iter)
    }
}

impl fmt::Display for WeekdaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(weekday_name).collect();
        f.write_str(&names.join(", "))
    }
}

/// Returns the full English name of a weekday.
#[must_use]
pub const fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Half-open time-of-day interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimeWindow")]
pub struct TimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

#[derive(Deserialize)]
struct RawTimeWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TryFrom<RawTimeWindow> for TimeWindow {
    type Error = TaskDomainError;

    fn try_from(raw: RawTimeWindow) -> Result<Self, Self::Error> {
        Self::new(raw.start, raw.end)
    }
}

impl TimeWindow {
    /// Creates a validated time window.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTimeWindow`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, TaskDomainError> {
        if start >= end {
            return Err(TaskDomainError::InvalidTimeWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Returns the inclusive start time.
    #[must_use]
    pub const fn start(self) -> NaiveTime {
        self.start
    }

    /// Returns the exclusive end time.
    #[must_use]
    pub const fn end(self) -> NaiveTime {
        self.end
    }

    /// Returns whether the two half-open intervals share any instant.
    #[must_use]
    pub fn overlaps(self, other: Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}",
            self.start.format("%H:%M"),
            self.end.format("%H:%M")
        )
    }
}

/// Recurring weekly window owned by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchedule")]
pub struct Schedule {
    id: ScheduleId,
    task_id: TaskId,
    window: TimeWindow,
    weekdays: WeekdaySet,
}

#[derive(Deserialize)]
struct RawSchedule {
    id: ScheduleId,
    task_id: TaskId,
    window: TimeWindow,
    weekdays: WeekdaySet,
}

impl TryFrom<RawSchedule> for Schedule {
    type Error = TaskDomainError;

    fn try_from(raw: RawSchedule) -> Result<Self, Self::Error> {
        Self::from_parts(raw.id, raw.task_id, raw.window, raw.weekdays)
    }
}

impl Schedule {
    /// Creates a new schedule for `task_id`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoWeekdays`] when `weekdays` is empty.
    pub fn new(
        task_id: TaskId,
        window: TimeWindow,
        weekdays: WeekdaySet,
    ) -> Result<Self, TaskDomainError> {
        Self::from_parts(ScheduleId::new(), task_id, window, weekdays)
    }

    /// Reconstructs a schedule from stored parts, re-checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::NoWeekdays`] when `weekdays` is empty.
    pub const fn from_parts(
        id: ScheduleId,
        task_id: TaskId,
        window: TimeWindow,
        weekdays: WeekdaySet,
    ) -> Result<Self, TaskDomainError> {
        if weekdays.is_empty() {
            return Err(TaskDomainError::NoWeekdays);
        }
        Ok(Self {
            id,
            task_id,
            window,
            weekdays,
        })
    }

    /// Returns the schedule identifier.
    #[must_use]
    pub const fn id(&self) -> ScheduleId {
        self.id
    }

    /// Returns the owning task identifier.
    #[must_use]
    pub const fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Returns the time-of-day window.
    #[must_use]
    pub const fn window(&self) -> TimeWindow {
        self.window
    }

    /// Returns the weekdays on which the window recurs.
    #[must_use]
    pub const fn weekdays(&self) -> WeekdaySet {
        self.weekdays
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.window, self.weekdays)
    }
}
