//! Slot boundaries and the availability grid.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

use crate::{
    calendar::{CivilCalendar, weekday_number},
    clock_time,
    court::Court,
    training::Training,
};

/// Default slot length in minutes.
pub const DEFAULT_STEP_MINUTES: i32 = 30;

/// Slot boundaries from `start` to `end` in `step_minutes` increments.
///
/// Both ends are included when `end` falls on a step. Malformed labels, an
/// `end` before `start`, or a non-positive step yield an empty list.
pub fn generate_slots(start: &str, end: &str, step_minutes: i32) -> Vec<String> {
    let (Some(start), Some(end)) = (
        clock_time::parse_minutes(start),
        clock_time::parse_minutes(end),
    ) else {
        return Vec::new();
    };
    if step_minutes <= 0 || end < start {
        return Vec::new();
    }

    (start..=end)
        .step_by(step_minutes as usize)
        .map(clock_time::format_minutes)
        .collect()
}

/// One bookable cell of the availability grid. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSlot {
    pub court_id: String,
    pub court_name: String,
    pub start_time: String,
    pub end_time: String,
    pub date: DateTime<Utc>,
    available: bool,
    training: Option<Training>,
}

impl TimeSlot {
    pub fn new(
        court_id: impl Into<String>,
        court_name: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            court_id: court_id.into(),
            court_name: court_name.into(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            date,
            available: true,
            training: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn training(&self) -> Option<&Training> {
        self.training.as_ref()
    }

    /// Occupy the slot with `training`, or free it with `None`.
    pub fn attach_training(&mut self, training: Option<Training>) {
        self.available = training.is_none();
        self.training = training;
    }

    pub fn start_minutes(&self) -> i32 {
        clock_time::to_minutes(&self.start_time)
    }

    pub fn end_minutes(&self) -> i32 {
        clock_time::to_minutes(&self.end_time)
    }

    /// Whether `candidate` occupies any part of this slot: same court, same
    /// civil day, overlapping half-open minute intervals. Abutting
    /// intervals do not conflict.
    pub fn conflicts_with_training(&self, candidate: &Training, calendar: &CivilCalendar) -> bool {
        if self.court_id != candidate.court_id {
            return false;
        }
        if !calendar.is_same_day(&self.date, &candidate.date) {
            return false;
        }
        clock_time::intervals_overlap(
            self.start_minutes(),
            self.end_minutes(),
            candidate.start_minutes(),
            candidate.end_minutes(),
        )
    }
}

/// Build the availability grid for `court` over `days` consecutive days
/// starting at `from`.
///
/// Each active day is cut into `step_minutes` slots between its opening and
/// closing labels; closed days contribute nothing. A slot is occupied by
/// the first of `trainings` that conflicts with it.
pub fn build_availability_grid(
    court: &Court,
    from: NaiveDate,
    days: u32,
    step_minutes: i32,
    trainings: &[Training],
    calendar: &CivilCalendar,
) -> Vec<TimeSlot> {
    let mut grid = Vec::new();
    if !court.available {
        return grid;
    }

    for offset in 0..i64::from(days) {
        let date = from + Duration::days(offset);
        let schedule = court.schedule_for_day(weekday_number(date.weekday()));
        if !schedule.is_active() {
            continue;
        }

        let day_start = calendar.start_of_day(date);
        let boundaries = generate_slots(&schedule.opens, &schedule.closes, step_minutes);
        for pair in boundaries.windows(2) {
            let mut slot = TimeSlot::new(
                court.id.clone(),
                court.name.clone(),
                pair[0].clone(),
                pair[1].clone(),
                day_start,
            );
            let occupant = trainings
                .iter()
                .find(|t| slot.conflicts_with_training(t, calendar))
                .cloned();
            slot.attach_training(occupant);
            grid.push(slot);
        }
    }

    tracing::debug!(
        "Built availability grid for court '{}': {} slot(s), {} free",
        court.id,
        grid.len(),
        grid.iter().filter(|s| s.is_available()).count()
    );
    grid
}
