//! Summaries over an availability grid.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::{calendar::CivilCalendar, clock_time, slots::TimeSlot};

/// How much of one day's opening hours is booked.
#[derive(Debug, Clone, PartialEq)]
pub struct DayUtilization {
    pub date: NaiveDate,
    pub total_slots: usize,
    pub free_slots: usize,
    pub open_minutes: i32,
    pub booked_minutes: i32,
}

impl DayUtilization {
    /// Share of open minutes that are booked, 0-100.
    pub fn percent_booked(&self) -> f64 {
        if self.open_minutes <= 0 {
            return 0.0;
        }
        f64::from(self.booked_minutes) / f64::from(self.open_minutes) * 100.0
    }

    pub fn is_fully_booked(&self) -> bool {
        self.total_slots > 0 && self.free_slots == 0
    }
}

/// A run of consecutive free slots on one day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreeWindow {
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
}

impl FreeWindow {
    pub fn duration_minutes(&self) -> i32 {
        clock_time::minutes_between(&self.start_time, &self.end_time)
    }
}

/// Per-day utilization of a grid, ordered by date.
pub fn utilization_by_day(grid: &[TimeSlot], calendar: &CivilCalendar) -> Vec<DayUtilization> {
    let mut days: BTreeMap<NaiveDate, DayUtilization> = BTreeMap::new();

    for slot in grid {
        let date = calendar.date_of(&slot.date);
        let minutes = slot.end_minutes() - slot.start_minutes();
        let day = days.entry(date).or_insert_with(|| DayUtilization {
            date,
            total_slots: 0,
            free_slots: 0,
            open_minutes: 0,
            booked_minutes: 0,
        });

        day.total_slots += 1;
        day.open_minutes += minutes;
        if slot.is_available() {
            day.free_slots += 1;
        } else {
            day.booked_minutes += minutes;
        }
    }

    days.into_values().collect()
}

/// Merge consecutive free slots into windows of at least `min_minutes`.
///
/// Slots are expected in grid order (by date, then start time). Two free
/// slots join when the first ends where the second starts on the same day.
pub fn find_free_windows(
    grid: &[TimeSlot],
    calendar: &CivilCalendar,
    min_minutes: i32,
) -> Vec<FreeWindow> {
    let mut windows = Vec::new();
    let mut current: Option<FreeWindow> = None;

    for slot in grid {
        let date = calendar.date_of(&slot.date);

        if !slot.is_available() {
            if let Some(window) = current.take() {
                push_if_long_enough(&mut windows, window, min_minutes);
            }
            continue;
        }

        match current.as_mut() {
            Some(window) if window.date == date && window.end_time == slot.start_time => {
                window.end_time = slot.end_time.clone();
            }
            _ => {
                if let Some(window) = current.take() {
                    push_if_long_enough(&mut windows, window, min_minutes);
                }
                current = Some(FreeWindow {
                    date,
                    start_time: slot.start_time.clone(),
                    end_time: slot.end_time.clone(),
                });
            }
        }
    }

    // Handle window extending to the last slot
    if let Some(window) = current {
        push_if_long_enough(&mut windows, window, min_minutes);
    }

    windows
}

fn push_if_long_enough(windows: &mut Vec<FreeWindow>, window: FreeWindow, min_minutes: i32) {
    if window.duration_minutes() >= min_minutes {
        windows.push(window);
    }
}
