use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};

use crate::clock_time;

/// Opening time used whenever a weekday has no explicit schedule.
pub const DEFAULT_OPENS: &str = "08:00";
/// Closing time used whenever a weekday has no explicit schedule.
pub const DEFAULT_CLOSES: &str = "22:00";

/// Label returned by [`DaySchedule`]'s `Display` when the day is closed.
pub const CLOSED_LABEL: &str = "Closed";

/// Opening hours of a court on one weekday.
///
/// When `active` is false the hours are kept but ignored. Hours are stored as
/// given; reversed or malformed labels are not rejected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySchedule {
    pub active: bool,
    pub opens: String,
    pub closes: String,
}

impl DaySchedule {
    pub fn new(active: bool, opens: impl Into<String>, closes: impl Into<String>) -> Self {
        Self {
            active,
            opens: opens.into(),
            closes: closes.into(),
        }
    }

    /// The schedule a court falls back to for a weekday that was never set:
    /// open 08:00-22:00.
    pub fn fallback() -> Self {
        Self::new(true, DEFAULT_OPENS, DEFAULT_CLOSES)
    }

    /// A closed day that keeps the given hours for later re-activation.
    pub fn closed(opens: impl Into<String>, closes: impl Into<String>) -> Self {
        Self::new(false, opens, closes)
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn set_opens(&mut self, opens: impl Into<String>) {
        self.opens = opens.into();
    }

    pub fn set_closes(&mut self, closes: impl Into<String>) {
        self.closes = closes.into();
    }

    pub fn opens_minutes(&self) -> i32 {
        clock_time::to_minutes(&self.opens)
    }

    pub fn closes_minutes(&self) -> i32 {
        clock_time::to_minutes(&self.closes)
    }

    /// Whether the court is open at `minute` (minutes since midnight).
    ///
    /// Closed days are never open. Reversed hours never match.
    pub fn is_open_at(&self, minute: i32) -> bool {
        self.active && (self.opens_minutes()..self.closes_minutes()).contains(&minute)
    }
}

/// Inactive, 08:00-22:00.
impl Default for DaySchedule {
    fn default() -> Self {
        Self::closed(DEFAULT_OPENS, DEFAULT_CLOSES)
    }
}

impl fmt::Display for DaySchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.active {
            write!(f, "{} - {}", self.opens, self.closes)
        } else {
            f.write_str(CLOSED_LABEL)
        }
    }
}

/// Seven per-weekday schedules, indexed 1=Sunday..7=Saturday.
///
/// A slot that was never set (or was cleared) reads back as
/// [`DaySchedule::fallback`]. Serialized as a map keyed by the weekday
/// number as a string, which is also the shape of the bulk accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, DaySchedule>",
    into = "BTreeMap<String, DaySchedule>"
)]
pub struct WeeklySchedule {
    days: [Option<DaySchedule>; 7],
}

impl WeeklySchedule {
    /// A schedule with nothing set; every day reads as the fallback.
    pub fn new() -> Self {
        Self::default()
    }

    /// The same schedule on all seven days.
    pub fn uniform(day: DaySchedule) -> Self {
        Self {
            days: std::array::from_fn(|_| Some(day.clone())),
        }
    }

    fn index(weekday: i32) -> Option<usize> {
        if (1..=7).contains(&weekday) {
            Some((weekday - 1) as usize)
        } else {
            None
        }
    }

    /// Schedule for `weekday` (1=Sunday..7=Saturday).
    ///
    /// Out-of-range weekdays and unset days return the fallback.
    pub fn for_day(&self, weekday: i32) -> DaySchedule {
        Self::index(weekday)
            .and_then(|i| self.days[i].clone())
            .unwrap_or_else(DaySchedule::fallback)
    }

    /// Whether `weekday` has an explicitly stored schedule.
    pub fn is_set(&self, weekday: i32) -> bool {
        Self::index(weekday).is_some_and(|i| self.days[i].is_some())
    }

    /// True when no weekday has been set.
    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Option::is_none)
    }

    /// Store a schedule for `weekday`. Ignored for weekdays outside 1..=7.
    pub fn set_day(&mut self, weekday: i32, schedule: DaySchedule) {
        if let Some(i) = Self::index(weekday) {
            self.days[i] = Some(schedule);
        }
    }

    /// Forget the stored schedule for `weekday`, so it reads as the fallback.
    pub fn clear_day(&mut self, weekday: i32) {
        if let Some(i) = Self::index(weekday) {
            self.days[i] = None;
        }
    }

    pub fn is_active_on(&self, weekday: i32) -> bool {
        self.for_day(weekday).is_active()
    }

    /// Whether the court is open at `minute` on `weekday`.
    pub fn is_open_at(&self, weekday: i32, minute: i32) -> bool {
        self.for_day(weekday).is_open_at(minute)
    }

    /// All seven resolved schedules keyed by weekday number ("1".."7").
    ///
    /// Unset days appear with their fallback value.
    pub fn to_map(&self) -> BTreeMap<String, DaySchedule> {
        (1..=7).map(|d| (d.to_string(), self.for_day(d))).collect()
    }

    /// Replace all seven days from a weekday-keyed map.
    ///
    /// A weekday missing from the map is cleared, which reads back as the
    /// fallback. Keys that are not "1".."7" are ignored.
    pub fn set_from_map(&mut self, map: &BTreeMap<String, DaySchedule>) {
        for weekday in 1..=7 {
            match map.get(&weekday.to_string()) {
                Some(day) => self.set_day(weekday, day.clone()),
                None => self.clear_day(weekday),
            }
        }
    }

    /// Weekdays (1..=7) on which the court is open.
    pub fn active_days(&self) -> Vec<i32> {
        (1..=7).filter(|&d| self.is_active_on(d)).collect()
    }
}

impl From<BTreeMap<String, DaySchedule>> for WeeklySchedule {
    fn from(map: BTreeMap<String, DaySchedule>) -> Self {
        let mut schedule = WeeklySchedule::new();
        schedule.set_from_map(&map);
        schedule
    }
}

impl From<WeeklySchedule> for BTreeMap<String, DaySchedule> {
    fn from(schedule: WeeklySchedule) -> Self {
        schedule
            .days
            .iter()
            .enumerate()
            .filter_map(|(i, day)| day.clone().map(|d| ((i + 1).to_string(), d)))
            .collect()
    }
}
