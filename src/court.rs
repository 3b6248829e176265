use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    calendar::weekday_number,
    schedule::{DEFAULT_CLOSES, DEFAULT_OPENS, DaySchedule, WeeklySchedule},
};

/// A bookable court and its weekly opening hours.
///
/// `opening_hour`, `closing_hour` and `active_days_csv` only exist so older
/// records that predate per-day schedules can still be read; see
/// [`Court::upgrade_legacy`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: String,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub weekly_schedule: WeeklySchedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closing_hour: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_days_csv: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_available() -> bool {
    true
}

impl Court {
    /// A court open 08:00-22:00 every day.
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::with_schedule(
            name,
            location,
            WeeklySchedule::uniform(DaySchedule::fallback()),
        )
    }

    /// A court open every day between `opens` and `closes`.
    ///
    /// The hours are also recorded in the legacy fields so older readers
    /// see the same opening times.
    pub fn with_hours(
        name: impl Into<String>,
        location: impl Into<String>,
        opens: impl Into<String>,
        closes: impl Into<String>,
    ) -> Self {
        let (opens, closes) = (opens.into(), closes.into());
        let mut court = Self::with_schedule(
            name,
            location,
            WeeklySchedule::uniform(DaySchedule::new(true, opens.clone(), closes.clone())),
        );
        court.opening_hour = Some(opens);
        court.closing_hour = Some(closes);
        court.active_days_csv = Some("1,2,3,4,5,6,7".to_string());
        court
    }

    pub fn with_schedule(
        name: impl Into<String>,
        location: impl Into<String>,
        weekly_schedule: WeeklySchedule,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            location: location.into(),
            available: true,
            weekly_schedule,
            opening_hour: None,
            closing_hour: None,
            active_days_csv: None,
            created_at: None,
        }
    }

    /// Schedule for `weekday` (1=Sunday..7=Saturday), or the 08:00-22:00
    /// fallback when unset or out of range.
    pub fn schedule_for_day(&self, weekday: i32) -> DaySchedule {
        self.weekly_schedule.for_day(weekday)
    }

    /// Ignored for weekdays outside 1..=7. Writing a per-day schedule
    /// drops the legacy hour fields.
    pub fn set_schedule_for_day(&mut self, weekday: i32, schedule: DaySchedule) {
        if (1..=7).contains(&weekday) {
            self.clear_legacy_hours();
        }
        self.weekly_schedule.set_day(weekday, schedule);
    }

    pub fn is_active_on_day(&self, weekday: i32) -> bool {
        self.weekly_schedule.is_active_on(weekday)
    }

    pub fn weekly_schedule_map(&self) -> BTreeMap<String, DaySchedule> {
        self.weekly_schedule.to_map()
    }

    /// Replace every weekday from `map`; weekdays missing from it are
    /// cleared and read back as the fallback. The legacy hour fields are
    /// dropped so a stored copy reads back the same way.
    pub fn set_weekly_schedule_map(&mut self, map: &BTreeMap<String, DaySchedule>) {
        self.clear_legacy_hours();
        self.weekly_schedule.set_from_map(map);
    }

    pub fn schedule_for_date(&self, date: NaiveDate) -> DaySchedule {
        self.schedule_for_day(weekday_number(date.weekday()))
    }

    /// Bookable on `date`: the court is available and that weekday is active.
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.available && self.schedule_for_date(date).is_active()
    }

    /// Bookable at `minute` on `date`.
    pub fn is_open_at(&self, date: NaiveDate, minute: i32) -> bool {
        self.available && self.schedule_for_date(date).is_open_at(minute)
    }

    pub fn has_legacy_hours(&self) -> bool {
        self.opening_hour.is_some() || self.closing_hour.is_some() || self.active_days_csv.is_some()
    }

    fn clear_legacy_hours(&mut self) {
        self.opening_hour = None;
        self.closing_hour = None;
        self.active_days_csv = None;
    }

    /// Build the per-day schedule of a record that only has the legacy
    /// scalar fields.
    ///
    /// `active_days_csv` lists weekday numbers (1=Sunday..7=Saturday);
    /// when absent every day is active. Missing hours use 08:00-22:00.
    /// Records that already carry any per-day schedule are left alone, so
    /// a cleared weekday keeps reading as the fallback. Returns how many
    /// weekdays were filled.
    pub fn upgrade_legacy(&mut self) -> usize {
        if !self.has_legacy_hours() || !self.weekly_schedule.is_empty() {
            return 0;
        }

        let active_days = self.active_days_csv.as_deref().map(parse_active_days);
        let opens = self.opening_hour.as_deref().unwrap_or(DEFAULT_OPENS);
        let closes = self.closing_hour.as_deref().unwrap_or(DEFAULT_CLOSES);

        let mut filled = 0;
        for weekday in 1..=7 {
            let active = active_days
                .as_ref()
                .is_none_or(|days| days.contains(&weekday));
            self.weekly_schedule
                .set_day(weekday, DaySchedule::new(active, opens, closes));
            filled += 1;
        }

        if filled > 0 {
            tracing::debug!(
                "Upgraded court '{}' from legacy hours: {} day(s) filled",
                self.id,
                filled
            );
        }
        filled
    }
}

/// Weekday numbers from a comma-separated list; tokens that are not a
/// weekday number are skipped.
fn parse_active_days(csv: &str) -> Vec<i32> {
    csv.split(',')
        .filter_map(|token| token.trim().parse::<i32>().ok())
        .filter(|d| (1..=7).contains(d))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_new_court_open_every_day_with_default_hours() {
        let court = Court::new("Center Court", "North Hall");
        for d in 1..=7 {
            assert_eq!(court.schedule_for_day(d), DaySchedule::fallback());
            assert!(court.is_active_on_day(d));
        }
        assert!(court.available);
        assert!(!court.has_legacy_hours());
    }

    #[test]
    fn test_with_hours_populates_all_days_and_legacy_fields() {
        let court = Court::with_hours("Court 2", "Sports Hall", "07:00", "23:00");
        for d in 1..=7 {
            assert_eq!(court.schedule_for_day(d), DaySchedule::new(true, "07:00", "23:00"));
        }
        assert_eq!(court.opening_hour.as_deref(), Some("07:00"));
        assert_eq!(court.closing_hour.as_deref(), Some("23:00"));
    }

    #[test]
    fn test_unconfigured_court_reads_default() {
        let court = Court::with_schedule("Court 3", "", WeeklySchedule::new());
        for d in 1..=7 {
            let day = court.schedule_for_day(d);
            assert!(day.is_active());
            assert_eq!(day.opens, "08:00");
            assert_eq!(day.closes, "22:00");
        }
    }

    #[test]
    fn test_set_schedule_out_of_range_is_ignored() {
        let mut court = Court::with_hours("Court", "", "10:00", "12:00");
        let before = court.weekly_schedule_map();
        court.set_schedule_for_day(0, DaySchedule::closed("00:00", "00:00"));
        court.set_schedule_for_day(9, DaySchedule::closed("00:00", "00:00"));
        assert_eq!(court.weekly_schedule_map(), before);
        assert_eq!(court.schedule_for_day(9), DaySchedule::fallback());
    }

    #[test]
    fn test_is_open_on_date_respects_closed_day() {
        let mut court = Court::new("Court", "");
        // 2024-06-16 is a Sunday (weekday 1)
        court.set_schedule_for_day(1, DaySchedule::closed("08:00", "22:00"));
        assert!(!court.is_open_on(date(2024, 6, 16)));
        assert!(court.is_open_on(date(2024, 6, 17)));
        assert!(!court.is_open_at(date(2024, 6, 16), 600));
        assert!(court.is_open_at(date(2024, 6, 17), 600));
    }

    #[test]
    fn test_unavailable_court_is_never_open() {
        let mut court = Court::new("Court", "");
        court.available = false;
        assert!(!court.is_open_on(date(2024, 6, 17)));
    }

    #[test]
    fn test_bulk_map_replacement() {
        let mut court = Court::with_hours("Court", "", "10:00", "12:00");
        let mut map = BTreeMap::new();
        map.insert("4".to_string(), DaySchedule::closed("10:00", "12:00"));
        court.set_weekly_schedule_map(&map);

        assert!(!court.is_active_on_day(4));
        assert_eq!(court.schedule_for_day(5), DaySchedule::fallback());
    }

    #[test]
    fn test_upgrade_legacy_fills_every_day() {
        let mut court = Court::with_schedule("Old Court", "", WeeklySchedule::new());
        court.opening_hour = Some("09:00".to_string());
        court.closing_hour = Some("18:00".to_string());
        court.active_days_csv = Some("2, 3,4,5,6,x".to_string());

        let filled = court.upgrade_legacy();
        assert_eq!(filled, 7);
        assert!(!court.is_active_on_day(1));
        assert!(!court.is_active_on_day(7));
        assert_eq!(court.schedule_for_day(2), DaySchedule::new(true, "09:00", "18:00"));
    }

    #[test]
    fn test_upgrade_legacy_skips_records_with_per_day_schedule() {
        let mut court = Court::with_schedule("Court", "", WeeklySchedule::new());
        court
            .weekly_schedule
            .set_day(7, DaySchedule::new(true, "10:00", "14:00"));
        court.opening_hour = Some("09:00".to_string());
        court.closing_hour = Some("18:00".to_string());

        assert_eq!(court.upgrade_legacy(), 0);
        assert_eq!(court.schedule_for_day(7), DaySchedule::new(true, "10:00", "14:00"));
        assert_eq!(court.schedule_for_day(2), DaySchedule::fallback());
    }

    #[test]
    fn test_writing_per_day_schedule_drops_legacy_fields() {
        let mut court = Court::with_hours("Court", "", "10:00", "12:00");
        assert!(court.has_legacy_hours());
        court.set_schedule_for_day(2, DaySchedule::closed("10:00", "12:00"));
        assert!(!court.has_legacy_hours());

        let mut court = Court::with_hours("Court", "", "10:00", "12:00");
        court.set_schedule_for_day(0, DaySchedule::closed("10:00", "12:00"));
        assert!(court.has_legacy_hours());

        court.set_weekly_schedule_map(&BTreeMap::new());
        assert!(!court.has_legacy_hours());
        assert_eq!(court.upgrade_legacy(), 0);
        assert_eq!(court.schedule_for_day(3), DaySchedule::fallback());
    }

    #[test]
    fn test_upgrade_without_legacy_fields_is_noop() {
        let mut court = Court::with_schedule("Court", "", WeeklySchedule::new());
        assert_eq!(court.upgrade_legacy(), 0);
        assert!(!court.weekly_schedule.is_set(1));
    }

    #[test]
    fn test_deserialize_legacy_record() {
        let json = r#"{
            "id": "c9",
            "name": "Legacy",
            "openingHour": "07:00",
            "closingHour": "21:00"
        }"#;
        let mut court: Court = serde_json::from_str(json).unwrap();
        assert!(court.available);
        assert_eq!(court.schedule_for_day(3), DaySchedule::fallback());

        court.upgrade_legacy();
        assert_eq!(court.schedule_for_day(3), DaySchedule::new(true, "07:00", "21:00"));
    }
}
