//! The single civil timezone used for every day-boundary and weekday
//! computation.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc, Weekday};

use crate::config::CalendarConfig;

/// English weekday labels indexed by weekday number - 1 (1=Sunday).
const WEEKDAY_LABELS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Label for a weekday number (1=Sunday..7=Saturday).
pub fn weekday_label(weekday: i32) -> &'static str {
    usize::try_from(weekday - 1)
        .ok()
        .and_then(|i| WEEKDAY_LABELS.get(i))
        .copied()
        .unwrap_or("Unknown")
}

/// Weekday number (1=Sunday..7=Saturday) for a chrono weekday.
pub fn weekday_number(weekday: Weekday) -> i32 {
    weekday.number_from_sunday() as i32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilCalendar {
    offset: FixedOffset,
}

impl CivilCalendar {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    /// Build from configuration. Offsets beyond ±24h fall back to UTC.
    pub fn from_config(config: &CalendarConfig) -> Self {
        let offset = config
            .utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(
                    "Invalid UTC offset of {} minutes, using UTC",
                    config.utc_offset_minutes
                );
                utc_offset()
            });
        Self::new(offset)
    }

    pub fn utc() -> Self {
        Self::new(utc_offset())
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Civil calendar date of an instant.
    pub fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Same civil day: equal year and day-of-year once resolved in this
    /// timezone.
    pub fn is_same_day(&self, a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        let (a, b) = (self.date_of(a), self.date_of(b));
        a.year() == b.year() && a.ordinal() == b.ordinal()
    }

    /// Weekday number (1=Sunday..7=Saturday) of an instant.
    pub fn weekday_of(&self, instant: &DateTime<Utc>) -> i32 {
        weekday_number(self.date_of(instant).weekday())
    }

    /// Weekday label ("Monday", ...) of an instant.
    pub fn weekday_label_of(&self, instant: &DateTime<Utc>) -> &'static str {
        weekday_label(self.weekday_of(instant))
    }

    /// Midnight at the start of `date`, as an instant.
    pub fn start_of_day(&self, date: NaiveDate) -> DateTime<Utc> {
        // A fixed offset has no gaps or folds.
        Utc.from_utc_datetime(&(date.and_time(NaiveTime::MIN) - self.offset))
    }
}

impl Default for CivilCalendar {
    fn default() -> Self {
        Self::utc()
    }
}

fn utc_offset() -> FixedOffset {
    Utc.fix()
}
