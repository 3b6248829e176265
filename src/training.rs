use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{calendar::CivilCalendar, clock_time};

/// Default display color for a team without one.
pub const DEFAULT_TEAM_COLOR: &str = "#3F51B5";

/// A single dated training session on a court.
///
/// Team and court names are display copies taken at booking time and are
/// not kept in sync with the referenced records. `start_time`/`end_time`
/// are same-day clock labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Training {
    #[serde(default)]
    pub id: String,
    pub team_id: String,
    #[serde(default)]
    pub team_name: String,
    #[serde(default = "default_team_color")]
    pub team_color: String,
    pub court_id: String,
    #[serde(default)]
    pub court_name: String,
    #[serde(default)]
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub date: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_by: String,
}

fn default_team_color() -> String {
    DEFAULT_TEAM_COLOR.to_string()
}

impl Training {
    pub fn new(
        court_id: impl Into<String>,
        team_id: impl Into<String>,
        team_name: impl Into<String>,
        start_time: impl Into<String>,
        end_time: impl Into<String>,
        date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: String::new(),
            team_id: team_id.into(),
            team_name: team_name.into(),
            team_color: default_team_color(),
            court_id: court_id.into(),
            court_name: String::new(),
            day_of_week: String::new(),
            start_time: start_time.into(),
            end_time: end_time.into(),
            date,
            notes: String::new(),
            created_at: None,
            created_by: String::new(),
        }
    }

    /// Set `day_of_week` from `date` as seen in the civil timezone.
    pub fn with_weekday_label(mut self, calendar: &CivilCalendar) -> Self {
        self.refresh_weekday_label(calendar);
        self
    }

    pub fn refresh_weekday_label(&mut self, calendar: &CivilCalendar) {
        self.day_of_week = calendar.weekday_label_of(&self.date).to_string();
    }

    pub fn start_minutes(&self) -> i32 {
        clock_time::to_minutes(&self.start_time)
    }

    pub fn end_minutes(&self) -> i32 {
        clock_time::to_minutes(&self.end_time)
    }

    /// `end - start` in minutes.
    ///
    /// Not clamped: a session whose end label is earlier than its start
    /// (crossing midnight) yields a negative duration.
    pub fn duration_minutes(&self) -> i32 {
        self.end_minutes() - self.start_minutes()
    }

    /// Whether the minute interval of `self` overlaps `[start, end)`.
    pub fn overlaps_minutes(&self, start: i32, end: i32) -> bool {
        clock_time::intervals_overlap(self.start_minutes(), self.end_minutes(), start, end)
    }

    /// Weekly conflict test: same court, same `day_of_week` label and
    /// overlapping half-open minute intervals. The calendar `date` is not
    /// consulted, so two sessions on different Mondays still conflict.
    pub fn conflicts_with(&self, other: &Training) -> bool {
        self.court_id == other.court_id
            && self.day_of_week == other.day_of_week
            && self.overlaps_minutes(other.start_minutes(), other.end_minutes())
    }

    /// Dated conflict test: same court, same civil day and overlapping
    /// minute intervals.
    pub fn conflicts_on_date(&self, other: &Training, calendar: &CivilCalendar) -> bool {
        self.court_id == other.court_id
            && calendar.is_same_day(&self.date, &other.date)
            && self.overlaps_minutes(other.start_minutes(), other.end_minutes())
    }

    /// "HH:MM - HH:MM" as stored.
    pub fn time_range(&self) -> String {
        format!("{} - {}", self.start_time, self.end_time)
    }
}
