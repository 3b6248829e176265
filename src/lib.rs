//! Court Planner Library
//!
//! Court opening hours, the slot grid used to show availability, and the
//! overlap check that keeps one training per court and time window.

pub mod analytics;
pub mod calendar;
pub mod clock_time;
pub mod config;
pub mod conflict;
pub mod court;
pub mod db;
pub mod error;
pub mod remote;
pub mod schedule;
pub mod slots;
pub mod traits;
pub mod training;

// Re-export commonly used types
pub use analytics::{DayUtilization, FreeWindow, find_free_windows, utilization_by_day};
pub use calendar::{CivilCalendar, weekday_label};
pub use config::AppConfig;
pub use conflict::{BookingService, ConflictDetector, ConflictScope};
pub use court::Court;
pub use db::Database;
pub use error::{BookingError, StoreError};
pub use remote::RemoteStore;
pub use schedule::{DaySchedule, WeeklySchedule};
pub use slots::{TimeSlot, build_availability_grid, generate_slots};
pub use traits::{Clock, InMemoryStore, MockClock, SystemClock, TrainingStore};
pub use training::Training;
