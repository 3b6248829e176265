//! Error taxonomy for store access and booking.
//!
//! Malformed clock strings are not errors at all (they resolve to neutral
//! values), so only two failure families exist here: the store could not
//! do its job, or the booking collided with an existing training.

use thiserror::Error;

use crate::training::Training;

/// Failure reported by a [`TrainingStore`](crate::traits::TrainingStore)
/// or by court persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid remote store url: {0}")]
    InvalidUrl(String),

    #[error("remote store returned status {0}")]
    Status(u16),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("court '{court_id}' is still referenced by {count} training(s)")]
    CourtInUse { court_id: String, count: i64 },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of a rejected booking.
///
/// `Conflict` and `Store` are kept apart so callers can tell "time already
/// booked" from "could not save".
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("{}", conflict_message(.existing))]
    Conflict { existing: Box<Training> },

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn conflict_message(existing: &Training) -> String {
    format!(
        "court '{}' is already booked by {} on {} {}-{}",
        existing.court_id,
        existing.team_name,
        existing.day_of_week,
        existing.start_time,
        existing.end_time
    )
}

impl BookingError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, BookingError::Conflict { .. })
    }

    /// The training that blocked the booking, if this was a conflict.
    pub fn conflicting_training(&self) -> Option<&Training> {
        match self {
            BookingError::Conflict { existing } => Some(existing),
            BookingError::Store(_) => None,
        }
    }
}
