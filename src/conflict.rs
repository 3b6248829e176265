//! Overlap detection for trainings and the booking flow built on it.
//!
//! Booking is check-then-act: the existing trainings for a court are read,
//! checked locally and only then is the new one written. Nothing is locked
//! in between, so two concurrent bookings can both pass the check.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    calendar::CivilCalendar,
    court::Court,
    error::{BookingError, StoreError},
    slots::{TimeSlot, build_availability_grid},
    traits::{Clock, TrainingStore},
    training::Training,
};

/// Which sessions compete for the same court time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictScope {
    /// Same `day_of_week` label, any date. Models weekly recurring slots.
    #[default]
    Weekday,
    /// Same civil calendar day. Models one-off bookings.
    Date,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConflictDetector {
    scope: ConflictScope,
    calendar: CivilCalendar,
}

impl ConflictDetector {
    pub fn new(scope: ConflictScope, calendar: CivilCalendar) -> Self {
        Self { scope, calendar }
    }

    pub fn scope(&self) -> ConflictScope {
        self.scope
    }

    pub fn calendar(&self) -> &CivilCalendar {
        &self.calendar
    }

    /// Pairwise test under the configured scope.
    pub fn conflicts(&self, a: &Training, b: &Training) -> bool {
        match self.scope {
            ConflictScope::Weekday => a.conflicts_with(b),
            ConflictScope::Date => a.conflicts_on_date(b, &self.calendar),
        }
    }

    /// First existing training that `candidate` overlaps, if any.
    ///
    /// Trainings on other courts are skipped even if the caller passed them
    /// in, and an existing training with the candidate's own id is ignored
    /// so edits are not checked against their previous version.
    pub fn first_conflict<'a>(
        &self,
        candidate: &Training,
        existing: &'a [Training],
    ) -> Option<&'a Training> {
        existing
            .iter()
            .filter(|other| !is_same_record(candidate, other))
            .find(|other| self.conflicts(candidate, other))
    }

    /// Every existing training that `candidate` overlaps.
    pub fn find_conflicts<'a>(
        &self,
        candidate: &Training,
        existing: &'a [Training],
    ) -> Vec<&'a Training> {
        existing
            .iter()
            .filter(|other| !is_same_record(candidate, other))
            .filter(|other| self.conflicts(candidate, other))
            .collect()
    }
}

fn is_same_record(a: &Training, b: &Training) -> bool {
    !a.id.is_empty() && a.id == b.id
}

/// Checks candidates against the store and persists the ones that fit.
pub struct BookingService<S, C> {
    store: Arc<S>,
    clock: Arc<C>,
    detector: ConflictDetector,
}

impl<S: TrainingStore, C: Clock> BookingService<S, C> {
    pub fn new(store: Arc<S>, clock: Arc<C>, detector: ConflictDetector) -> Self {
        Self {
            store,
            clock,
            detector,
        }
    }

    pub fn detector(&self) -> &ConflictDetector {
        &self.detector
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Book a new training.
    ///
    /// Loads every training on the candidate's court, rejects the booking
    /// on the first overlap and otherwise persists it. The returned
    /// training carries the id assigned by the store.
    pub async fn book(&self, mut candidate: Training) -> Result<Training, BookingError> {
        self.prepare(&mut candidate);
        if candidate.created_at.is_none() {
            candidate.created_at = Some(self.clock.now_utc());
        }

        self.ensure_free(&candidate).await?;

        let id = self.store.save_training(&candidate).await.map_err(|e| {
            tracing::error!("Failed to save training on court '{}': {}", candidate.court_id, e);
            e
        })?;
        candidate.id = id;

        tracing::info!(
            "Booked court '{}' for {} on {} {} ({})",
            candidate.court_id,
            candidate.team_name,
            candidate.day_of_week,
            candidate.time_range(),
            candidate.id
        );
        Ok(candidate)
    }

    /// Save an edited training after checking it against every other
    /// training on its court. The training must already be stored; new
    /// ones go through [`BookingService::book`].
    pub async fn reschedule(&self, mut training: Training) -> Result<Training, BookingError> {
        if training.id.is_empty() {
            return Err(StoreError::NotFound {
                kind: "training",
                id: training.id,
            }
            .into());
        }

        // Derived from the possibly moved date
        training.day_of_week.clear();
        self.prepare(&mut training);

        self.ensure_free(&training).await?;

        let id = self.store.save_training(&training).await?;
        training.id = id;
        tracing::info!(
            "Rescheduled training '{}' to {} {}",
            training.id,
            training.day_of_week,
            training.time_range()
        );
        Ok(training)
    }

    /// Cancel a booking.
    pub async fn cancel(&self, id: &str) -> Result<(), BookingError> {
        self.store.delete_training(id).await?;
        tracing::info!("Cancelled training '{}'", id);
        Ok(())
    }

    /// Availability grid for `court` built from its stored trainings.
    pub async fn availability(
        &self,
        court: &Court,
        from: NaiveDate,
        days: u32,
        step_minutes: i32,
    ) -> Result<Vec<TimeSlot>, BookingError> {
        let trainings = self.store.trainings_for_court(&court.id).await?;
        Ok(build_availability_grid(
            court,
            from,
            days,
            step_minutes,
            &trainings,
            self.detector.calendar(),
        ))
    }

    fn prepare(&self, training: &mut Training) {
        if training.day_of_week.is_empty() {
            training.refresh_weekday_label(self.detector.calendar());
        }
    }

    async fn ensure_free(&self, candidate: &Training) -> Result<(), BookingError> {
        let existing = self
            .store
            .trainings_for_court(&candidate.court_id)
            .await
            .map_err(|e| {
                tracing::error!(
                    "Failed to load trainings for court '{}': {}",
                    candidate.court_id,
                    e
                );
                e
            })?;

        tracing::debug!(
            "Checking {} {} on court '{}' against {} existing training(s)",
            candidate.day_of_week,
            candidate.time_range(),
            candidate.court_id,
            existing.len()
        );

        if let Some(blocking) = self.detector.first_conflict(candidate, &existing) {
            tracing::warn!(
                "Court '{}' already booked by {} at {} {}",
                blocking.court_id,
                blocking.team_name,
                blocking.day_of_week,
                blocking.time_range()
            );
            return Err(BookingError::Conflict {
                existing: Box::new(blocking.clone()),
            });
        }
        Ok(())
    }
}
