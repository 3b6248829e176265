//! Seams to the collaborators around the booking core.
//!
//! This module provides traits for:
//! - `Clock`: Abstracting time access for deterministic testing
//! - `TrainingStore`: The resource store that holds training occurrences

use std::{
    collections::HashMap,
    future::Future,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
};

use chrono::{DateTime, Utc};

use crate::{error::StoreError, training::Training};

// ==================== Clock Trait ====================

/// Trait for abstracting time access.
pub trait Clock: Send + Sync {
    /// Get the current time in UTC.
    fn now_utc(&self) -> DateTime<Utc>;
}

/// System clock implementation using real time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock for testing with controllable time.
#[derive(Debug, Clone)]
pub struct MockClock {
    utc_time: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock set to the given UTC time.
    pub fn new(time: DateTime<Utc>) -> Self {
        Self {
            utc_time: Arc::new(Mutex::new(time)),
        }
    }

    /// Set the mock clock to a new time.
    pub fn set_time(&self, time: DateTime<Utc>) {
        *self.utc_time.lock().unwrap() = time;
    }

    /// Advance the clock by a duration.
    pub fn advance(&self, duration: chrono::Duration) {
        let mut time = self.utc_time.lock().unwrap();
        *time += duration;
    }
}

impl Clock for MockClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.utc_time.lock().unwrap()
    }
}

// ==================== TrainingStore Trait ====================

/// The store that holds training occurrences.
///
/// Implementations only need to filter by court; conflict enforcement is
/// done by the caller.
pub trait TrainingStore: Send + Sync {
    /// All trainings whose `court_id` equals `court_id`.
    fn trainings_for_court(
        &self,
        court_id: &str,
    ) -> impl Future<Output = Result<Vec<Training>, StoreError>> + Send;

    /// Insert or replace `training` by id. An empty id asks the store to
    /// assign one. Returns the stored id.
    fn save_training(
        &self,
        training: &Training,
    ) -> impl Future<Output = Result<String, StoreError>> + Send;

    /// Remove a training. Removing an unknown id is a `NotFound` error.
    fn delete_training(&self, id: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// In-memory store for tests and offline use.
///
/// Can be switched into a failing mode to exercise store-failure paths.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    trainings: Arc<Mutex<HashMap<String, Training>>>,
    next_id: Arc<AtomicU64>,
    failing: Arc<AtomicBool>,
    fetch_count: Arc<AtomicU64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `StoreError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All stored trainings, sorted by id.
    pub fn all(&self) -> Vec<Training> {
        let mut all: Vec<_> = self.trainings.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    pub fn len(&self) -> usize {
        self.trainings.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `trainings_for_court` calls served so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetch_count.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("in-memory store set to fail".to_string()))
        } else {
            Ok(())
        }
    }
}

impl TrainingStore for InMemoryStore {
    async fn trainings_for_court(&self, court_id: &str) -> Result<Vec<Training>, StoreError> {
        self.check_available()?;
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        let mut found: Vec<_> = self
            .trainings
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.court_id == court_id)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(found)
    }

    async fn save_training(&self, training: &Training) -> Result<String, StoreError> {
        self.check_available()?;
        let mut stored = training.clone();
        if stored.id.is_empty() {
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            stored.id = format!("training-{n}");
        }
        let id = stored.id.clone();
        self.trainings.lock().unwrap().insert(id.clone(), stored);
        Ok(id)
    }

    async fn delete_training(&self, id: &str) -> Result<(), StoreError> {
        self.check_available()?;
        match self.trainings.lock().unwrap().remove(id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound {
                kind: "training",
                id: id.to_string(),
            }),
        }
    }
}
