//! Integration tests for the booking flow using mock dependencies.
//!
//! These tests drive `BookingService` against `InMemoryStore` and
//! `MockClock` for deterministic, reproducible results.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use court_planner::{
    BookingService, CivilCalendar, ConflictDetector, ConflictScope, Court, DaySchedule,
    InMemoryStore, MockClock, Training, TrainingStore, find_free_windows, utilization_by_day,
};

fn monday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 17, 0, 0, 0).unwrap()
}

fn service(scope: ConflictScope) -> BookingService<InMemoryStore, MockClock> {
    BookingService::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(MockClock::new(monday() - Duration::days(1))),
        ConflictDetector::new(scope, CivilCalendar::utc()),
    )
}

fn candidate(court: &str, team: &str, start: &str, end: &str, date: DateTime<Utc>) -> Training {
    Training::new(court, team, team, start, end, date)
}

// ==================== Booking Outcomes ====================

#[tokio::test]
async fn test_back_to_back_bookings_are_accepted() {
    let service = service(ConflictScope::Weekday);

    service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .expect("First booking should succeed");
    service
        .book(candidate("c1", "Hawks", "20:00", "22:00", monday()))
        .await
        .expect("Abutting booking should succeed");

    assert_eq!(service.store().len(), 2);
}

#[tokio::test]
async fn test_overlapping_booking_is_a_conflict_not_a_failure() {
    let service = service(ConflictScope::Weekday);
    service
        .book(candidate("c1", "Eagles", "18:00", "20:30", monday()))
        .await
        .unwrap();

    let err = service
        .book(candidate("c1", "Hawks", "20:00", "22:00", monday()))
        .await
        .unwrap_err();

    assert!(err.is_conflict());
    assert_eq!(err.conflicting_training().unwrap().team_name, "Eagles");
}

#[tokio::test]
async fn test_same_time_on_other_court_is_accepted() {
    let service = service(ConflictScope::Weekday);
    service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .unwrap();

    assert!(
        service
            .book(candidate("c2", "Hawks", "18:00", "20:00", monday()))
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_store_failure_is_reported_separately() {
    let service = service(ConflictScope::Weekday);
    service.store().set_failing(true);

    let err = service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .unwrap_err();

    assert!(!err.is_conflict());
    assert!(err.to_string().contains("unavailable"));
}

#[tokio::test]
async fn test_check_reads_the_court_before_writing() {
    let service = service(ConflictScope::Weekday);
    service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .unwrap();

    assert_eq!(service.store().fetch_count(), 1);
}

// ==================== Conflict Scope ====================

#[tokio::test]
async fn test_weekday_scope_blocks_the_same_slot_next_week() {
    let service = service(ConflictScope::Weekday);
    service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .unwrap();

    let next_week = monday() + Duration::weeks(1);
    let err = service
        .book(candidate("c1", "Hawks", "19:00", "21:00", next_week))
        .await
        .unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn test_date_scope_allows_the_same_slot_next_week() {
    let service = service(ConflictScope::Date);
    service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .unwrap();

    let next_week = monday() + Duration::weeks(1);
    assert!(
        service
            .book(candidate("c1", "Hawks", "19:00", "21:00", next_week))
            .await
            .is_ok()
    );
}

// ==================== Check-then-act ====================

/// Two bookings that read the court before either writes both pass the
/// check. The store ends up with overlapping trainings.
#[tokio::test]
async fn test_concurrent_bookings_can_both_pass() {
    let store = Arc::new(InMemoryStore::new());
    let detector = ConflictDetector::default();

    let a = candidate("c1", "Eagles", "18:00", "20:00", monday())
        .with_weekday_label(detector.calendar());
    let b = candidate("c1", "Hawks", "19:00", "21:00", monday())
        .with_weekday_label(detector.calendar());

    let seen_by_a = store.trainings_for_court("c1").await.unwrap();
    let seen_by_b = store.trainings_for_court("c1").await.unwrap();
    assert!(detector.first_conflict(&a, &seen_by_a).is_none());
    assert!(detector.first_conflict(&b, &seen_by_b).is_none());

    store.save_training(&a).await.unwrap();
    store.save_training(&b).await.unwrap();

    let stored = store.all();
    assert_eq!(stored.len(), 2);
    assert!(stored[0].conflicts_with(&stored[1]));
}

// ==================== Availability Grid ====================

#[tokio::test]
async fn test_availability_reflects_bookings() {
    let service = service(ConflictScope::Date);
    let mut court = Court::with_hours("Center Court", "North Hall", "18:00", "22:00");
    court.id = "c1".to_string();
    // Tuesday closed
    court.set_schedule_for_day(3, DaySchedule::closed("18:00", "22:00"));

    service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .unwrap();

    let from = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
    let grid = service.availability(&court, from, 3, 30).await.unwrap();

    // Monday and Wednesday, eight half-hour slots each
    assert_eq!(grid.len(), 16);
    assert_eq!(grid.iter().filter(|s| !s.is_available()).count(), 4);
    assert!(grid[..4].iter().all(|s| s.training().is_some()));

    let calendar = CivilCalendar::utc();
    let stats = utilization_by_day(&grid, &calendar);
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].percent_booked(), 50.0);
    assert_eq!(stats[1].percent_booked(), 0.0);

    let windows = find_free_windows(&grid, &calendar, 60);
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].start_time, "20:00");
    assert_eq!(windows[0].end_time, "22:00");
    assert_eq!(windows[1].duration_minutes(), 240);
}

#[tokio::test]
async fn test_cancelled_booking_frees_the_grid() {
    let service = service(ConflictScope::Date);
    let mut court = Court::with_hours("Center Court", "North Hall", "18:00", "20:00");
    court.id = "c1".to_string();

    let booked = service
        .book(candidate("c1", "Eagles", "18:00", "20:00", monday()))
        .await
        .unwrap();
    service.cancel(&booked.id).await.unwrap();

    let from = NaiveDate::from_ymd_opt(2024, 6, 17).unwrap();
    let grid = service.availability(&court, from, 1, 30).await.unwrap();
    assert!(grid.iter().all(|s| s.is_available()));
}
