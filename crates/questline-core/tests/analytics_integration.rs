//! Integration tests for analytics reads over a real store.

use chrono::Utc;
use questline_core::{Database, Tracker, Willpower};

fn tracker() -> Tracker<Database> {
    Tracker::new(Database::open_memory().unwrap())
}

#[test]
fn test_heatmap_always_has_requested_length() {
    let mut tracker = tracker();
    let now = Utc::now();

    // No sessions at all: still 14 zero-filled entries.
    let empty = tracker.heatmap_at("u1", 14, &now).unwrap();
    assert_eq!(empty.len(), 14);
    assert!(empty.iter().all(|b| b.session_count == 0));
    assert_eq!(empty.iter().filter(|b| b.is_today).count(), 1);

    let session = tracker
        .start_session("u1", None, Willpower::High, 60)
        .unwrap()
        .session;
    tracker.complete_session("u1", &session.id, 60).unwrap();

    let buckets = tracker.heatmap_at("u1", 14, &now).unwrap();
    assert_eq!(buckets.len(), 14);
    assert_eq!(buckets.last().unwrap().session_count, 1);
    assert!(buckets.last().unwrap().is_today);
}

#[test]
fn test_heatmap_zero_window_is_empty() {
    let tracker = tracker();
    assert!(tracker.heatmap_at("u1", 0, &Utc::now()).unwrap().is_empty());
}

#[test]
fn test_weekly_trend_reflects_committed_sessions() {
    let mut tracker = tracker();
    let now = Utc::now();

    let session = tracker
        .start_session("u1", None, Willpower::Medium, 90)
        .unwrap()
        .session;
    let completed = tracker.complete_session("u1", &session.id, 90).unwrap();

    let buckets = tracker.weekly_trend_at("u1", 4, &now).unwrap();
    assert_eq!(buckets.len(), 4);

    let current = buckets.last().unwrap();
    assert_eq!(current.session_count, 1);
    assert_eq!(current.total_hours, 1.5);
    assert_eq!(current.total_xp, completed.xp_awarded);

    // Older weeks are zero-filled, never missing.
    for bucket in &buckets[..3] {
        assert_eq!(bucket.session_count, 0);
        assert_eq!(bucket.total_xp, 0);
    }
}

#[test]
fn test_weekly_trend_is_idempotent_without_mutation() {
    let mut tracker = tracker();
    let now = Utc::now();
    let session = tracker
        .start_session("u1", None, Willpower::High, 60)
        .unwrap()
        .session;
    tracker.complete_session("u1", &session.id, 55).unwrap();

    let first = tracker.weekly_trend_at("u1", 6, &now).unwrap();
    let second = tracker.weekly_trend_at("u1", 6, &now).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_in_flight_sessions_do_not_appear() {
    let mut tracker = tracker();
    let now = Utc::now();
    tracker
        .start_session("u1", None, Willpower::High, 120)
        .unwrap();

    let buckets = tracker.weekly_trend_at("u1", 1, &now).unwrap();
    assert_eq!(buckets[0].session_count, 0);

    let heatmap = tracker.heatmap_at("u1", 7, &now).unwrap();
    assert!(heatmap.iter().all(|b| b.session_count == 0));
}

#[test]
fn test_project_xp_feeds_the_trend() {
    let mut tracker = tracker();
    let now = Utc::now();
    let project = tracker
        .add_project(
            "u1",
            "deep clean",
            questline_core::Category::Manage,
            questline_core::Priority::Should,
            4,
            6,
        )
        .unwrap()
        .project;
    let outcome = tracker.complete_project("u1", &project.id).unwrap();

    let buckets = tracker.weekly_trend_at("u1", 1, &now).unwrap();
    // Project XP counts toward the week even with zero sessions.
    assert_eq!(buckets[0].session_count, 0);
    assert_eq!(buckets[0].total_xp, outcome.xp_awarded);
}
