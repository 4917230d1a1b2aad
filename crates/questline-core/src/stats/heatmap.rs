//! Trailing-day session heatmap.
//!
//! One entry per calendar day in the requested window, including days
//! with zero sessions. Day boundaries are local-calendar-day boundaries
//! in the caller's timezone, not UTC, and a session counts on the day it
//! ended, the same attribution the weekly trend uses. The entry for the
//! current date is flagged so presentation can highlight it; the
//! aggregator itself makes no rendering decision.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::session::Session;

/// Default trailing window, in days.
pub const DEFAULT_HEATMAP_DAYS: usize = 14;

/// Largest accepted trailing window, roughly ten years of days.
/// Requests beyond it are clamped so date arithmetic stays in range.
pub const MAX_HEATMAP_DAYS: usize = 3_660;

/// One calendar day of session activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub session_count: u32,
    /// True for exactly one entry per non-empty window: the current date
    pub is_today: bool,
}

/// Build the heatmap for the trailing `day_count` days ending today,
/// oldest first. A zero-day window yields an empty sequence; windows
/// beyond [`MAX_HEATMAP_DAYS`] are clamped to it.
pub fn session_heatmap<Tz: TimeZone>(
    sessions: &[Session],
    day_count: usize,
    now: &DateTime<Tz>,
) -> Vec<DayBucket> {
    if day_count == 0 {
        return Vec::new();
    }
    let day_count = day_count.min(MAX_HEATMAP_DAYS);

    let tz = now.timezone();
    let today = now.date_naive();
    let first_day = today - Duration::days(day_count as i64 - 1);

    let mut buckets: Vec<DayBucket> = (0..day_count)
        .map(|i| {
            let date = first_day + Duration::days(i as i64);
            DayBucket {
                date,
                session_count: 0,
                is_today: date == today,
            }
        })
        .collect();

    for session in sessions.iter().filter(|s| s.completed) {
        let Some(ended_at) = &session.ended_at else {
            continue;
        };
        let date = ended_at.with_timezone(&tz).date_naive();
        if date < first_day || date > today {
            continue;
        }
        let idx = (date - first_day).num_days() as usize;
        buckets[idx].session_count += 1;
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Willpower;
    use chrono::{FixedOffset, Utc};

    fn completed_at(started_at: DateTime<Utc>) -> Session {
        let mut session = Session::start(None, Willpower::High, 60, started_at).unwrap();
        session
            .complete(60, started_at + Duration::minutes(60))
            .unwrap();
        session
    }

    #[test]
    fn test_zero_day_window_is_empty() {
        let now = Utc::now();
        assert!(session_heatmap::<Utc>(&[], 0, &now).is_empty());
    }

    #[test]
    fn test_fourteen_entries_regardless_of_sessions() {
        let now = "2026-08-20T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let buckets = session_heatmap::<Utc>(&[], DEFAULT_HEATMAP_DAYS, &now);

        assert_eq!(buckets.len(), 14);
        assert!(buckets.iter().all(|b| b.session_count == 0));
        assert_eq!(buckets.iter().filter(|b| b.is_today).count(), 1);
        assert!(buckets.last().unwrap().is_today);
        assert_eq!(
            buckets[0].date,
            NaiveDate::from_ymd_opt(2026, 8, 7).unwrap()
        );
    }

    #[test]
    fn test_sessions_counted_on_their_day() {
        let now = "2026-08-20T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let sessions = vec![
            completed_at("2026-08-20T08:00:00Z".parse().unwrap()),
            completed_at("2026-08-20T10:00:00Z".parse().unwrap()),
            completed_at("2026-08-18T09:00:00Z".parse().unwrap()),
            // Outside the window entirely.
            completed_at("2026-07-01T09:00:00Z".parse().unwrap()),
        ];

        let buckets = session_heatmap::<Utc>(&sessions, 14, &now);
        let today = buckets.last().unwrap();
        assert_eq!(today.session_count, 2);

        let two_days_ago = &buckets[buckets.len() - 3];
        assert_eq!(two_days_ago.session_count, 1);

        let total: u32 = buckets.iter().map(|b| b.session_count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_day_boundaries_are_local_not_utc() {
        // 23:30 UTC on the 19th is already the 20th at UTC+9.
        let tz = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = "2026-08-20T12:00:00+09:00"
            .parse::<DateTime<FixedOffset>>()
            .unwrap();
        let late_session = completed_at("2026-08-19T23:30:00Z".parse().unwrap());

        let buckets = session_heatmap(&[late_session], 3, &now.with_timezone(&tz));
        let today = buckets.last().unwrap();
        assert_eq!(today.date, NaiveDate::from_ymd_opt(2026, 8, 20).unwrap());
        assert_eq!(today.session_count, 1);
    }

    #[test]
    fn test_oversized_window_is_clamped_not_fatal() {
        let now = "2026-08-20T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let buckets = session_heatmap::<Utc>(&[], usize::MAX, &now);

        assert_eq!(buckets.len(), MAX_HEATMAP_DAYS);
        assert!(buckets.last().unwrap().is_today);
        assert_eq!(buckets.iter().filter(|b| b.is_today).count(), 1);
    }

    #[test]
    fn test_midnight_crossing_session_counts_on_end_day() {
        let now = "2026-08-20T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        // Starts on the 19th, ends after midnight on the 20th.
        let session = completed_at("2026-08-19T23:30:00Z".parse().unwrap());

        let buckets = session_heatmap::<Utc>(&[session], 3, &now);
        assert_eq!(buckets[1].date, NaiveDate::from_ymd_opt(2026, 8, 19).unwrap());
        assert_eq!(buckets[1].session_count, 0);
        assert_eq!(buckets[2].session_count, 1);
    }

    #[test]
    fn test_incomplete_sessions_not_counted() {
        let now = "2026-08-20T12:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let in_flight = Session::start(None, Willpower::Medium, 90, now).unwrap();

        let buckets = session_heatmap::<Utc>(&[in_flight], 7, &now);
        assert!(buckets.iter().all(|b| b.session_count == 0));
    }
}
