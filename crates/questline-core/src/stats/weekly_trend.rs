//! Weekly trend derivation.
//!
//! Buckets completed sessions and ledger XP by ISO week start. Weeks
//! with zero sessions still appear as zero-filled buckets across the
//! requested window so charts never show gaps.

use chrono::{DateTime, Duration, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ledger::{iso_week_start, XpLedgerEntry};
use crate::session::Session;

/// One week of aggregated activity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeeklyBucket {
    /// ISO week start (Monday)
    pub week_start: NaiveDate,
    pub session_count: u32,
    pub total_hours: f64,
    pub total_xp: i64,
}

/// Largest accepted trend window, roughly ten years of weeks.
/// Requests beyond it are clamped so date arithmetic stays in range.
pub const MAX_TREND_WEEKS: usize = 520;

impl WeeklyBucket {
    fn empty(week_start: NaiveDate) -> Self {
        Self {
            week_start,
            session_count: 0,
            total_hours: 0.0,
            total_xp: 0,
        }
    }
}

/// Derive the weekly trend for the `week_count` ISO weeks ending with
/// the week containing `now`, oldest first.
///
/// Sessions are bucketed by the local calendar date of their end time in
/// `now`'s timezone; a timestamp exactly on a week boundary belongs to
/// the week starting that day. Only completed sessions count. A zero
/// `week_count` yields an empty sequence; windows beyond
/// [`MAX_TREND_WEEKS`] are clamped to it.
pub fn weekly_trend<Tz: TimeZone>(
    sessions: &[Session],
    ledger: &[XpLedgerEntry],
    week_count: usize,
    now: &DateTime<Tz>,
) -> Vec<WeeklyBucket> {
    if week_count == 0 {
        return Vec::new();
    }
    let week_count = week_count.min(MAX_TREND_WEEKS);

    let tz = now.timezone();
    let current_week = iso_week_start(now.date_naive());
    let first_week = current_week - Duration::weeks(week_count as i64 - 1);

    let mut buckets: BTreeMap<NaiveDate, WeeklyBucket> = (0..week_count)
        .map(|i| {
            let week = first_week + Duration::weeks(i as i64);
            (week, WeeklyBucket::empty(week))
        })
        .collect();

    for session in sessions.iter().filter(|s| s.completed) {
        let Some(ended_at) = &session.ended_at else {
            continue;
        };
        let week = iso_week_start(ended_at.with_timezone(&tz).date_naive());
        if let Some(bucket) = buckets.get_mut(&week) {
            bucket.session_count += 1;
            bucket.total_hours += session.actual_minutes.unwrap_or(0) as f64 / 60.0;
        }
    }

    for entry in ledger {
        if let Some(bucket) = buckets.get_mut(&entry.week_start) {
            bucket.total_xp += entry.amount;
        }
    }

    buckets.into_values().collect()
}
