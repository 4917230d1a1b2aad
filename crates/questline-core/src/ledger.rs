//! Append-only XP ledger.
//!
//! XP is never retracted: corrections are made by appending compensating
//! entries, never by mutating or deleting past rows. The sum over an ISO
//! week bucket is the user's weekly XP.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What earned an XP entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum XpSource {
    Session,
    Project,
    Achievement,
}

impl XpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            XpSource::Session => "session",
            XpSource::Project => "project",
            XpSource::Achievement => "achievement",
        }
    }
}

impl std::str::FromStr for XpSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "session" => Ok(XpSource::Session),
            "project" => Ok(XpSource::Project),
            "achievement" => Ok(XpSource::Achievement),
            other => Err(format!("unknown XP source '{other}'")),
        }
    }
}

/// One append-only XP accrual row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpLedgerEntry {
    /// Unique identifier
    pub id: String,
    pub user_id: String,
    pub source: XpSource,
    pub amount: i64,
    /// ISO week bucket (Monday on or before the entry's date)
    pub week_start: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl XpLedgerEntry {
    /// Create an entry bucketed into the ISO week of `created_at`.
    pub fn new(
        user_id: impl Into<String>,
        source: XpSource,
        amount: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            source,
            amount,
            week_start: iso_week_start(created_at.date_naive()),
            created_at,
        }
    }
}

/// Monday on or before the given date.
///
/// Timestamps exactly on a week boundary belong to the week that starts
/// on that day (half-open interval, inclusive of start).
pub fn iso_week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
