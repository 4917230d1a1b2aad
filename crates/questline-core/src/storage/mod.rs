//! Entity store adapter and user configuration.
//!
//! The core only requires CRUD plus query-by-filter semantics keyed by
//! user identity, with read-your-writes consistency. [`EntityStore`] is
//! that seam; [`Database`] is the SQLite-backed implementation.

mod config;
pub mod database;

pub use config::{AnalyticsConfig, Config, SessionDefaults};
pub use database::Database;

use chrono::NaiveDate;
use std::path::PathBuf;

use crate::capture::{Capture, TriageCommit};
use crate::error::Result;
use crate::ledger::XpLedgerEntry;
use crate::project::Project;
use crate::session::Session;

/// Returns `~/.config/questline[-dev]/` based on QUESTLINE_ENV.
///
/// Set QUESTLINE_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("QUESTLINE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("questline-dev")
    } else {
        base_dir.join("questline")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Abstract read/write access to captures, projects, sessions and the
/// XP ledger, keyed by user identity.
///
/// Implementations must provide read-your-writes consistency and apply
/// the multi-step write methods (`apply_triage`, `finish_session`,
/// `finish_project`) atomically: on failure the prior state is left
/// untouched.
pub trait EntityStore {
    // ── Captures ─────────────────────────────────────────────────────

    fn insert_capture(&mut self, user_id: &str, capture: &Capture) -> Result<()>;
    fn capture(&self, user_id: &str, capture_id: &str) -> Result<Option<Capture>>;
    fn captures(&self, user_id: &str) -> Result<Vec<Capture>>;
    /// Pending captures, oldest first.
    fn pending_captures(&self, user_id: &str) -> Result<Vec<Capture>>;
    /// The parking lot: parked captures, oldest parked first.
    fn parked_captures(&self, user_id: &str) -> Result<Vec<Capture>>;
    /// Atomically commit a triage transition (capture update or delete,
    /// plus the tracked project when the action was `track`).
    fn apply_triage(&mut self, user_id: &str, commit: &TriageCommit) -> Result<()>;

    // ── Projects ─────────────────────────────────────────────────────

    fn insert_project(&mut self, user_id: &str, project: &Project) -> Result<()>;
    fn project(&self, user_id: &str, project_id: &str) -> Result<Option<Project>>;
    fn projects(&self, user_id: &str) -> Result<Vec<Project>>;
    /// Atomically write a terminal project state and, when completing,
    /// append its ledger entry.
    fn finish_project(
        &mut self,
        user_id: &str,
        project: &Project,
        entry: Option<&XpLedgerEntry>,
    ) -> Result<()>;

    // ── Sessions ─────────────────────────────────────────────────────

    fn insert_session(&mut self, user_id: &str, session: &Session) -> Result<()>;
    fn session(&self, user_id: &str, session_id: &str) -> Result<Option<Session>>;
    fn sessions(&self, user_id: &str) -> Result<Vec<Session>>;
    /// Atomically write a completed session and append its ledger entry.
    fn finish_session(
        &mut self,
        user_id: &str,
        session: &Session,
        entry: &XpLedgerEntry,
    ) -> Result<()>;

    // ── XP ledger ────────────────────────────────────────────────────

    fn ledger(&self, user_id: &str) -> Result<Vec<XpLedgerEntry>>;
    /// Sum of ledger amounts for one ISO week bucket.
    fn weekly_xp(&self, user_id: &str, week_start: NaiveDate) -> Result<i64>;
}
