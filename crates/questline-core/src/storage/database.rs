//! SQLite-based entity store.
//!
//! Persistent storage for captures, projects, sessions and the XP
//! ledger, all keyed by user identity. Multi-step writes run inside a
//! transaction so a failure leaves the prior state untouched.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};

use super::{data_dir, EntityStore};
use crate::capture::{Capture, Disposition, TriageCommit};
use crate::error::{CoreError, DatabaseError, EntityKind, Result};
use crate::ledger::{XpLedgerEntry, XpSource};
use crate::project::{Category, Priority, Project, ProjectStatus};
use crate::session::{Session, Willpower};

const WEEK_FORMAT: &str = "%Y-%m-%d";

/// SQLite database implementing [`EntityStore`].
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/questline/questline.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("questline.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (for tests and ephemeral use).
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS captures (
                    id          TEXT PRIMARY KEY,
                    user_id     TEXT NOT NULL,
                    content     TEXT NOT NULL,
                    created_at  TEXT NOT NULL,
                    disposition TEXT NOT NULL,
                    parked_at   TEXT
                );

                CREATE TABLE IF NOT EXISTS projects (
                    id           TEXT PRIMARY KEY,
                    user_id      TEXT NOT NULL,
                    title        TEXT NOT NULL,
                    category     TEXT NOT NULL,
                    priority     TEXT NOT NULL,
                    cost         INTEGER NOT NULL,
                    benefit      INTEGER NOT NULL,
                    status       TEXT NOT NULL,
                    created_at   TEXT NOT NULL,
                    completed_at TEXT
                );

                CREATE TABLE IF NOT EXISTS sessions (
                    id              TEXT PRIMARY KEY,
                    user_id         TEXT NOT NULL,
                    project_id      TEXT,
                    willpower       TEXT NOT NULL,
                    planned_minutes INTEGER NOT NULL,
                    actual_minutes  INTEGER,
                    started_at      TEXT NOT NULL,
                    ended_at        TEXT,
                    completed       INTEGER NOT NULL DEFAULT 0
                );

                CREATE TABLE IF NOT EXISTS xp_ledger (
                    id         TEXT PRIMARY KEY,
                    user_id    TEXT NOT NULL,
                    source     TEXT NOT NULL,
                    amount     INTEGER NOT NULL,
                    week_start TEXT NOT NULL,
                    created_at TEXT NOT NULL
                );

                -- Indexes for the core query patterns
                CREATE INDEX IF NOT EXISTS idx_captures_user_disposition
                    ON captures(user_id, disposition);
                CREATE INDEX IF NOT EXISTS idx_projects_user ON projects(user_id);
                CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
                CREATE INDEX IF NOT EXISTS idx_ledger_user_week
                    ON xp_ledger(user_id, week_start);",
            )
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(())
    }
}

// ── Row decoding ─────────────────────────────────────────────────────

fn parse_ts(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| DatabaseError::CorruptRow(format!("bad timestamp '{s}': {e}")))
}

fn parse_opt_ts(s: Option<String>) -> Result<Option<DateTime<Utc>>, DatabaseError> {
    s.as_deref().map(parse_ts).transpose()
}

fn parse_week(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, WEEK_FORMAT)
        .map_err(|e| DatabaseError::CorruptRow(format!("bad week start '{s}': {e}")))
}

fn parse_field<T>(s: &str) -> Result<T, DatabaseError>
where
    T: FromStr<Err = String>,
{
    T::from_str(s).map_err(DatabaseError::CorruptRow)
}

struct CaptureRow {
    id: String,
    content: String,
    created_at: String,
    disposition: String,
    parked_at: Option<String>,
}

impl CaptureRow {
    fn decode(self) -> Result<Capture, DatabaseError> {
        Ok(Capture {
            id: self.id,
            content: self.content,
            created_at: parse_ts(&self.created_at)?,
            disposition: parse_field::<Disposition>(&self.disposition)?,
            parked_at: parse_opt_ts(self.parked_at)?,
        })
    }
}

struct ProjectRow {
    id: String,
    title: String,
    category: String,
    priority: String,
    cost: u8,
    benefit: u8,
    status: String,
    created_at: String,
    completed_at: Option<String>,
}

impl ProjectRow {
    fn decode(self) -> Result<Project, DatabaseError> {
        Ok(Project {
            id: self.id,
            title: self.title,
            category: parse_field::<Category>(&self.category)?,
            priority: parse_field::<Priority>(&self.priority)?,
            cost: self.cost,
            benefit: self.benefit,
            status: parse_field::<ProjectStatus>(&self.status)?,
            created_at: parse_ts(&self.created_at)?,
            completed_at: parse_opt_ts(self.completed_at)?,
        })
    }
}

struct SessionRow {
    id: String,
    project_id: Option<String>,
    willpower: String,
    planned_minutes: u32,
    actual_minutes: Option<u32>,
    started_at: String,
    ended_at: Option<String>,
    completed: bool,
}

impl SessionRow {
    fn decode(self) -> Result<Session, DatabaseError> {
        Ok(Session {
            id: self.id,
            project_id: self.project_id,
            willpower: parse_field::<Willpower>(&self.willpower)?,
            planned_minutes: self.planned_minutes,
            actual_minutes: self.actual_minutes,
            started_at: parse_ts(&self.started_at)?,
            ended_at: parse_opt_ts(self.ended_at)?,
            completed: self.completed,
        })
    }
}

fn insert_capture_tx(conn: &Connection, user_id: &str, capture: &Capture) -> Result<()> {
    conn.execute(
        "INSERT INTO captures (id, user_id, content, created_at, disposition, parked_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            capture.id,
            user_id,
            capture.content,
            capture.created_at.to_rfc3339(),
            capture.disposition.as_str(),
            capture.parked_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

fn update_capture_tx(conn: &Connection, user_id: &str, capture: &Capture) -> Result<()> {
    let changed = conn.execute(
        "UPDATE captures SET content = ?3, disposition = ?4, parked_at = ?5
         WHERE id = ?1 AND user_id = ?2",
        params![
            capture.id,
            user_id,
            capture.content,
            capture.disposition.as_str(),
            capture.parked_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    if changed == 0 {
        return Err(CoreError::not_found(EntityKind::Capture, &capture.id));
    }
    Ok(())
}

fn insert_project_tx(conn: &Connection, user_id: &str, project: &Project) -> Result<()> {
    conn.execute(
        "INSERT INTO projects
            (id, user_id, title, category, priority, cost, benefit, status, created_at, completed_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            project.id,
            user_id,
            project.title,
            project.category.as_str(),
            project.priority.as_str(),
            project.cost,
            project.benefit,
            project.status.as_str(),
            project.created_at.to_rfc3339(),
            project.completed_at.map(|t| t.to_rfc3339()),
        ],
    )?;
    Ok(())
}

fn insert_ledger_tx(conn: &Connection, entry: &XpLedgerEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO xp_ledger (id, user_id, source, amount, week_start, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            entry.id,
            entry.user_id,
            entry.source.as_str(),
            entry.amount,
            entry.week_start.format(WEEK_FORMAT).to_string(),
            entry.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

const CAPTURE_COLS: &str = "id, content, created_at, disposition, parked_at";
const PROJECT_COLS: &str =
    "id, title, category, priority, cost, benefit, status, created_at, completed_at";
const SESSION_COLS: &str =
    "id, project_id, willpower, planned_minutes, actual_minutes, started_at, ended_at, completed";

impl Database {
    fn query_captures(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Capture>> {
        let mut stmt = self.conn.prepare(sql).map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(CaptureRow {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    created_at: row.get(2)?,
                    disposition: row.get(3)?,
                    parked_at: row.get(4)?,
                })
            })
            .map_err(DatabaseError::from)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(DatabaseError::from)?.decode()?);
        }
        Ok(out)
    }

    fn query_projects(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Project>> {
        let mut stmt = self.conn.prepare(sql).map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(ProjectRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    category: row.get(2)?,
                    priority: row.get(3)?,
                    cost: row.get(4)?,
                    benefit: row.get(5)?,
                    status: row.get(6)?,
                    created_at: row.get(7)?,
                    completed_at: row.get(8)?,
                })
            })
            .map_err(DatabaseError::from)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(DatabaseError::from)?.decode()?);
        }
        Ok(out)
    }

    fn query_sessions(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<Session>> {
        let mut stmt = self.conn.prepare(sql).map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params, |row| {
                Ok(SessionRow {
                    id: row.get(0)?,
                    project_id: row.get(1)?,
                    willpower: row.get(2)?,
                    planned_minutes: row.get(3)?,
                    actual_minutes: row.get(4)?,
                    started_at: row.get(5)?,
                    ended_at: row.get(6)?,
                    completed: row.get(7)?,
                })
            })
            .map_err(DatabaseError::from)?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row.map_err(DatabaseError::from)?.decode()?);
        }
        Ok(out)
    }
}

impl EntityStore for Database {
    fn insert_capture(&mut self, user_id: &str, capture: &Capture) -> Result<()> {
        insert_capture_tx(&self.conn, user_id, capture)
    }

    fn capture(&self, user_id: &str, capture_id: &str) -> Result<Option<Capture>> {
        let mut found = self.query_captures(
            &format!("SELECT {CAPTURE_COLS} FROM captures WHERE user_id = ?1 AND id = ?2"),
            &[&user_id, &capture_id],
        )?;
        Ok(found.pop())
    }

    fn captures(&self, user_id: &str) -> Result<Vec<Capture>> {
        self.query_captures(
            &format!(
                "SELECT {CAPTURE_COLS} FROM captures WHERE user_id = ?1
                 ORDER BY created_at, id"
            ),
            &[&user_id],
        )
    }

    fn pending_captures(&self, user_id: &str) -> Result<Vec<Capture>> {
        self.query_captures(
            &format!(
                "SELECT {CAPTURE_COLS} FROM captures
                 WHERE user_id = ?1 AND disposition = 'pending'
                 ORDER BY created_at, id"
            ),
            &[&user_id],
        )
    }

    fn parked_captures(&self, user_id: &str) -> Result<Vec<Capture>> {
        self.query_captures(
            &format!(
                "SELECT {CAPTURE_COLS} FROM captures
                 WHERE user_id = ?1 AND disposition = 'parked'
                 ORDER BY parked_at, id"
            ),
            &[&user_id],
        )
    }

    fn apply_triage(&mut self, user_id: &str, commit: &TriageCommit) -> Result<()> {
        let tx = self.conn.transaction().map_err(DatabaseError::from)?;
        match commit {
            TriageCommit::Update(capture) => {
                update_capture_tx(&tx, user_id, capture)?;
            }
            TriageCommit::Track(capture, project) => {
                update_capture_tx(&tx, user_id, capture)?;
                insert_project_tx(&tx, user_id, project)?;
            }
            TriageCommit::Delete { capture_id } => {
                let deleted = tx
                    .execute(
                        "DELETE FROM captures WHERE id = ?1 AND user_id = ?2",
                        params![capture_id, user_id],
                    )
                    .map_err(DatabaseError::from)?;
                if deleted == 0 {
                    return Err(CoreError::not_found(EntityKind::Capture, capture_id));
                }
            }
        }
        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }

    fn insert_project(&mut self, user_id: &str, project: &Project) -> Result<()> {
        insert_project_tx(&self.conn, user_id, project)
    }

    fn project(&self, user_id: &str, project_id: &str) -> Result<Option<Project>> {
        let mut found = self.query_projects(
            &format!("SELECT {PROJECT_COLS} FROM projects WHERE user_id = ?1 AND id = ?2"),
            &[&user_id, &project_id],
        )?;
        Ok(found.pop())
    }

    fn projects(&self, user_id: &str) -> Result<Vec<Project>> {
        self.query_projects(
            &format!(
                "SELECT {PROJECT_COLS} FROM projects WHERE user_id = ?1
                 ORDER BY created_at, id"
            ),
            &[&user_id],
        )
    }

    fn finish_project(
        &mut self,
        user_id: &str,
        project: &Project,
        entry: Option<&XpLedgerEntry>,
    ) -> Result<()> {
        let tx = self.conn.transaction().map_err(DatabaseError::from)?;
        let changed = tx
            .execute(
                "UPDATE projects SET status = ?3, completed_at = ?4
                 WHERE id = ?1 AND user_id = ?2",
                params![
                    project.id,
                    user_id,
                    project.status.as_str(),
                    project.completed_at.map(|t| t.to_rfc3339()),
                ],
            )
            .map_err(DatabaseError::from)?;
        if changed == 0 {
            return Err(CoreError::not_found(EntityKind::Project, &project.id));
        }
        if let Some(entry) = entry {
            insert_ledger_tx(&tx, entry)?;
        }
        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }

    fn insert_session(&mut self, user_id: &str, session: &Session) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO sessions
                    (id, user_id, project_id, willpower, planned_minutes,
                     actual_minutes, started_at, ended_at, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    session.id,
                    user_id,
                    session.project_id,
                    session.willpower.as_str(),
                    session.planned_minutes,
                    session.actual_minutes,
                    session.started_at.to_rfc3339(),
                    session.ended_at.map(|t| t.to_rfc3339()),
                    session.completed,
                ],
            )
            .map_err(DatabaseError::from)?;
        Ok(())
    }

    fn session(&self, user_id: &str, session_id: &str) -> Result<Option<Session>> {
        let mut found = self.query_sessions(
            &format!("SELECT {SESSION_COLS} FROM sessions WHERE user_id = ?1 AND id = ?2"),
            &[&user_id, &session_id],
        )?;
        Ok(found.pop())
    }

    fn sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        self.query_sessions(
            &format!(
                "SELECT {SESSION_COLS} FROM sessions WHERE user_id = ?1
                 ORDER BY started_at, id"
            ),
            &[&user_id],
        )
    }

    fn finish_session(
        &mut self,
        user_id: &str,
        session: &Session,
        entry: &XpLedgerEntry,
    ) -> Result<()> {
        let tx = self.conn.transaction().map_err(DatabaseError::from)?;
        let changed = tx
            .execute(
                "UPDATE sessions SET actual_minutes = ?3, ended_at = ?4, completed = ?5
                 WHERE id = ?1 AND user_id = ?2",
                params![
                    session.id,
                    user_id,
                    session.actual_minutes,
                    session.ended_at.map(|t| t.to_rfc3339()),
                    session.completed,
                ],
            )
            .map_err(DatabaseError::from)?;
        if changed == 0 {
            return Err(CoreError::not_found(EntityKind::Session, &session.id));
        }
        insert_ledger_tx(&tx, entry)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(())
    }

    fn ledger(&self, user_id: &str) -> Result<Vec<XpLedgerEntry>> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, user_id, source, amount, week_start, created_at
                 FROM xp_ledger WHERE user_id = ?1 ORDER BY created_at, id",
            )
            .map_err(DatabaseError::from)?;
        let rows = stmt
            .query_map(params![user_id], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })
            .map_err(DatabaseError::from)?;

        let mut out = Vec::new();
        for row in rows {
            let (id, user_id, source, amount, week_start, created_at) =
                row.map_err(DatabaseError::from)?;
            out.push(XpLedgerEntry {
                id,
                user_id,
                source: parse_field::<XpSource>(&source)?,
                amount,
                week_start: parse_week(&week_start)?,
                created_at: parse_ts(&created_at)?,
            });
        }
        Ok(out)
    }

    fn weekly_xp(&self, user_id: &str, week_start: NaiveDate) -> Result<i64> {
        let sum = self
            .conn
            .query_row(
                "SELECT COALESCE(SUM(amount), 0) FROM xp_ledger
                 WHERE user_id = ?1 AND week_start = ?2",
                params![user_id, week_start.format(WEEK_FORMAT).to_string()],
                |row| row.get::<_, i64>(0),
            )
            .map_err(DatabaseError::from)?;
        Ok(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{plan_triage, TriageAction};
    use crate::ledger::iso_week_start;
    use chrono::Duration;

    #[test]
    fn test_capture_round_trip() {
        let mut db = Database::open_memory().unwrap();
        let capture = Capture::new("write notes", Utc::now());
        db.insert_capture("u1", &capture).unwrap();

        let loaded = db.capture("u1", &capture.id).unwrap().unwrap();
        assert_eq!(loaded.content, "write notes");
        assert_eq!(loaded.disposition, Disposition::Pending);

        // Other users never see it.
        assert!(db.capture("u2", &capture.id).unwrap().is_none());
    }

    #[test]
    fn test_pending_captures_oldest_first() {
        let mut db = Database::open_memory().unwrap();
        let base = Utc::now();
        let newer = Capture::new("newer", base + Duration::minutes(1));
        let older = Capture::new("older", base);
        db.insert_capture("u1", &newer).unwrap();
        db.insert_capture("u1", &older).unwrap();

        let pending = db.pending_captures("u1").unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].content, "older");
    }

    #[test]
    fn test_apply_triage_track_writes_both_rows() {
        let mut db = Database::open_memory().unwrap();
        let now = Utc::now();
        let capture = Capture::new("new project idea", now);
        db.insert_capture("u1", &capture).unwrap();

        let commit = plan_triage(capture.clone(), TriageAction::Track, now);
        let project_id = commit.created_project_id().unwrap().to_string();
        db.apply_triage("u1", &commit).unwrap();

        let loaded = db.capture("u1", &capture.id).unwrap().unwrap();
        assert_eq!(loaded.disposition, Disposition::Tracked);
        let project = db.project("u1", &project_id).unwrap().unwrap();
        assert_eq!(project.title, "new project idea");
        assert!(db.pending_captures("u1").unwrap().is_empty());
    }

    #[test]
    fn test_apply_triage_delete_missing_is_not_found() {
        let mut db = Database::open_memory().unwrap();
        let err = db
            .apply_triage(
                "u1",
                &TriageCommit::Delete {
                    capture_id: "nope".into(),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[test]
    fn test_finish_session_appends_ledger() {
        let mut db = Database::open_memory().unwrap();
        let now = Utc::now();
        let mut session = Session::start(None, Willpower::Low, 60, now).unwrap();
        db.insert_session("u1", &session).unwrap();

        session.complete(60, now + Duration::minutes(60)).unwrap();
        let entry = XpLedgerEntry::new("u1", XpSource::Session, 120, now);
        db.finish_session("u1", &session, &entry).unwrap();

        let loaded = db.session("u1", &session.id).unwrap().unwrap();
        assert!(loaded.completed);
        assert_eq!(loaded.actual_minutes, Some(60));

        let ledger = db.ledger("u1").unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].amount, 120);
        assert_eq!(
            db.weekly_xp("u1", iso_week_start(now.date_naive())).unwrap(),
            120
        );
    }

    #[test]
    fn test_weekly_xp_sums_one_bucket_only() {
        let mut db = Database::open_memory().unwrap();
        let now = Utc::now();
        let last_week = now - Duration::weeks(1);
        let mut s1 = Session::start(None, Willpower::High, 60, now).unwrap();
        db.insert_session("u1", &s1).unwrap();
        s1.complete(60, now).unwrap();
        db.finish_session("u1", &s1, &XpLedgerEntry::new("u1", XpSource::Session, 60, now))
            .unwrap();

        let mut s2 = Session::start(None, Willpower::High, 60, last_week).unwrap();
        db.insert_session("u1", &s2).unwrap();
        s2.complete(60, last_week).unwrap();
        db.finish_session(
            "u1",
            &s2,
            &XpLedgerEntry::new("u1", XpSource::Session, 45, last_week),
        )
        .unwrap();

        let this_week = iso_week_start(now.date_naive());
        assert_eq!(db.weekly_xp("u1", this_week).unwrap(), 60);
    }
}
