//! Session orchestrator: the core's full boundary surface.
//!
//! Every mutation follows the same sequence: validate against current
//! entity state, delegate to the pure engines for the computed effect,
//! write through the entity store, and only after a successful write
//! resolve the cache invalidation set and event for the caller. A
//! failure before the store commit has no observable effect.
//!
//! The core assumes a single writer per user: the caller serializes
//! mutations against the same entity and hands in the latest committed
//! state. Read-side aggregations only read and are safe to run
//! concurrently with unrelated writes.

use std::collections::BTreeSet;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::Serialize;

use crate::accrual;
use crate::cache::{invalidation_set_for, MutationIds, MutationKind, ViewKey};
use crate::capture::{plan_triage, Capture, Disposition, TriageAction, TriageQueue};
use crate::error::{CoreError, EntityKind, Result, ValidationError};
use crate::events::Event;
use crate::ledger::{iso_week_start, XpLedgerEntry, XpSource};
use crate::project::{Category, Priority, Project, ProjectStatus};
use crate::session::{Session, Willpower};
use crate::stats::{session_heatmap, weekly_trend, DayBucket, WeeklyBucket};
use crate::storage::EntityStore;

/// Result of adding a capture.
#[derive(Debug, Clone, Serialize)]
pub struct CaptureOutcome {
    pub capture: Capture,
    pub invalidations: BTreeSet<ViewKey>,
    pub event: Event,
}

/// Result of triaging a capture.
#[derive(Debug, Clone, Serialize)]
pub struct TriageOutcome {
    pub capture_id: String,
    /// None when the capture row was deleted.
    pub new_status: Option<Disposition>,
    pub created_project_id: Option<String>,
    pub invalidations: BTreeSet<ViewKey>,
    pub event: Event,
}

/// Result of starting a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStartOutcome {
    pub session: Session,
    pub invalidations: BTreeSet<ViewKey>,
    pub event: Event,
}

/// Result of completing a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionOutcome {
    pub session_id: String,
    pub xp_awarded: i64,
    pub difficulty: &'static str,
    pub ledger_entry_id: String,
    pub invalidations: BTreeSet<ViewKey>,
    pub event: Event,
}

/// Result of creating a project directly.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectAddOutcome {
    pub project: Project,
    pub invalidations: BTreeSet<ViewKey>,
}

/// Result of completing or abandoning a project.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectOutcome {
    pub project_id: String,
    /// Zero when the project was abandoned.
    pub xp_awarded: i64,
    pub invalidations: BTreeSet<ViewKey>,
    pub event: Event,
}

/// Composes the triage state machine, accrual engine, analytics and the
/// cache dependency graph over an entity store.
pub struct Tracker<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // ── Captures & triage ────────────────────────────────────────────

    /// Record a new pending capture.
    pub fn add_capture(&mut self, user_id: &str, content: &str) -> Result<CaptureOutcome> {
        if content.trim().is_empty() {
            return Err(ValidationError::Empty("content").into());
        }
        let now = Utc::now();
        let capture = Capture::new(content.trim(), now);
        self.store.insert_capture(user_id, &capture)?;

        Ok(CaptureOutcome {
            invalidations: invalidation_set_for(
                MutationKind::CaptureCreated,
                &MutationIds::for_user(user_id),
            ),
            event: Event::CaptureAdded {
                capture_id: capture.id.clone(),
                at: now,
            },
            capture,
        })
    }

    pub fn captures(&self, user_id: &str) -> Result<Vec<Capture>> {
        self.store.captures(user_id)
    }

    /// The parking lot: deferred-but-not-discarded captures.
    pub fn parking_lot(&self, user_id: &str) -> Result<Vec<Capture>> {
        self.store.parked_captures(user_id)
    }

    /// Triage one pending capture by id.
    ///
    /// Fails with `NotFound` when the id does not belong to a pending
    /// capture for this user.
    pub fn triage(
        &mut self,
        user_id: &str,
        capture_id: &str,
        action: TriageAction,
    ) -> Result<TriageOutcome> {
        let capture = self
            .store
            .capture(user_id, capture_id)?
            .filter(|c| c.disposition == Disposition::Pending)
            .ok_or_else(|| CoreError::not_found(EntityKind::Capture, capture_id))?;

        let now = Utc::now();
        let commit = plan_triage(capture, action, now);
        let new_status = commit.new_disposition();
        let created_project_id = commit.created_project_id().map(str::to_string);
        self.store.apply_triage(user_id, &commit)?;

        Ok(TriageOutcome {
            capture_id: capture_id.to_string(),
            new_status,
            created_project_id: created_project_id.clone(),
            invalidations: invalidation_set_for(
                MutationKind::CaptureTriaged,
                &MutationIds::for_user(user_id),
            ),
            event: Event::CaptureTriaged {
                capture_id: capture_id.to_string(),
                action,
                new_disposition: new_status,
                created_project_id,
                at: now,
            },
        })
    }

    /// Triage the oldest pending capture.
    ///
    /// Returns `Ok(None)` when the pending queue is empty: that is the
    /// queue's no-op terminal state, not an error.
    pub fn triage_next(
        &mut self,
        user_id: &str,
        action: TriageAction,
    ) -> Result<Option<TriageOutcome>> {
        let queue = TriageQueue::new(self.store.pending_captures(user_id)?);
        match queue.current() {
            Some(capture) => {
                let capture_id = capture.id.clone();
                self.triage(user_id, &capture_id, action).map(Some)
            }
            None => Ok(None),
        }
    }

    // ── Sessions ─────────────────────────────────────────────────────

    /// Start a focus session, optionally attached to a project.
    pub fn start_session(
        &mut self,
        user_id: &str,
        project_id: Option<&str>,
        willpower: Willpower,
        planned_minutes: u32,
    ) -> Result<SessionStartOutcome> {
        if let Some(project_id) = project_id {
            let project = self
                .store
                .project(user_id, project_id)?
                .ok_or_else(|| CoreError::not_found(EntityKind::Project, project_id))?;
            if project.status != ProjectStatus::Active {
                return Err(CoreError::InvalidState(format!(
                    "project '{}' is {}, cannot attach a session",
                    project.id,
                    project.status.as_str()
                )));
            }
        }

        let now = Utc::now();
        let session = Session::start(
            project_id.map(str::to_string),
            willpower,
            planned_minutes,
            now,
        )?;
        self.store.insert_session(user_id, &session)?;

        Ok(SessionStartOutcome {
            invalidations: invalidation_set_for(
                MutationKind::SessionStarted,
                &MutationIds::for_user(user_id),
            ),
            event: Event::SessionStarted {
                session_id: session.id.clone(),
                project_id: session.project_id.clone(),
                at: now,
            },
            session,
        })
    }

    /// Complete a session: finalize its duration, accrue XP and append
    /// the ledger entry atomically.
    pub fn complete_session(
        &mut self,
        user_id: &str,
        session_id: &str,
        actual_minutes: i64,
    ) -> Result<SessionOutcome> {
        if actual_minutes < 0 {
            return Err(ValidationError::NegativeDuration {
                minutes: actual_minutes,
            }
            .into());
        }
        let actual = u32::try_from(actual_minutes).map_err(|_| ValidationError::OutOfRange {
            field: "actual_minutes",
            value: actual_minutes,
            min: 0,
            max: u32::MAX as i64,
        })?;

        let mut session = self
            .store
            .session(user_id, session_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Session, session_id))?;

        let now = Utc::now();
        let xp = accrual::evaluate(session.willpower, session.planned_minutes, actual);
        session.complete(actual, now)?;
        let entry = XpLedgerEntry::new(user_id, XpSource::Session, xp.amount, now);
        self.store.finish_session(user_id, &session, &entry)?;

        Ok(SessionOutcome {
            session_id: session.id.clone(),
            xp_awarded: xp.amount,
            difficulty: xp.difficulty,
            ledger_entry_id: entry.id.clone(),
            invalidations: invalidation_set_for(
                MutationKind::SessionCompleted,
                &MutationIds::for_user(user_id),
            ),
            event: Event::SessionCompleted {
                session_id: session.id,
                xp_awarded: xp.amount,
                at: now,
            },
        })
    }

    pub fn sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        self.store.sessions(user_id)
    }

    // ── Projects ─────────────────────────────────────────────────────

    /// Create a project directly, outside triage.
    pub fn add_project(
        &mut self,
        user_id: &str,
        title: &str,
        category: Category,
        priority: Priority,
        cost: u8,
        benefit: u8,
    ) -> Result<ProjectAddOutcome> {
        let project = Project::new(title, category, priority, cost, benefit, Utc::now())?;
        self.store.insert_project(user_id, &project)?;

        Ok(ProjectAddOutcome {
            invalidations: invalidation_set_for(
                MutationKind::ProjectCreated,
                &MutationIds::for_user(user_id).with_project(&project.id),
            ),
            project,
        })
    }

    pub fn projects(&self, user_id: &str) -> Result<Vec<Project>> {
        self.store.projects(user_id)
    }

    /// Complete a project: terminal, irreversible, one ledger entry.
    pub fn complete_project(&mut self, user_id: &str, project_id: &str) -> Result<ProjectOutcome> {
        let mut project = self
            .store
            .project(user_id, project_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Project, project_id))?;

        if !project.status.can_transition_to(&ProjectStatus::Completed) {
            return Err(CoreError::InvalidState(format!(
                "project '{}' is already {}",
                project.id,
                project.status.as_str()
            )));
        }

        let now = Utc::now();
        let xp_awarded = project.completion_xp();
        project.status = ProjectStatus::Completed;
        project.completed_at = Some(now);
        let entry = XpLedgerEntry::new(user_id, XpSource::Project, xp_awarded, now);
        self.store.finish_project(user_id, &project, Some(&entry))?;

        Ok(ProjectOutcome {
            project_id: project.id.clone(),
            xp_awarded,
            invalidations: invalidation_set_for(
                MutationKind::ProjectCompleted,
                &MutationIds::for_user(user_id).with_project(project_id),
            ),
            event: Event::ProjectCompleted {
                project_id: project.id,
                xp_awarded,
                at: now,
            },
        })
    }

    /// Abandon a project: terminal, no XP.
    pub fn abandon_project(&mut self, user_id: &str, project_id: &str) -> Result<ProjectOutcome> {
        let mut project = self
            .store
            .project(user_id, project_id)?
            .ok_or_else(|| CoreError::not_found(EntityKind::Project, project_id))?;

        if !project.status.can_transition_to(&ProjectStatus::Abandoned) {
            return Err(CoreError::InvalidState(format!(
                "project '{}' is already {}",
                project.id,
                project.status.as_str()
            )));
        }

        let now = Utc::now();
        project.status = ProjectStatus::Abandoned;
        self.store.finish_project(user_id, &project, None)?;

        Ok(ProjectOutcome {
            project_id: project.id.clone(),
            xp_awarded: 0,
            invalidations: invalidation_set_for(
                MutationKind::ProjectAbandoned,
                &MutationIds::for_user(user_id).with_project(project_id),
            ),
            event: Event::ProjectAbandoned {
                project_id: project.id,
                at: now,
            },
        })
    }

    // ── Analytics ────────────────────────────────────────────────────

    /// Weekly trend buckets ending with the current local week.
    pub fn weekly_trend(&self, user_id: &str, week_count: usize) -> Result<Vec<WeeklyBucket>> {
        self.weekly_trend_at(user_id, week_count, &Local::now())
    }

    /// Weekly trend relative to an explicit "now" (for deterministic reads).
    pub fn weekly_trend_at<Tz: TimeZone>(
        &self,
        user_id: &str,
        week_count: usize,
        now: &DateTime<Tz>,
    ) -> Result<Vec<WeeklyBucket>> {
        let sessions = self.store.sessions(user_id)?;
        let ledger = self.store.ledger(user_id)?;
        Ok(weekly_trend(&sessions, &ledger, week_count, now))
    }

    /// Trailing-day session heatmap ending on the current local date.
    pub fn heatmap(&self, user_id: &str, day_count: usize) -> Result<Vec<DayBucket>> {
        self.heatmap_at(user_id, day_count, &Local::now())
    }

    /// Heatmap relative to an explicit "now" (for deterministic reads).
    pub fn heatmap_at<Tz: TimeZone>(
        &self,
        user_id: &str,
        day_count: usize,
        now: &DateTime<Tz>,
    ) -> Result<Vec<DayBucket>> {
        let sessions = self.store.sessions(user_id)?;
        Ok(session_heatmap(&sessions, day_count, now))
    }

    /// Total XP accrued in the current local ISO week.
    pub fn weekly_xp(&self, user_id: &str) -> Result<i64> {
        self.store
            .weekly_xp(user_id, iso_week_start(Local::now().date_naive()))
    }
}
