//! Capture lifecycle and the triage state machine.
//!
//! A capture is a raw, untriaged note. Triage assigns it exactly one
//! terminal disposition:
//!
//! ```text
//!              track              parking            doing / routing
//! PENDING ──────────> TRACKED     PENDING ─> PARKED  PENDING ─> DISMISSED
//!
//!              delete
//! PENDING ──────────> (row removed)
//! ```
//!
//! No transition ever returns to `pending`, and `tracked`, `parked` and
//! `dismissed` are terminal. Triage always processes the oldest pending
//! capture first; [`TriageQueue`] re-resolves its cursor against the
//! shrunk pending set after every transition so no capture is skipped
//! or repeated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::project::Project;

/// Disposition of a capture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Awaiting triage (initial state)
    Pending,
    /// Superseded by a tracked project
    Tracked,
    /// Deferred to the parking lot
    Parked,
    /// Discarded from the triage pipeline
    Dismissed,
}

impl Disposition {
    /// Check if a transition is valid. Only `pending` may move.
    pub fn can_transition_to(&self, to: &Disposition) -> bool {
        match self {
            Disposition::Pending => matches!(
                to,
                Disposition::Tracked | Disposition::Parked | Disposition::Dismissed
            ),
            Disposition::Tracked | Disposition::Parked | Disposition::Dismissed => false,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Disposition::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Pending => "pending",
            Disposition::Tracked => "tracked",
            Disposition::Parked => "parked",
            Disposition::Dismissed => "dismissed",
        }
    }
}

impl std::str::FromStr for Disposition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Disposition::Pending),
            "tracked" => Ok(Disposition::Tracked),
            "parked" => Ok(Disposition::Parked),
            "dismissed" => Ok(Disposition::Dismissed),
            other => Err(format!("unknown disposition '{other}'")),
        }
    }
}

/// One of the five triage actions against the current pending capture.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TriageAction {
    /// Create a project seeded from the capture's content
    Track,
    /// Defer the capture to the parking lot
    Parking,
    /// The work is being done immediately, outside tracked projects
    Doing,
    /// Hand the capture to an external system (placeholder, see below)
    Routing,
    /// Remove the capture entirely
    Delete,
}

impl TriageAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriageAction::Track => "track",
            TriageAction::Parking => "parking",
            TriageAction::Doing => "doing",
            TriageAction::Routing => "routing",
            TriageAction::Delete => "delete",
        }
    }
}

impl std::str::FromStr for TriageAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "track" => Ok(TriageAction::Track),
            "parking" => Ok(TriageAction::Parking),
            "doing" => Ok(TriageAction::Doing),
            "routing" => Ok(TriageAction::Routing),
            "delete" => Ok(TriageAction::Delete),
            other => Err(format!("unknown triage action '{other}'")),
        }
    }
}

/// The effect a triage action has on a pending capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageEffect {
    /// Create a project from the capture's content; capture becomes `tracked`.
    Track,
    /// Capture becomes `parked` with a parked timestamp.
    Park,
    /// Capture becomes `dismissed`; nothing else happens.
    Dismiss,
    /// Capture row is removed; no terminal disposition needed.
    Remove,
}

/// Resolve the effect of a triage action.
///
/// Total over the five actions: every action maps to exactly one effect.
pub fn effect_of(action: TriageAction) -> TriageEffect {
    match action {
        TriageAction::Track => TriageEffect::Track,
        TriageAction::Parking => TriageEffect::Park,
        TriageAction::Doing => TriageEffect::Dismiss,
        // Routing will hand the capture off to an external system once
        // that integration exists. Until then it dismisses like `doing`,
        // but it stays a separate arm: collapsing the two would force a
        // state-machine rewrite when the handoff lands.
        TriageAction::Routing => TriageEffect::Dismiss,
        TriageAction::Delete => TriageEffect::Remove,
    }
}

/// A raw, untriaged user note awaiting disposition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capture {
    /// Unique identifier
    pub id: String,
    /// Raw note text
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub disposition: Disposition,
    /// Set when the capture enters the parking lot
    pub parked_at: Option<DateTime<Utc>>,
}

impl Capture {
    /// Create a new pending capture.
    pub fn new(content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            created_at,
            disposition: Disposition::Pending,
            parked_at: None,
        }
    }
}

/// A triage transition ready to be committed to the store atomically.
///
/// Produced by [`plan_triage`], consumed by
/// [`EntityStore::apply_triage`](crate::storage::EntityStore::apply_triage).
#[derive(Debug, Clone)]
pub enum TriageCommit {
    /// Write back the capture with its new terminal disposition.
    Update(Capture),
    /// Write back the capture and insert the project created from it.
    Track(Capture, Project),
    /// Remove the capture row.
    Delete { capture_id: String },
}

impl TriageCommit {
    /// The disposition the capture ends in, if it still exists.
    pub fn new_disposition(&self) -> Option<Disposition> {
        match self {
            TriageCommit::Update(c) | TriageCommit::Track(c, _) => Some(c.disposition),
            TriageCommit::Delete { .. } => None,
        }
    }

    /// Id of the project created by a `track` action, if any.
    pub fn created_project_id(&self) -> Option<&str> {
        match self {
            TriageCommit::Track(_, project) => Some(&project.id),
            _ => None,
        }
    }
}

/// Plan the triage transition for a pending capture.
///
/// Pure: the returned [`TriageCommit`] describes every side effect, and
/// nothing is persisted until the store applies it. The caller must have
/// verified that `capture.disposition` is `pending`.
pub fn plan_triage(mut capture: Capture, action: TriageAction, now: DateTime<Utc>) -> TriageCommit {
    match effect_of(action) {
        TriageEffect::Track => {
            let project = Project::from_capture(&capture, now);
            capture.disposition = Disposition::Tracked;
            TriageCommit::Track(capture, project)
        }
        TriageEffect::Park => {
            capture.disposition = Disposition::Parked;
            capture.parked_at = Some(now);
            TriageCommit::Update(capture)
        }
        TriageEffect::Dismiss => {
            capture.disposition = Disposition::Dismissed;
            TriageCommit::Update(capture)
        }
        TriageEffect::Remove => TriageCommit::Delete {
            capture_id: capture.id,
        },
    }
}

/// Cursor over a user's pending captures, oldest first.
///
/// The queue holds only pending captures in stable creation order. After
/// any transition the caller removes the transitioned capture and the
/// cursor re-resolves to the new head, so index drift can never skip or
/// repeat an item. An empty queue is a no-op terminal state, not an error.
#[derive(Debug, Clone)]
pub struct TriageQueue {
    captures: Vec<Capture>,
}

impl TriageQueue {
    /// Build a queue from a capture set, keeping only pending ones.
    pub fn new(mut captures: Vec<Capture>) -> Self {
        captures.retain(|c| c.disposition == Disposition::Pending);
        // Stable oldest-first order; id breaks creation-time ties.
        captures.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Self { captures }
    }

    /// The capture the cursor currently points at.
    pub fn current(&self) -> Option<&Capture> {
        self.captures.first()
    }

    /// Drop a capture after it transitioned out of `pending`.
    pub fn remove(&mut self, capture_id: &str) {
        self.captures.retain(|c| c.id != capture_id);
    }

    pub fn len(&self) -> usize {
        self.captures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }
}
