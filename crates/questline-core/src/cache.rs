//! Hierarchical cache dependency graph.
//!
//! Cached views form a strict namespace: entity class, then user scope,
//! then specific view (`sessions/u1/today`). Invalidating a key also
//! invalidates everything nested beneath it, so "all session views for
//! user u1" is the single key `sessions/u1` rather than an enumeration.
//!
//! [`invalidation_set_for`] is the public contract: a total, pure
//! function from a mutation kind to the set of view keys that must be
//! recomputed. It may over-invalidate a sibling that happens not to have
//! changed, but it never under-invalidates. The core computes these sets
//! for the presentation layer's cache and never consumes them itself.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A hierarchical cache view key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewKey(Vec<String>);

impl ViewKey {
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ViewKey(segments.into_iter().map(Into::into).collect())
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when invalidating `self` also invalidates `other`,
    /// i.e. `self` is a (non-strict) prefix of `other`.
    pub fn covers(&self, other: &ViewKey) -> bool {
        other.0.len() >= self.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    // ── Well-known keys ──────────────────────────────────────────────

    /// All session views for a user.
    pub fn sessions(user_id: &str) -> Self {
        Self::from_segments(["sessions", user_id])
    }

    /// All XP views for a user.
    pub fn xp(user_id: &str) -> Self {
        Self::from_segments(["xp", user_id])
    }

    /// All analytics views (trend, heatmap, gauges) for a user.
    pub fn analytics(user_id: &str) -> Self {
        Self::from_segments(["analytics", user_id])
    }

    /// Achievement views (shared across derived badges).
    pub fn achievements() -> Self {
        Self::from_segments(["achievements"])
    }

    /// All project views.
    pub fn projects() -> Self {
        Self::from_segments(["projects"])
    }

    /// One specific project's view.
    pub fn project(project_id: &str) -> Self {
        Self::from_segments(["projects", project_id])
    }

    /// Legacy weekly-XP view kept alive for older dashboards.
    pub fn weekly_xp() -> Self {
        Self::from_segments(["weekly-xp"])
    }

    /// Capture list views for a user.
    pub fn captures(user_id: &str) -> Self {
        Self::from_segments(["captures", user_id])
    }

    /// The pending-capture (triage queue) view for a user.
    pub fn pending_captures(user_id: &str) -> Self {
        Self::from_segments(["captures", user_id, "pending"])
    }
}

impl fmt::Display for ViewKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Kinds of mutation the core can commit.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    SessionStarted,
    SessionCompleted,
    ProjectCreated,
    ProjectCompleted,
    ProjectAbandoned,
    CaptureCreated,
    CaptureTriaged,
}

/// Identifiers a mutation carries into invalidation resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationIds<'a> {
    pub user_id: Option<&'a str>,
    pub project_id: Option<&'a str>,
}

impl<'a> MutationIds<'a> {
    pub fn for_user(user_id: &'a str) -> Self {
        Self {
            user_id: Some(user_id),
            project_id: None,
        }
    }

    pub fn with_project(mut self, project_id: &'a str) -> Self {
        self.project_id = Some(project_id);
        self
    }
}

/// Resolve the set of cached view keys stale after a mutation.
///
/// Total over [`MutationKind`]; missing identifiers simply narrow the
/// set rather than failing. Specific keys already covered by a broader
/// key in the same set (e.g. `projects/p1` under `projects`) are still
/// listed explicitly, since flat caches match keys exactly.
pub fn invalidation_set_for(kind: MutationKind, ids: &MutationIds) -> BTreeSet<ViewKey> {
    let mut set = BTreeSet::new();
    match kind {
        MutationKind::SessionStarted => {
            if let Some(user) = ids.user_id {
                set.insert(ViewKey::sessions(user));
            }
        }
        MutationKind::SessionCompleted => {
            if let Some(user) = ids.user_id {
                set.insert(ViewKey::sessions(user));
                set.insert(ViewKey::xp(user));
                set.insert(ViewKey::analytics(user));
            }
            set.insert(ViewKey::achievements());
        }
        MutationKind::ProjectCreated => {
            set.insert(ViewKey::projects());
            if let Some(project) = ids.project_id {
                set.insert(ViewKey::project(project));
            }
        }
        MutationKind::ProjectCompleted => {
            set.insert(ViewKey::projects());
            if let Some(project) = ids.project_id {
                set.insert(ViewKey::project(project));
            }
            set.insert(ViewKey::weekly_xp());
            set.insert(ViewKey::achievements());
        }
        MutationKind::ProjectAbandoned => {
            set.insert(ViewKey::projects());
            if let Some(project) = ids.project_id {
                set.insert(ViewKey::project(project));
            }
        }
        MutationKind::CaptureCreated | MutationKind::CaptureTriaged => {
            if let Some(user) = ids.user_id {
                set.insert(ViewKey::captures(user));
                set.insert(ViewKey::pending_captures(user));
            }
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_is_prefix_based() {
        let sessions = ViewKey::sessions("u1");
        let today = ViewKey::from_segments(["sessions", "u1", "today"]);
        let history = ViewKey::from_segments(["sessions", "u1", "history"]);
        let other_user = ViewKey::sessions("u2");

        assert!(sessions.covers(&today));
        assert!(sessions.covers(&history));
        assert!(sessions.covers(&sessions));
        assert!(!sessions.covers(&other_user));
        assert!(!today.covers(&sessions));
    }

    #[test]
    fn test_session_completed_contract() {
        let ids = MutationIds::for_user("u1");
        let set = invalidation_set_for(MutationKind::SessionCompleted, &ids);

        assert!(set.contains(&ViewKey::sessions("u1")));
        assert!(set.contains(&ViewKey::xp("u1")));
        assert!(set.contains(&ViewKey::analytics("u1")));
        assert!(set.contains(&ViewKey::achievements()));
        // Nested views are covered without explicit enumeration.
        let todays = ViewKey::from_segments(["sessions", "u1", "today"]);
        assert!(set.iter().any(|k| k.covers(&todays)));
        // Unrelated users and entities stay untouched.
        assert!(!set.iter().any(|k| k.covers(&ViewKey::sessions("u2"))));
        assert!(!set.contains(&ViewKey::captures("u1")));
    }

    #[test]
    fn test_project_completed_contract() {
        let ids = MutationIds::for_user("u1").with_project("p1");
        let set = invalidation_set_for(MutationKind::ProjectCompleted, &ids);

        assert!(set.contains(&ViewKey::projects()));
        assert!(set.contains(&ViewKey::project("p1")));
        assert!(set.contains(&ViewKey::weekly_xp()));
        assert!(set.contains(&ViewKey::achievements()));
        assert!(!set.contains(&ViewKey::captures("u1")));
    }

    #[test]
    fn test_capture_mutations_contract() {
        for kind in [MutationKind::CaptureCreated, MutationKind::CaptureTriaged] {
            let set = invalidation_set_for(kind, &MutationIds::for_user("u1"));
            assert!(set.contains(&ViewKey::captures("u1")));
            assert!(set.contains(&ViewKey::pending_captures("u1")));
            assert!(!set.contains(&ViewKey::sessions("u1")));
        }
    }

    #[test]
    fn test_resolver_is_total_even_without_ids() {
        let empty = MutationIds::default();
        for kind in [
            MutationKind::SessionStarted,
            MutationKind::SessionCompleted,
            MutationKind::ProjectCreated,
            MutationKind::ProjectCompleted,
            MutationKind::ProjectAbandoned,
            MutationKind::CaptureCreated,
            MutationKind::CaptureTriaged,
        ] {
            // Must not panic; narrower sets are acceptable.
            let _ = invalidation_set_for(kind, &empty);
        }
    }

    #[test]
    fn test_view_key_display() {
        assert_eq!(ViewKey::pending_captures("u1").to_string(), "captures/u1/pending");
        assert_eq!(ViewKey::weekly_xp().to_string(), "weekly-xp");
    }
}
