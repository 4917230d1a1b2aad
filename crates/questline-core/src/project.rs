//! Project entity and status lifecycle.
//!
//! A project is tracked work with a cost/benefit estimate. Status moves
//! `active -> completed` or `active -> abandoned`; both are terminal and
//! completion is irreversible. Completing a project emits exactly one
//! XP ledger entry sized by [`Project::completion_xp`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::capture::Capture;
use crate::error::ValidationError;

/// Project category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Work,
    Learn,
    Build,
    Manage,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "work",
            Category::Learn => "learn",
            Category::Build => "build",
            Category::Manage => "manage",
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "work" => Ok(Category::Work),
            "learn" => Ok(Category::Learn),
            "build" => Ok(Category::Build),
            "manage" => Ok(Category::Manage),
            other => Err(format!("unknown category '{other}'")),
        }
    }
}

/// Project priority.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Must,
    Should,
    Nice,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Must => "must",
            Priority::Should => "should",
            Priority::Nice => "nice",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "must" => Ok(Priority::Must),
            "should" => Ok(Priority::Should),
            "nice" => Ok(Priority::Nice),
            other => Err(format!("unknown priority '{other}'")),
        }
    }
}

/// Project status. `completed` and `abandoned` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Completed,
    Abandoned,
}

impl ProjectStatus {
    /// Check if a transition is valid. `completed -> *` is forbidden.
    pub fn can_transition_to(&self, to: &ProjectStatus) -> bool {
        match self {
            ProjectStatus::Active => {
                matches!(to, ProjectStatus::Completed | ProjectStatus::Abandoned)
            }
            ProjectStatus::Completed | ProjectStatus::Abandoned => false,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "active",
            ProjectStatus::Completed => "completed",
            ProjectStatus::Abandoned => "abandoned",
        }
    }
}

impl std::str::FromStr for ProjectStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ProjectStatus::Active),
            "completed" => Ok(ProjectStatus::Completed),
            "abandoned" => Ok(ProjectStatus::Abandoned),
            other => Err(format!("unknown project status '{other}'")),
        }
    }
}

/// Allowed range for cost and benefit estimates.
pub const ESTIMATE_MIN: u8 = 1;
pub const ESTIMATE_MAX: u8 = 10;

/// Tracked work with cost/benefit estimates and a one-way status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Unique identifier
    pub id: String,
    pub title: String,
    pub category: Category,
    pub priority: Priority,
    /// Effort estimate, 1-10
    pub cost: u8,
    /// Value estimate, 1-10
    pub benefit: u8,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Project {
    /// Create a new active project, validating estimate ranges.
    pub fn new(
        title: impl Into<String>,
        category: Category,
        priority: Priority,
        cost: u8,
        benefit: u8,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::Empty("title"));
        }
        validate_estimate("cost", cost)?;
        validate_estimate("benefit", benefit)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            title,
            category,
            priority,
            cost,
            benefit,
            status: ProjectStatus::Active,
            created_at,
            completed_at: None,
        })
    }

    /// Seed a project from a tracked capture.
    ///
    /// Triage only has the raw note text, so the project starts with
    /// middle-of-the-road estimates the user refines later.
    pub fn from_capture(capture: &Capture, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: capture.content.trim().to_string(),
            category: Category::Work,
            priority: Priority::Should,
            cost: 5,
            benefit: 5,
            status: ProjectStatus::Active,
            created_at: now,
            completed_at: None,
        }
    }

    /// XP awarded when this project completes.
    ///
    /// House rule: value-weighted with a smaller effort bonus, so high
    /// benefit always beats high cost at the same total.
    pub fn completion_xp(&self) -> i64 {
        self.benefit as i64 * 10 + self.cost as i64 * 5
    }
}

fn validate_estimate(field: &'static str, value: u8) -> Result<(), ValidationError> {
    if !(ESTIMATE_MIN..=ESTIMATE_MAX).contains(&value) {
        return Err(ValidationError::OutOfRange {
            field,
            value: value as i64,
            min: ESTIMATE_MIN as i64,
            max: ESTIMATE_MAX as i64,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        assert!(ProjectStatus::Active.can_transition_to(&ProjectStatus::Completed));
        assert!(ProjectStatus::Active.can_transition_to(&ProjectStatus::Abandoned));
        assert!(!ProjectStatus::Completed.can_transition_to(&ProjectStatus::Active));
        assert!(!ProjectStatus::Completed.can_transition_to(&ProjectStatus::Abandoned));
        assert!(!ProjectStatus::Abandoned.can_transition_to(&ProjectStatus::Completed));
    }

    #[test]
    fn test_new_validates_estimates() {
        let now = Utc::now();
        assert!(Project::new("ok", Category::Work, Priority::Must, 1, 10, now).is_ok());
        assert!(Project::new("low", Category::Work, Priority::Must, 0, 5, now).is_err());
        assert!(Project::new("high", Category::Work, Priority::Must, 5, 11, now).is_err());
        assert!(Project::new("  ", Category::Work, Priority::Must, 5, 5, now).is_err());
    }

    #[test]
    fn test_from_capture_seeds_title() {
        let now = Utc::now();
        let capture = Capture::new("  write the proposal  ", now);
        let project = Project::from_capture(&capture, now);

        assert_eq!(project.title, "write the proposal");
        assert_eq!(project.status, ProjectStatus::Active);
        assert!(project.completed_at.is_none());
    }

    #[test]
    fn test_completion_xp_weighs_benefit_over_cost() {
        let now = Utc::now();
        let valuable = Project::new("v", Category::Build, Priority::Must, 2, 9, now).unwrap();
        let costly = Project::new("c", Category::Build, Priority::Must, 9, 2, now).unwrap();

        assert_eq!(valuable.completion_xp(), 100);
        assert_eq!(costly.completion_xp(), 65);
        assert!(valuable.completion_xp() > costly.completion_xp());
    }
}
