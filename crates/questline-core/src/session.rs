//! Focus session entity and willpower levels.
//!
//! A session is created when a focus timer starts and mutated exactly
//! once on completion, when its duration is finalized and XP computed.
//! It is never mutated afterward.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, ValidationError};

/// Self-reported willpower reserve for a session.
///
/// Inversely related to the XP multiplier: a session run on low
/// willpower earns more per minute, rewarding effort under adversity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Willpower {
    High,
    Medium,
    Low,
}

impl Willpower {
    /// XP multiplier applied to the per-minute base.
    pub fn multiplier(&self) -> f64 {
        match self {
            Willpower::High => 1.0,
            Willpower::Medium => 1.5,
            Willpower::Low => 2.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Willpower::High => "high",
            Willpower::Medium => "medium",
            Willpower::Low => "low",
        }
    }
}

impl std::str::FromStr for Willpower {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "high" => Ok(Willpower::High),
            "medium" => Ok(Willpower::Medium),
            "low" => Ok(Willpower::Low),
            other => Err(format!("unknown willpower level '{other}'")),
        }
    }
}

/// Supported planned session lengths, in minutes.
pub const PLANNED_DURATIONS_MIN: [u32; 3] = [60, 90, 120];

/// Validate a planned duration against the supported set.
pub fn validate_planned_minutes(minutes: u32) -> Result<(), ValidationError> {
    if PLANNED_DURATIONS_MIN.contains(&minutes) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedPlannedDuration { minutes })
    }
}

/// A timed focus session, optionally attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier
    pub id: String,
    /// None for unattached focus time
    pub project_id: Option<String>,
    pub willpower: Willpower,
    pub planned_minutes: u32,
    /// Finalized on completion
    pub actual_minutes: Option<u32>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub completed: bool,
}

impl Session {
    /// Start a new session. Fails if the planned duration is unsupported.
    pub fn start(
        project_id: Option<String>,
        willpower: Willpower,
        planned_minutes: u32,
        started_at: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate_planned_minutes(planned_minutes)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            project_id,
            willpower,
            planned_minutes,
            actual_minutes: None,
            started_at,
            ended_at: None,
            completed: false,
        })
    }

    /// Finalize the session. A session completes at most once.
    pub fn complete(
        &mut self,
        actual_minutes: u32,
        ended_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        if self.completed {
            return Err(CoreError::InvalidState(format!(
                "session '{}' is already completed",
                self.id
            )));
        }
        self.actual_minutes = Some(actual_minutes);
        self.ended_at = Some(ended_at);
        self.completed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_willpower_multipliers() {
        assert_eq!(Willpower::High.multiplier(), 1.0);
        assert_eq!(Willpower::Medium.multiplier(), 1.5);
        assert_eq!(Willpower::Low.multiplier(), 2.0);
    }

    #[test]
    fn test_start_rejects_unsupported_duration() {
        let now = Utc::now();
        assert!(Session::start(None, Willpower::High, 60, now).is_ok());
        assert!(Session::start(None, Willpower::High, 90, now).is_ok());
        assert!(Session::start(None, Willpower::High, 120, now).is_ok());
        assert!(Session::start(None, Willpower::High, 45, now).is_err());
        assert!(Session::start(None, Willpower::High, 0, now).is_err());
    }

    #[test]
    fn test_complete_finalizes_once() {
        let now = Utc::now();
        let mut session = Session::start(None, Willpower::Medium, 90, now).unwrap();

        session.complete(85, now + Duration::minutes(85)).unwrap();
        assert!(session.completed);
        assert_eq!(session.actual_minutes, Some(85));

        let err = session.complete(85, now + Duration::minutes(90)).unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }
}
