use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::{Disposition, TriageAction};

/// Every committed mutation produces an Event, returned to the caller
/// inside the operation outcome. The presentation layer consumes them;
/// the core never does.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    CaptureAdded {
        capture_id: String,
        at: DateTime<Utc>,
    },
    CaptureTriaged {
        capture_id: String,
        action: TriageAction,
        /// None when the capture row was deleted.
        new_disposition: Option<Disposition>,
        created_project_id: Option<String>,
        at: DateTime<Utc>,
    },
    SessionStarted {
        session_id: String,
        project_id: Option<String>,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        session_id: String,
        xp_awarded: i64,
        at: DateTime<Utc>,
    },
    ProjectCompleted {
        project_id: String,
        xp_awarded: i64,
        at: DateTime<Utc>,
    },
    ProjectAbandoned {
        project_id: String,
        at: DateTime<Utc>,
    },
}
