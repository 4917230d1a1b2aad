use clap::Subcommand;
use questline_core::TriageAction;

use super::open_tracker;

#[derive(Subcommand)]
pub enum CaptureAction {
    /// Capture a new note into the triage inbox
    Add {
        /// Note text
        content: String,
    },
    /// List all captures
    List,
    /// Triage a pending capture (track | parking | doing | routing | delete)
    Triage {
        /// One of: track, parking, doing, routing, delete
        action: String,
        /// Capture id; omit to triage the oldest pending capture
        #[arg(long)]
        id: Option<String>,
    },
    /// List the parking lot (deferred captures)
    Parked,
}

pub fn run(user: &str, action: CaptureAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;

    match action {
        CaptureAction::Add { content } => {
            let outcome = tracker.add_capture(user, &content)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        CaptureAction::List => {
            let captures = tracker.captures(user)?;
            println!("{}", serde_json::to_string_pretty(&captures)?);
        }
        CaptureAction::Triage { action, id } => {
            let action: TriageAction = action.parse()?;
            match id {
                Some(id) => {
                    let outcome = tracker.triage(user, &id, action)?;
                    println!("{}", serde_json::to_string_pretty(&outcome)?);
                }
                None => match tracker.triage_next(user, action)? {
                    Some(outcome) => println!("{}", serde_json::to_string_pretty(&outcome)?),
                    None => println!("nothing pending"),
                },
            }
        }
        CaptureAction::Parked => {
            let parked = tracker.parking_lot(user)?;
            println!("{}", serde_json::to_string_pretty(&parked)?);
        }
    }
    Ok(())
}
