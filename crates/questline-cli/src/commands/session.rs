use clap::Subcommand;
use questline_core::{Config, Willpower};

use super::open_tracker;

#[derive(Subcommand)]
pub enum SessionAction {
    /// Start a focus session
    Start {
        /// Attach the session to a project
        #[arg(long)]
        project: Option<String>,
        /// Willpower level: high, medium or low (defaults from config)
        #[arg(long)]
        willpower: Option<String>,
        /// Planned duration in minutes: 60, 90 or 120 (defaults from config)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Complete a session with its actual duration
    Complete {
        /// Session id
        id: String,
        /// Actual focused minutes
        minutes: i64,
    },
    /// List sessions
    List,
}

pub fn run(user: &str, action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;

    match action {
        SessionAction::Start {
            project,
            willpower,
            minutes,
        } => {
            let config = Config::load()?;
            let willpower = match willpower {
                Some(w) => w.parse::<Willpower>()?,
                None => config.session.willpower,
            };
            let minutes = minutes.unwrap_or(config.session.planned_minutes);
            let outcome = tracker.start_session(user, project.as_deref(), willpower, minutes)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        SessionAction::Complete { id, minutes } => {
            let outcome = tracker.complete_session(user, &id, minutes)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        SessionAction::List => {
            let sessions = tracker.sessions(user)?;
            println!("{}", serde_json::to_string_pretty(&sessions)?);
        }
    }
    Ok(())
}
