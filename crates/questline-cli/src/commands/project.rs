use clap::Subcommand;
use questline_core::{Category, Priority};

use super::open_tracker;

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project directly (outside triage)
    Add {
        /// Project title
        title: String,
        /// Category: work, learn, build or manage
        #[arg(long, default_value = "work")]
        category: String,
        /// Priority: must, should or nice
        #[arg(long, default_value = "should")]
        priority: String,
        /// Effort estimate, 1-10
        #[arg(long, default_value_t = 5)]
        cost: u8,
        /// Value estimate, 1-10
        #[arg(long, default_value_t = 5)]
        benefit: u8,
    },
    /// List projects
    List,
    /// Complete a project (terminal, awards XP)
    Complete {
        /// Project id
        id: String,
    },
    /// Abandon a project (terminal, no XP)
    Abandon {
        /// Project id
        id: String,
    },
}

pub fn run(user: &str, action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut tracker = open_tracker()?;

    match action {
        ProjectAction::Add {
            title,
            category,
            priority,
            cost,
            benefit,
        } => {
            let category: Category = category.parse()?;
            let priority: Priority = priority.parse()?;
            let outcome = tracker.add_project(user, &title, category, priority, cost, benefit)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ProjectAction::List => {
            let projects = tracker.projects(user)?;
            println!("{}", serde_json::to_string_pretty(&projects)?);
        }
        ProjectAction::Complete { id } => {
            let outcome = tracker.complete_project(user, &id)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        ProjectAction::Abandon { id } => {
            let outcome = tracker.abandon_project(user, &id)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}
