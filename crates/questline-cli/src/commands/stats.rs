use clap::Subcommand;
use questline_core::Config;

use super::open_tracker;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Weekly trend buckets (sessions, hours, XP per ISO week)
    Trend {
        /// Number of weeks (defaults from config)
        #[arg(long)]
        weeks: Option<usize>,
    },
    /// Daily session heatmap for a trailing window
    Heatmap {
        /// Number of days (defaults from config)
        #[arg(long)]
        days: Option<usize>,
    },
    /// XP accrued this ISO week
    Xp,
}

pub fn run(user: &str, action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let tracker = open_tracker()?;
    let config = Config::load()?;

    match action {
        StatsAction::Trend { weeks } => {
            let weeks = weeks.unwrap_or(config.analytics.trend_weeks);
            let buckets = tracker.weekly_trend(user, weeks)?;
            println!("{}", serde_json::to_string_pretty(&buckets)?);
        }
        StatsAction::Heatmap { days } => {
            let days = days.unwrap_or(config.analytics.heatmap_days);
            let buckets = tracker.heatmap(user, days)?;
            println!("{}", serde_json::to_string_pretty(&buckets)?);
        }
        StatsAction::Xp => {
            let total = tracker.weekly_xp(user)?;
            println!("{}", serde_json::to_string(&total)?);
        }
    }
    Ok(())
}
