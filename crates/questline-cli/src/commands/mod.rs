pub mod capture;
pub mod project;
pub mod session;
pub mod stats;

use questline_core::{Database, Tracker};

/// Open the tracker over the on-disk database.
pub fn open_tracker() -> Result<Tracker<Database>, Box<dyn std::error::Error>> {
    Ok(Tracker::new(Database::open()?))
}
