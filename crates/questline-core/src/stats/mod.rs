//! Analytics aggregator for Questline.
//!
//! Two independent, pure derivations over a user's session history:
//! weekly trend buckets and a trailing-day session heatmap. Both are
//! deterministic for a given input set and "now", and neither mutates
//! anything.

mod heatmap;
mod weekly_trend;

pub use heatmap::{session_heatmap, DayBucket, MAX_HEATMAP_DAYS};
pub use weekly_trend::{weekly_trend, WeeklyBucket, MAX_TREND_WEEKS};
