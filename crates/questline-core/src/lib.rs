//! # Questline Core Library
//!
//! This library provides the core business logic for Questline, a
//! gamified personal-productivity tracker: users capture unstructured
//! notes, triage them into tracked projects or a deferred backlog, run
//! timed focus sessions against projects, and earn experience points
//! (XP) that feed weekly progress analytics. All operations are
//! available through this library; presentation layers (CLI, GUI) are
//! thin collaborators that call the core's operations and render their
//! results.
//!
//! ## Architecture
//!
//! - **Triage State Machine**: one-way capture lifecycle with an
//!   oldest-first pending-queue cursor
//! - **Accrual Engine**: pure session-to-XP computation with a
//!   willpower-weighted difficulty model
//! - **Analytics Aggregator**: pure weekly-trend and heatmap
//!   derivations over session history
//! - **Cache Dependency Graph**: hierarchical view keys and a pure
//!   invalidation-set resolver consumed by the presentation cache
//! - **Storage**: SQLite-backed entity store and TOML configuration
//! - **Session Orchestrator**: [`Tracker`] composes the above with
//!   all-or-nothing write semantics
//!
//! ## Key Components
//!
//! - [`Tracker`]: the core's full boundary surface
//! - [`EntityStore`]: abstract store seam, implemented by [`Database`]
//! - [`accrual::evaluate`]: session XP and difficulty resolution
//! - [`invalidation_set_for`]: the cache contract surface

pub mod accrual;
pub mod cache;
pub mod capture;
pub mod error;
pub mod events;
pub mod ledger;
pub mod orchestrator;
pub mod project;
pub mod session;
pub mod stats;
pub mod storage;

pub use cache::{invalidation_set_for, MutationIds, MutationKind, ViewKey};
pub use capture::{Capture, Disposition, TriageAction, TriageQueue};
pub use error::{CoreError, DatabaseError, EntityKind, Result, ValidationError};
pub use events::Event;
pub use ledger::{iso_week_start, XpLedgerEntry, XpSource};
pub use orchestrator::Tracker;
pub use project::{Category, Priority, Project, ProjectStatus};
pub use session::{Session, Willpower};
pub use stats::{DayBucket, WeeklyBucket};
pub use storage::{Config, Database, EntityStore};
