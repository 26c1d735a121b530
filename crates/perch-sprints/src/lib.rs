//! # perch-sprints
//!
//! Writing-sprint storage and analytics. Sprint metadata lives in a per-user
//! append-only log; sprint text is stored apart from the metadata, one file
//! per sprint. Streaks and windowed progress stats are computed over the
//! reconstructed history with calendar-day boundaries taken in the caller's
//! timezone.

pub mod analytics;
mod error;
mod store;
mod types;

pub use analytics::{
    best_sprint, current_streak, duration_minutes, longest_streak, progress, resolve_timezone,
};
pub use error::SprintError;
pub use store::SprintStore;
pub use types::{
    BestCategory, InvalidCategory, InvalidRange, ProgressRange, ProgressStats, Sprint,
};
