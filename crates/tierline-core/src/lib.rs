//! # tierline-core
//!
//! The creator progress rules for Tierline - THE LOGIC.
//!
//! This crate turns creator records from a data source into the numbers a
//! creator dashboard shows: graduation tier progress, summary stats, bonus
//! earnings, open contests, upcoming battles and learning progress.
//!
//! ## Modules
//!
//! - `graduation`: tier bands and the progress calculator
//! - `stats`: the dashboard stat block
//! - `earnings`: bonus summary and open contests
//! - `learning`: 21-day challenge and education video rules
//! - `schedule`: upcoming battles and the 12-hour clock
//! - `source`: the `MetricsSource` input boundary
//! - `session`: the explicit per-viewer context
//!
//! ## Architectural Constraints
//!
//! - Has NO async, NO network dependencies (pure Rust)
//! - Integer arithmetic only; percentages are carried as basis points
//! - Never reads the clock: `now` / `today` are always passed in
//! - Read-only: operations return updated rows, nothing is written back

// =============================================================================
// MODULES
// =============================================================================

pub mod earnings;
pub mod graduation;
pub mod learning;
pub mod primitives;
pub mod schedule;
pub mod session;
pub mod source;
pub mod stats;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{CreatorHandle, CreatorId, CreatorMetrics, CreatorRecord, TierlineError};

// =============================================================================
// RE-EXPORTS: Calculators
// =============================================================================

pub use earnings::{
    BonusRecord, BonusStatus, BonusSummary, ContestRecord, format_cents, open_contests,
};
pub use graduation::{GraduationAssessor, ProgressReport, Thresholds, Tier, compute_progress};
pub use learning::{
    ChallengeBoard, ChallengeProgress, DayStatus, EducationProgress, EducationTrack, QuizOutcome,
    QuizQuestion, Video,
};
pub use schedule::{BattleRecord, UpcomingBattle, to_12_hour, upcoming_battles};
pub use stats::CreatorStats;

// =============================================================================
// RE-EXPORTS: Sources and Sessions
// =============================================================================

pub use session::Session;
pub use source::{MetricsSource, Snapshot, SnapshotFile};
