//! # Program Constants
//!
//! Fixed rules of the creator program, compiled into the binary.
//!
//! ## Groups
//!
//! 1. **Graduation**: tier thresholds and the fixed-point percent scale.
//! 2. **Learning**: challenge length, watch and quiz gates.
//! 3. **Input limits**: bounds on handles, lists and snapshot files.

// =============================================================================
// GRADUATION
// =============================================================================

/// Silver threshold applied when a creator record carries none.
pub const DEFAULT_SILVER_TARGET: u64 = 200_000;

/// Gold threshold applied when a creator record carries none.
pub const DEFAULT_GOLD_TARGET: u64 = 500_000;

/// Fixed threshold of the Gold -> Elite band.
///
/// Unlike Silver and Gold, this is not configurable per creator.
pub const ELITE_THRESHOLD: u64 = 1_000_000;

/// Percent values are carried as basis points (hundredths of a percent).
///
/// `10_000` basis points == 100%.
pub const MAX_BASIS_POINTS: u32 = 10_000;

// =============================================================================
// LEARNING
// =============================================================================

/// Number of days in the learning challenge.
pub const CHALLENGE_DAYS: u32 = 21;

/// Watch percentage at which a video counts as completed and its quiz opens.
pub const WATCH_UNLOCK_PERCENT: u8 = 90;

/// Minimum quiz score (percent) required to pass.
pub const QUIZ_PASS_PERCENT: u8 = 70;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length of a creator handle, in characters.
pub const MAX_HANDLE_LENGTH: usize = 64;

/// Only this many of the most recent bonuses feed the summary.
pub const BONUS_HISTORY_LIMIT: usize = 10;

/// Maximum number of upcoming battles returned for one creator.
pub const UPCOMING_BATTLE_LIMIT: usize = 10;

/// Maximum size of a snapshot file (64 MiB).
///
/// Snapshot files are re-read on every fetch, so keep them bounded.
pub const MAX_SNAPSHOT_FILE_SIZE: u64 = 64 * 1024 * 1024;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_are_ordered() {
        assert!(DEFAULT_SILVER_TARGET < DEFAULT_GOLD_TARGET);
        assert!(DEFAULT_GOLD_TARGET < ELITE_THRESHOLD);
    }

    #[test]
    fn basis_point_scale_is_hundredths() {
        assert_eq!(MAX_BASIS_POINTS, 100 * 100);
    }
}
