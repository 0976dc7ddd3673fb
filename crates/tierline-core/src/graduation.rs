//! # Graduation Assessment
//!
//! Converts a creator's lifetime diamonds into a tier and the progress
//! toward the next tier.
//!
//! ## Tier Bands
//!
//! | Current | Next   | Next threshold     | Percent measured as            |
//! |---------|--------|--------------------|--------------------------------|
//! | Rookie  | Silver | silver target      | total / silver                 |
//! | Silver  | Gold   | gold target        | (total - silver) / band width  |
//! | Gold    | Elite  | `ELITE_THRESHOLD`  | total / elite                  |
//!
//! Silver progress restarts at zero when the band is entered; Rookie and
//! Gold progress is measured against the whole value. Percentages are
//! integer basis points, clamped to `0..=MAX_BASIS_POINTS`.
//!
//! ## Misconfigured Targets
//!
//! A Gold target at or below the Silver target would produce a band of
//! zero or negative width. The assessor rejects it with
//! `TierlineError::InvalidThresholds` instead of reporting a wrong percent.

use crate::primitives::{
    DEFAULT_GOLD_TARGET, DEFAULT_SILVER_TARGET, ELITE_THRESHOLD, MAX_BASIS_POINTS,
};
use crate::{CreatorMetrics, TierlineError};
use serde::{Deserialize, Serialize};

// =============================================================================
// TIER ENUM
// =============================================================================

/// Graduation tiers, in program order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Rookie,
    Silver,
    Gold,
    Elite,
}

impl Tier {
    /// Get the tier name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Rookie => "Rookie",
            Tier::Silver => "Silver",
            Tier::Gold => "Gold",
            Tier::Elite => "Elite",
        }
    }

    /// Get the next tier, if any.
    #[must_use]
    pub fn next(&self) -> Option<Tier> {
        match self {
            Tier::Rookie => Some(Tier::Silver),
            Tier::Silver => Some(Tier::Gold),
            Tier::Gold => Some(Tier::Elite),
            Tier::Elite => None,
        }
    }

    /// Check if this tier is terminal (Elite).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Tier::Elite)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// THRESHOLDS
// =============================================================================

/// Resolved tier thresholds for one creator.
///
/// Always satisfies `0 < silver < gold`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    silver: u64,
    gold: u64,
}

impl Thresholds {
    /// Validate a pair of thresholds.
    pub fn new(silver: u64, gold: u64) -> Result<Self, TierlineError> {
        if silver == 0 || gold <= silver {
            return Err(TierlineError::InvalidThresholds { silver, gold });
        }
        Ok(Self { silver, gold })
    }

    #[must_use]
    pub fn silver(&self) -> u64 {
        self.silver
    }

    #[must_use]
    pub fn gold(&self) -> u64 {
        self.gold
    }

    /// Tier reached with `total` lifetime diamonds.
    ///
    /// Elite is never reported as current; reaching the Elite threshold
    /// only completes the Gold band.
    #[must_use]
    pub fn tier_for(&self, total: u64) -> Tier {
        if total >= self.gold {
            Tier::Gold
        } else if total >= self.silver {
            Tier::Silver
        } else {
            Tier::Rookie
        }
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            silver: DEFAULT_SILVER_TARGET,
            gold: DEFAULT_GOLD_TARGET,
        }
    }
}

// =============================================================================
// GRADUATION ASSESSOR
// =============================================================================

/// Graduation Assessor - pure function from metrics to progress.
///
/// Holds the program-wide default targets, used for creators whose record
/// carries no target of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraduationAssessor {
    defaults: Thresholds,
}

impl Default for GraduationAssessor {
    fn default() -> Self {
        Self::new()
    }
}

impl GraduationAssessor {
    /// Create a new assessor with the program default targets.
    #[must_use]
    pub fn new() -> Self {
        Self {
            defaults: Thresholds::default(),
        }
    }

    /// Create an assessor with custom default targets.
    pub fn with_default_targets(silver: u64, gold: u64) -> Result<Self, TierlineError> {
        Ok(Self {
            defaults: Thresholds::new(silver, gold)?,
        })
    }

    /// The default targets of this assessor.
    #[must_use]
    pub fn defaults(&self) -> Thresholds {
        self.defaults
    }

    /// Resolve the thresholds that apply to `metrics`.
    pub fn thresholds(&self, metrics: &CreatorMetrics) -> Result<Thresholds, TierlineError> {
        let silver = metrics.silver_target.unwrap_or(self.defaults.silver);
        let gold = metrics.gold_target.unwrap_or(self.defaults.gold);
        Thresholds::new(silver, gold)
    }

    /// Assess the current tier.
    pub fn assess_tier(&self, metrics: &CreatorMetrics) -> Result<Tier, TierlineError> {
        Ok(self.thresholds(metrics)?.tier_for(metrics.total_diamonds))
    }

    /// Get progress toward the next tier.
    pub fn assess(&self, metrics: &CreatorMetrics) -> Result<ProgressReport, TierlineError> {
        let thresholds = self.thresholds(metrics)?;
        let total = metrics.total_diamonds;
        let current = thresholds.tier_for(total);

        let (next, next_threshold, basis_points) = match current {
            Tier::Gold => (
                Tier::Elite,
                ELITE_THRESHOLD,
                basis_points(total, ELITE_THRESHOLD),
            ),
            Tier::Silver => (
                Tier::Gold,
                thresholds.gold,
                basis_points(
                    total.saturating_sub(thresholds.silver),
                    thresholds.gold - thresholds.silver,
                ),
            ),
            Tier::Rookie | Tier::Elite => (
                Tier::Silver,
                thresholds.silver,
                basis_points(total, thresholds.silver),
            ),
        };

        Ok(ProgressReport {
            current_tier: current,
            next_tier: next,
            basis_points,
            remaining: next_threshold.saturating_sub(total),
            next_threshold,
            total_diamonds: total,
            status_label: metrics.graduation_status_label.clone(),
        })
    }
}

/// Assess with the program default targets.
pub fn compute_progress(metrics: &CreatorMetrics) -> Result<ProgressReport, TierlineError> {
    GraduationAssessor::new().assess(metrics)
}

/// `part / whole` in basis points, clamped to `0..=MAX_BASIS_POINTS`.
fn basis_points(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return MAX_BASIS_POINTS;
    }
    let scaled = u128::from(part) * u128::from(MAX_BASIS_POINTS) / u128::from(whole);
    scaled.min(u128::from(MAX_BASIS_POINTS)) as u32
}

// =============================================================================
// PROGRESS REPORT
// =============================================================================

/// Progress information toward the next tier.
///
/// Derived on every read; never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub current_tier: Tier,
    pub next_tier: Tier,
    /// Progress through the current band, `0..=MAX_BASIS_POINTS`.
    pub basis_points: u32,
    /// Diamonds still needed to reach `next_threshold`.
    pub remaining: u64,
    pub next_threshold: u64,
    pub total_diamonds: u64,
    /// Display override from the creator record.
    pub status_label: Option<String>,
}

impl ProgressReport {
    /// Percent complete as a real number in `[0, 100]`.
    #[must_use]
    #[allow(clippy::float_arithmetic)]
    pub fn percent_complete(&self) -> f64 {
        f64::from(self.clamped_basis_points()) / 100.0
    }

    /// Percent rounded to one decimal, e.g. `"42.5"`.
    #[must_use]
    pub fn percent_display(&self) -> String {
        let tenths = (self.clamped_basis_points() + 5) / 10;
        format!("{}.{}", tenths / 10, tenths % 10)
    }

    /// `basis_points` capped at `MAX_BASIS_POINTS`; hand-built reports may exceed it.
    fn clamped_basis_points(&self) -> u32 {
        self.basis_points.min(MAX_BASIS_POINTS)
    }

    /// Label to show for the current tier: the override if present.
    ///
    /// Only the label is overridden; the numeric fields never change.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.status_label
            .as_deref()
            .unwrap_or_else(|| self.current_tier.name())
    }

    /// True once the next threshold has been reached.
    #[must_use]
    pub fn is_threshold_reached(&self) -> bool {
        self.remaining == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn assess(total: u64, silver: Option<u64>, gold: Option<u64>) -> ProgressReport {
        GraduationAssessor::new()
            .assess(&CreatorMetrics::with_total(total).targets(silver, gold))
            .expect("assess")
    }

    #[test]
    fn tier_ordering() {
        assert!(Tier::Rookie < Tier::Silver);
        assert!(Tier::Silver < Tier::Gold);
        assert!(Tier::Gold < Tier::Elite);
        assert_eq!(Tier::Gold.next(), Some(Tier::Elite));
        assert!(Tier::Elite.is_terminal());
    }

    #[test]
    fn zero_diamonds_is_rookie() {
        let report = assess(0, None, None);
        assert_eq!(report.current_tier, Tier::Rookie);
        assert_eq!(report.next_tier, Tier::Silver);
        assert_eq!(report.basis_points, 0);
        assert_eq!(report.remaining, DEFAULT_SILVER_TARGET);
    }

    #[test]
    fn rookie_progress_is_whole_value() {
        let report = assess(50_000, None, None);
        assert_eq!(report.basis_points, 2_500);
        assert_eq!(report.remaining, 150_000);
    }

    #[test]
    fn silver_boundary_starts_band_at_zero() {
        let report = assess(200_000, Some(200_000), Some(500_000));
        assert_eq!(report.current_tier, Tier::Silver);
        assert_eq!(report.basis_points, 0);
        assert_eq!(report.remaining, 300_000);
    }

    #[test]
    fn one_below_silver_stays_rookie() {
        let report = assess(199_999, None, None);
        assert_eq!(report.current_tier, Tier::Rookie);
        assert_eq!(report.remaining, 1);
        assert_eq!(report.basis_points, 9_999);
    }

    #[test]
    fn gold_band_measures_against_elite() {
        let report = assess(750_000, None, None);
        assert_eq!(report.current_tier, Tier::Gold);
        assert_eq!(report.next_threshold, ELITE_THRESHOLD);
        assert_eq!(report.basis_points, 7_500);
        assert_eq!(report.remaining, 250_000);
    }

    #[test]
    fn overshoot_clamps_to_full() {
        let report = assess(5_000_000, None, None);
        assert_eq!(report.basis_points, MAX_BASIS_POINTS);
        assert_eq!(report.remaining, 0);
        assert!(report.is_threshold_reached());
    }

    #[test]
    fn gold_not_above_silver_is_rejected() {
        let metrics = CreatorMetrics::with_total(10).targets(Some(500_000), Some(500_000));
        let result = GraduationAssessor::new().assess(&metrics);
        assert!(matches!(
            result,
            Err(TierlineError::InvalidThresholds {
                silver: 500_000,
                gold: 500_000
            })
        ));
    }

    #[test]
    fn one_sided_override_checks_against_default() {
        // A silver override above the default gold target is a misconfiguration.
        let metrics = CreatorMetrics::with_total(10).targets(Some(600_000), None);
        assert!(GraduationAssessor::new().assess(&metrics).is_err());
    }

    #[test]
    fn custom_defaults_apply() {
        let assessor = GraduationAssessor::with_default_targets(100, 300).expect("assessor");
        let report = assessor
            .assess(&CreatorMetrics::with_total(200))
            .expect("assess");
        assert_eq!(report.current_tier, Tier::Silver);
        assert_eq!(report.basis_points, 5_000);
    }

    #[test]
    fn invalid_custom_defaults_rejected() {
        assert!(GraduationAssessor::with_default_targets(0, 10).is_err());
        assert!(GraduationAssessor::with_default_targets(10, 5).is_err());
    }

    #[test]
    fn label_overrides_display_only() {
        let metrics = CreatorMetrics::with_total(0).label("Rookie (New)");
        let report = compute_progress(&metrics).expect("assess");
        assert_eq!(report.display_label(), "Rookie (New)");
        assert_eq!(report.current_tier, Tier::Rookie);
        assert_eq!(report.remaining, DEFAULT_SILVER_TARGET);
    }

    #[test]
    fn percent_display_rounds_to_tenths() {
        let mut report = assess(0, None, None);
        report.basis_points = 4_249;
        assert_eq!(report.percent_display(), "42.5");
        report.basis_points = 9_996;
        assert_eq!(report.percent_display(), "100.0");
        report.basis_points = 0;
        assert_eq!(report.percent_display(), "0.0");
    }

    #[test]
    fn out_of_range_basis_points_display_as_full() {
        let mut report = assess(0, None, None);
        report.basis_points = u32::MAX;
        assert_eq!(report.percent_display(), "100.0");
        assert_eq!(report.percent_complete(), 100.0);
    }
}
