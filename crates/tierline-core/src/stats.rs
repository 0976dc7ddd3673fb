//! # Creator Stats
//!
//! The dashboard summary for one creator: activity counters from the
//! rolling 30-day window plus the graduation report.

use crate::graduation::{GraduationAssessor, ProgressReport};
use crate::{CreatorMetrics, TierlineError};
use serde::{Deserialize, Serialize};

const SECONDS_PER_HOUR: u64 = 3600;

/// Dashboard summary for one creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorStats {
    pub monthly_diamonds: u64,
    pub total_diamonds: u64,
    pub diamonds_30d: u64,
    pub live_days: u32,
    /// Whole hours streamed in the last 30 days (rounded down).
    pub live_hours: u64,
    /// Live-day streak; the program counts live days in the 30-day window.
    pub streak: u32,
    pub graduation: ProgressReport,
}

impl CreatorStats {
    /// Build stats from metrics and an already computed report.
    #[must_use]
    pub fn from_metrics(metrics: &CreatorMetrics, graduation: ProgressReport) -> Self {
        Self {
            monthly_diamonds: metrics.monthly_diamonds,
            total_diamonds: metrics.total_diamonds,
            diamonds_30d: metrics.diamonds_30d,
            live_days: metrics.live_days_30d,
            live_hours: metrics.live_duration_seconds_30d / SECONDS_PER_HOUR,
            streak: metrics.live_days_30d,
            graduation,
        }
    }

    /// Assess graduation and build stats in one step.
    pub fn compute(
        assessor: &GraduationAssessor,
        metrics: &CreatorMetrics,
    ) -> Result<Self, TierlineError> {
        let graduation = assessor.assess(metrics)?;
        Ok(Self::from_metrics(metrics, graduation))
    }

    /// Label to show as the creator's current status.
    #[must_use]
    pub fn status_label(&self) -> &str {
        self.graduation.display_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graduation::Tier;

    fn metrics() -> CreatorMetrics {
        CreatorMetrics {
            total_diamonds: 350_000,
            monthly_diamonds: 42_000,
            diamonds_30d: 61_500,
            live_days_30d: 18,
            live_duration_seconds_30d: 3 * 3600 + 3599,
            ..CreatorMetrics::default()
        }
    }

    #[test]
    fn live_hours_round_down() {
        let stats = CreatorStats::compute(&GraduationAssessor::new(), &metrics()).expect("stats");
        assert_eq!(stats.live_hours, 3);
        assert_eq!(stats.live_days, 18);
        assert_eq!(stats.streak, 18);
        assert_eq!(stats.diamonds_30d, 61_500);
    }

    #[test]
    fn graduation_uses_intra_band_progress() {
        let stats = CreatorStats::compute(&GraduationAssessor::new(), &metrics()).expect("stats");
        assert_eq!(stats.graduation.current_tier, Tier::Silver);
        assert_eq!(stats.graduation.basis_points, 5_000);
        assert_eq!(stats.status_label(), "Silver");
    }

    #[test]
    fn invalid_thresholds_propagate() {
        let bad = metrics().targets(Some(10), Some(5));
        assert!(CreatorStats::compute(&GraduationAssessor::new(), &bad).is_err());
    }
}
