//! # Earnings
//!
//! Bonus payouts and regional contests.
//!
//! All amounts are integer cents. Time is passed in by the caller so the
//! same inputs always produce the same summary.

use crate::CreatorId;
use crate::primitives::BONUS_HISTORY_LIMIT;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// BONUS RECORDS
// =============================================================================

/// Payout state of a bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum BonusStatus {
    Pending,
    Approved,
    Paid,
    /// Any status this program does not know about; never counted.
    #[serde(other)]
    Unknown,
}

impl BonusStatus {
    /// Pending and approved bonuses are still owed.
    #[must_use]
    pub fn is_outstanding(&self) -> bool {
        matches!(self, BonusStatus::Pending | BonusStatus::Approved)
    }
}

/// A bonus row for one payout period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusRecord {
    pub id: String,
    pub creator_id: CreatorId,
    pub bonus_cents: u64,
    pub status: BonusStatus,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub diamonds: u64,
}

// =============================================================================
// BONUS SUMMARY
// =============================================================================

/// Earnings overview shown on the bonuses screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusSummary {
    /// Paid bonuses whose period starts in the current calendar month.
    pub earned_this_month_cents: u64,
    /// Pending and approved bonuses.
    pub pending_cents: u64,
    /// Payment time of the most recent paid bonus.
    pub last_payout: Option<DateTime<Utc>>,
    /// Number of bonuses that fed the summary.
    pub counted: usize,
}

impl BonusSummary {
    /// Summarize the `BONUS_HISTORY_LIMIT` most recent bonuses.
    ///
    /// Recency is by `period_start`, newest first; older bonuses are ignored
    /// entirely, including for the pending total.
    #[must_use]
    pub fn compute(bonuses: &[BonusRecord], now: DateTime<Utc>) -> Self {
        let mut recent: Vec<&BonusRecord> = bonuses.iter().collect();
        recent.sort_by(|a, b| b.period_start.cmp(&a.period_start));
        recent.truncate(BONUS_HISTORY_LIMIT);

        let today = now.date_naive();
        let in_current_month = |date: NaiveDate| {
            date.year() == today.year() && date.month() == today.month()
        };

        let earned_this_month_cents = recent
            .iter()
            .filter(|b| b.status == BonusStatus::Paid && in_current_month(b.period_start))
            .fold(0u64, |sum, b| sum.saturating_add(b.bonus_cents));

        let pending_cents = recent
            .iter()
            .filter(|b| b.status.is_outstanding())
            .fold(0u64, |sum, b| sum.saturating_add(b.bonus_cents));

        let last_payout = recent
            .iter()
            .filter(|b| b.status == BonusStatus::Paid)
            .find_map(|b| b.paid_at);

        Self {
            earned_this_month_cents,
            pending_cents,
            last_payout,
            counted: recent.len(),
        }
    }

    /// Last payout date for display, e.g. `"2024-05-31"`.
    #[must_use]
    pub fn last_payout_display(&self) -> String {
        self.last_payout
            .map(|at| at.date_naive().to_string())
            .unwrap_or_else(|| "No payouts yet".to_string())
    }
}

/// Format cents as dollars, e.g. `1234` -> `"$12.34"`.
#[must_use]
pub fn format_cents(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

// =============================================================================
// CONTESTS
// =============================================================================

/// A time-boxed contest, optionally limited to one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// `None` means the contest is open in every region.
    #[serde(default)]
    pub region: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default)]
    pub prize_cents: u64,
}

/// Contests a creator in `region` can still take part in, soonest first.
///
/// A creator without a region only sees region-less contests.
#[must_use]
pub fn open_contests(
    contests: &[ContestRecord],
    region: Option<&str>,
    now: DateTime<Utc>,
) -> Vec<ContestRecord> {
    let mut open: Vec<ContestRecord> = contests
        .iter()
        .filter(|c| match c.region.as_deref() {
            None => true,
            Some(contest_region) => region == Some(contest_region),
        })
        .filter(|c| c.end_at >= now)
        .cloned()
        .collect();
    open.sort_by(|a, b| a.start_at.cmp(&b.start_at).then_with(|| a.id.cmp(&b.id)));
    open
}

// =============================================================================
// TESTS
// =============================================================================
