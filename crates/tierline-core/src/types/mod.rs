//! # Core Type Definitions
//!
//! This module contains the shared types for Tierline:
//! - Creator identifiers (`CreatorId`, `CreatorHandle`)
//! - The raw creator row as delivered by the data service (`CreatorRecord`)
//! - The normalized, read-only metrics snapshot (`CreatorMetrics`)
//! - Error types (`TierlineError`)
//!
//! ## Normalization Rules
//!
//! Raw rows use nullable signed columns. Normalization guarantees:
//! - Counters are never negative (null or negative becomes 0)
//! - A null or zero target is absent and the program default applies
//! - A negative target is rejected, never silently defaulted

use crate::primitives::MAX_HANDLE_LENGTH;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CREATOR IDENTIFIERS
// =============================================================================

/// Primary key of a creator row in the data service.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CreatorId(pub String);

impl CreatorId {
    /// Create a new creator id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CreatorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Public handle of a creator, without the leading `@`.
///
/// The stable lookup key for creator records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CreatorHandle(String);

impl CreatorHandle {
    /// Parse a handle, accepting an optional leading `@`.
    ///
    /// Rejects empty handles, handles longer than `MAX_HANDLE_LENGTH`
    /// characters and handles containing whitespace.
    pub fn parse(raw: &str) -> Result<Self, TierlineError> {
        let trimmed = raw.trim();
        let handle = trimmed.strip_prefix('@').unwrap_or(trimmed);

        if handle.is_empty() {
            return Err(TierlineError::InvalidHandle(raw.to_string()));
        }
        if handle.chars().count() > MAX_HANDLE_LENGTH {
            return Err(TierlineError::InvalidHandle(format!(
                "handle exceeds {} characters",
                MAX_HANDLE_LENGTH
            )));
        }
        if handle.chars().any(char::is_whitespace) {
            return Err(TierlineError::InvalidHandle(raw.to_string()));
        }

        Ok(Self(handle.to_string()))
    }

    /// Get the handle as a string slice (no `@`).
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CreatorHandle {
    type Error = TierlineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl std::str::FromStr for CreatorHandle {
    type Err = TierlineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<CreatorHandle> for String {
    fn from(handle: CreatorHandle) -> Self {
        handle.0
    }
}

impl std::fmt::Display for CreatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

// =============================================================================
// CREATOR RECORD (RAW ROW)
// =============================================================================

/// A creator row exactly as the data service returns it.
///
/// Numeric columns are nullable and signed; use [`CreatorMetrics::from_record`]
/// before doing any arithmetic. The handle is kept as stored and validated by
/// [`CreatorRecord::handle`], so one bad row does not spoil a whole table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatorRecord {
    pub id: CreatorId,
    pub creator_handle: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub creator_type: Option<Vec<String>>,
    #[serde(default)]
    pub diamonds_monthly: Option<i64>,
    #[serde(default)]
    pub total_diamonds: Option<i64>,
    #[serde(default)]
    pub diamonds_30d: Option<i64>,
    #[serde(default)]
    pub live_days_30d: Option<i64>,
    #[serde(default)]
    pub live_duration_seconds_30d: Option<i64>,
    #[serde(default)]
    pub graduation_status: Option<String>,
    #[serde(default)]
    pub silver_target: Option<i64>,
    #[serde(default)]
    pub gold_target: Option<i64>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl CreatorRecord {
    /// Create a minimal active record with all counters null.
    #[must_use]
    pub fn new(id: CreatorId, handle: CreatorHandle) -> Self {
        Self {
            id,
            creator_handle: handle.into(),
            first_name: String::new(),
            last_name: String::new(),
            region: None,
            creator_type: None,
            diamonds_monthly: None,
            total_diamonds: None,
            diamonds_30d: None,
            live_days_30d: None,
            live_duration_seconds_30d: None,
            graduation_status: None,
            silver_target: None,
            gold_target: None,
            is_active: true,
        }
    }

    /// The validated handle of this row.
    pub fn handle(&self) -> Result<CreatorHandle, TierlineError> {
        CreatorHandle::parse(&self.creator_handle)
    }

    /// Display name: "First Last", falling back to the handle.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let name = name.trim();
        if !name.is_empty() {
            return name.to_string();
        }
        match self.handle() {
            Ok(handle) => handle.to_string(),
            Err(_) => self.creator_handle.trim().to_string(),
        }
    }
}

// =============================================================================
// CREATOR METRICS (NORMALIZED)
// =============================================================================

/// Read-only metrics snapshot used by every calculation.
///
/// Owned by the data service; a copy lives only as long as the call that
/// fetched it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CreatorMetrics {
    /// Lifetime cumulative diamonds.
    pub total_diamonds: u64,
    /// Diamonds earned in the current calendar month.
    pub monthly_diamonds: u64,
    /// Diamonds earned in the rolling 30-day window.
    pub diamonds_30d: u64,
    /// Days with a live session in the rolling 30-day window.
    pub live_days_30d: u32,
    /// Seconds streamed in the rolling 30-day window.
    pub live_duration_seconds_30d: u64,
    /// Per-creator Silver threshold, if one is configured.
    pub silver_target: Option<u64>,
    /// Per-creator Gold threshold, if one is configured.
    pub gold_target: Option<u64>,
    /// Free-text display override for the tier label.
    pub graduation_status_label: Option<String>,
}

impl CreatorMetrics {
    /// Metrics with only a lifetime total set.
    #[must_use]
    pub fn with_total(total_diamonds: u64) -> Self {
        Self {
            total_diamonds,
            ..Self::default()
        }
    }

    /// Set both per-creator targets.
    #[must_use]
    pub fn targets(mut self, silver: Option<u64>, gold: Option<u64>) -> Self {
        self.silver_target = silver;
        self.gold_target = gold;
        self
    }

    /// Set the display label override.
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.graduation_status_label = non_blank(Some(label.into()));
        self
    }

    /// Progress inputs as they arrive from outside, normalized like a record.
    ///
    /// A null or negative total is zero; a null or zero target is absent.
    ///
    /// # Errors
    ///
    /// Returns `TierlineError::NegativeTarget` if either target is negative.
    pub fn from_raw(
        total: Option<i64>,
        silver: Option<i64>,
        gold: Option<i64>,
    ) -> Result<Self, TierlineError> {
        Ok(Self::with_total(count(total)).targets(
            target("silver_target", silver)?,
            target("gold_target", gold)?,
        ))
    }

    /// Normalize a raw record.
    ///
    /// # Errors
    ///
    /// Returns `TierlineError::NegativeTarget` if either target column is
    /// negative.
    pub fn from_record(record: &CreatorRecord) -> Result<Self, TierlineError> {
        Ok(Self {
            total_diamonds: count(record.total_diamonds),
            monthly_diamonds: count(record.diamonds_monthly),
            diamonds_30d: count(record.diamonds_30d),
            live_days_30d: u32::try_from(count(record.live_days_30d)).unwrap_or(u32::MAX),
            live_duration_seconds_30d: count(record.live_duration_seconds_30d),
            silver_target: target("silver_target", record.silver_target)?,
            gold_target: target("gold_target", record.gold_target)?,
            graduation_status_label: non_blank(record.graduation_status.clone()),
        })
    }
}

/// Null and negative counters read as zero.
fn count(value: Option<i64>) -> u64 {
    value.map_or(0, |v| u64::try_from(v).unwrap_or(0))
}

/// Null and zero targets are absent; negative targets are an error.
fn target(field: &'static str, value: Option<i64>) -> Result<Option<u64>, TierlineError> {
    match value {
        None | Some(0) => Ok(None),
        Some(v) if v < 0 => Err(TierlineError::NegativeTarget { field, value: v }),
        Some(v) => Ok(Some(v as u64)),
    }
}

fn non_blank(label: Option<String>) -> Option<String> {
    label
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in Tierline.
///
/// - No silent failures
/// - Use `Result<T, TierlineError>` for fallible operations
/// - The core never panics; all errors are recoverable
#[derive(Debug, Error)]
pub enum TierlineError {
    /// The Gold threshold does not lie above the Silver threshold.
    #[error("Invalid thresholds: gold target {gold} must exceed silver target {silver}")]
    InvalidThresholds { silver: u64, gold: u64 },

    /// A target column holds a negative value.
    #[error("Invalid {field}: {value} is negative")]
    NegativeTarget { field: &'static str, value: i64 },

    /// A creator handle failed validation.
    #[error("Invalid creator handle: {0}")]
    InvalidHandle(String),

    /// No active creator with this handle exists.
    #[error("Creator not found: {0}")]
    CreatorNotFound(String),

    /// A challenge day outside the program length.
    #[error("Challenge day {0} is out of range")]
    DayOutOfRange(u32),

    /// A challenge day whose predecessor is not completed yet.
    #[error("Challenge day {0} is locked")]
    DayLocked(u32),

    /// A video number that is not in the catalog.
    #[error("Video not found: {0}")]
    VideoNotFound(u32),

    /// A video that has not been unlocked yet.
    #[error("Video {0} is locked")]
    VideoLocked(u32),

    /// A quiz whose video has not been watched far enough.
    #[error("Quiz for video {0} is locked")]
    QuizLocked(u32),

    /// A quiz submission with the wrong number of answers.
    #[error("Quiz expects {expected} answers, got {got}")]
    AnswerCountMismatch { expected: usize, got: usize },

    /// Snapshot validation found creators whose progress cannot be computed.
    #[error("Snapshot check failed: {failed} of {checked} creators invalid")]
    CheckFailed { failed: usize, checked: usize },

    /// A configuration value is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
