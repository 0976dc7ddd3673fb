//! # API Request/Response Types
//!
//! This module defines the JSON structures for the HTTP API. The CLI's
//! `--json-mode` prints the same structures.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tierline_core::{
    BonusSummary, ChallengeBoard, ContestRecord, CreatorHandle, CreatorMetrics, CreatorRecord,
    CreatorStats, DayStatus, EducationTrack, ProgressReport, QuizOutcome, Tier, TierlineError,
    UpcomingBattle, format_cents, primitives::CHALLENGE_DAYS,
};

// =============================================================================
// HEALTH RESPONSE
// =============================================================================

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Error body: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// An error on its way out as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// A core error.
    Tierline(TierlineError),
    /// The request body could not be extracted as JSON.
    Body(JsonRejection),
}

impl From<TierlineError> for ApiError {
    fn from(e: TierlineError) -> Self {
        Self::Tierline(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl ApiError {
    /// HTTP status for the wrapped error.
    ///
    /// - 400/415/422: the body is not the expected JSON (axum's status)
    /// - 404: the creator or video does not exist
    /// - 422: the request or the stored row fails validation
    /// - 500: the source could not be read
    pub fn status(&self) -> StatusCode {
        let error = match self {
            Self::Tierline(error) => error,
            Self::Body(rejection) => return rejection.status(),
        };
        match error {
            TierlineError::CreatorNotFound(_) | TierlineError::VideoNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            TierlineError::InvalidThresholds { .. }
            | TierlineError::NegativeTarget { .. }
            | TierlineError::InvalidHandle(_)
            | TierlineError::DayOutOfRange(_)
            | TierlineError::DayLocked(_)
            | TierlineError::VideoLocked(_)
            | TierlineError::QuizLocked(_)
            | TierlineError::AnswerCountMismatch { .. }
            | TierlineError::CheckFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TierlineError::ConfigError(_)
            | TierlineError::DeserializationError(_)
            | TierlineError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Tierline(error) => error.to_string(),
            Self::Body(rejection) => rejection.body_text(),
        };
        if status.is_server_error() {
            tracing::error!(event = "source_failure", "Request failed: {}", message);
        } else {
            tracing::debug!("Request rejected ({}): {}", status, message);
        }
        let body = ErrorResponse { error: message };
        (status, Json(body)).into_response()
    }
}

// =============================================================================
// PROGRESS REQUEST/RESPONSE
// =============================================================================

/// Graduation progress, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    pub current_tier: Tier,
    pub next_tier: Tier,
    /// Tier name, or the record's display override.
    pub status_label: String,
    pub percent_complete: f64,
    /// One decimal, e.g. `"42.5"`.
    pub percent_display: String,
    pub basis_points: u32,
    pub remaining: u64,
    pub next_threshold: u64,
    pub total_diamonds: u64,
}

impl ProgressResponse {
    pub fn from_report(handle: Option<&CreatorHandle>, report: &ProgressReport) -> Self {
        Self {
            handle: handle.map(ToString::to_string),
            current_tier: report.current_tier,
            next_tier: report.next_tier,
            status_label: report.display_label().to_string(),
            percent_complete: report.percent_complete(),
            percent_display: report.percent_display(),
            basis_points: report.basis_points,
            remaining: report.remaining,
            next_threshold: report.next_threshold,
            total_diamonds: report.total_diamonds,
        }
    }
}

/// Ad hoc progress request for numbers that are not in the source.
///
/// Columns are nullable and signed, like a stored creator row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgressRequest {
    #[serde(default)]
    pub total_diamonds: Option<i64>,
    #[serde(default)]
    pub silver_target: Option<i64>,
    #[serde(default)]
    pub gold_target: Option<i64>,
    #[serde(default)]
    pub graduation_status: Option<String>,
}

impl ProgressRequest {
    /// Convert to metrics with the same rules as a stored row: a missing or
    /// negative total is zero, a zero target is absent, a negative target
    /// is an error.
    pub fn to_metrics(&self) -> Result<CreatorMetrics, TierlineError> {
        let mut metrics =
            CreatorMetrics::from_raw(self.total_diamonds, self.silver_target, self.gold_target)?;
        if let Some(label) = &self.graduation_status {
            metrics = metrics.label(label.as_str());
        }
        Ok(metrics)
    }
}

// =============================================================================
// STATS RESPONSE
// =============================================================================

/// Dashboard stats for one creator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsResponse {
    pub handle: String,
    pub display_name: String,
    pub monthly_diamonds: u64,
    pub total_diamonds: u64,
    pub diamonds_30d: u64,
    pub live_days: u32,
    pub live_hours: u64,
    pub streak: u32,
    pub status_label: String,
    pub graduation: ProgressResponse,
}

impl StatsResponse {
    pub fn new(handle: &CreatorHandle, creator: &CreatorRecord, stats: &CreatorStats) -> Self {
        Self {
            handle: handle.to_string(),
            display_name: creator.display_name(),
            monthly_diamonds: stats.monthly_diamonds,
            total_diamonds: stats.total_diamonds,
            diamonds_30d: stats.diamonds_30d,
            live_days: stats.live_days,
            live_hours: stats.live_hours,
            streak: stats.streak,
            status_label: stats.status_label().to_string(),
            graduation: ProgressResponse::from_report(None, &stats.graduation),
        }
    }
}

// =============================================================================
// EARNINGS RESPONSES
// =============================================================================

/// Bonus summary with amounts in cents and as display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BonusesResponse {
    pub handle: String,
    pub earned_this_month_cents: u64,
    pub earned_this_month: String,
    pub pending_cents: u64,
    pub pending: String,
    pub last_payout: Option<DateTime<Utc>>,
    pub last_payout_display: String,
    pub counted: usize,
}

impl BonusesResponse {
    pub fn new(handle: &CreatorHandle, summary: &BonusSummary) -> Self {
        Self {
            handle: handle.to_string(),
            earned_this_month_cents: summary.earned_this_month_cents,
            earned_this_month: format_cents(summary.earned_this_month_cents),
            pending_cents: summary.pending_cents,
            pending: format_cents(summary.pending_cents),
            last_payout: summary.last_payout,
            last_payout_display: summary.last_payout_display(),
            counted: summary.counted,
        }
    }
}

/// Contests open to the creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestsResponse {
    pub handle: String,
    pub region: Option<String>,
    pub contests: Vec<ContestRecord>,
}

/// Upcoming battles of the creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattlesResponse {
    pub handle: String,
    pub battles: Vec<UpcomingBattle>,
}

// =============================================================================
// LEARNING RESPONSES
// =============================================================================

/// Challenge and education progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LearningResponse {
    pub handle: String,
    pub challenge: ChallengeJson,
    pub education: EducationJson,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeJson {
    pub completed_days: usize,
    pub total_days: u32,
    pub next_open_day: Option<u32>,
    pub days: Vec<DayStatus>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EducationJson {
    pub passed_videos: usize,
    pub total_videos: usize,
    pub videos: Vec<VideoProgressJson>,
}

/// One catalog video merged with the creator's progress on it.
///
/// Quiz answers are never sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoProgressJson {
    pub number: u32,
    pub title: String,
    pub duration: String,
    pub video_url: Option<String>,
    pub question_count: usize,
    pub unlocked: bool,
    pub watched_percentage: u8,
    pub video_completed: bool,
    pub quiz_open: bool,
    pub quiz_passed: bool,
    pub quiz_attempts: u32,
    pub quiz_score: Option<u8>,
}

impl LearningResponse {
    pub fn new(handle: &CreatorHandle, board: &ChallengeBoard, track: &EducationTrack) -> Self {
        let videos = track
            .catalog()
            .iter()
            .filter_map(|video| {
                track.progress(video.number).map(|p| VideoProgressJson {
                    number: video.number,
                    title: video.title.clone(),
                    duration: video.duration.clone(),
                    video_url: video.video_url.clone(),
                    question_count: video.quiz.len(),
                    unlocked: p.unlocked,
                    watched_percentage: p.watched_percentage,
                    video_completed: p.video_completed,
                    quiz_open: p.quiz_open(),
                    quiz_passed: p.quiz_passed,
                    quiz_attempts: p.quiz_attempts,
                    quiz_score: p.quiz_score,
                })
            })
            .collect();

        Self {
            handle: handle.to_string(),
            challenge: ChallengeJson {
                completed_days: board.completed_days(),
                total_days: CHALLENGE_DAYS,
                next_open_day: board.next_open_day(),
                days: board.days(),
            },
            education: EducationJson {
                passed_videos: track.passed_videos(),
                total_videos: track.catalog().len(),
                videos,
            },
        }
    }
}

// =============================================================================
// QUIZ REQUEST/RESPONSE
// =============================================================================

/// Quiz attempt: one chosen option per question, zero-based.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizRequest {
    pub video: u32,
    pub answers: Vec<usize>,
    /// Watch percentage to record before grading.
    #[serde(default)]
    pub watched_percent: Option<u8>,
}

/// Graded attempt with the rows the caller should store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResponse {
    pub handle: String,
    #[serde(flatten)]
    pub outcome: QuizOutcome,
}
