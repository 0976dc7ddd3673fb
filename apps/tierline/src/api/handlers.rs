//! # API Endpoint Handlers
//!
//! This module implements the actual HTTP endpoint handlers.
//!
//! Creator endpoints build a fresh `Session` per request on a blocking
//! worker, since a file-backed source reads from disk on every call.

use super::{
    AppState,
    types::{
        ApiError, BattlesResponse, BonusesResponse, ContestsResponse, HealthResponse,
        LearningResponse, ProgressRequest, ProgressResponse, QuizRequest, QuizResponse,
        StatsResponse,
    },
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    response::IntoResponse,
};
use chrono::Utc;
use std::sync::Arc;
use tierline_core::{CreatorHandle, Session, TierlineError};

// =============================================================================
// SESSION HELPER
// =============================================================================

/// Run `f` against a session for `handle` off the async runtime.
async fn with_session<T, F>(state: &AppState, handle: String, f: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&Session<'_>) -> Result<T, TierlineError> + Send + 'static,
{
    let handle = CreatorHandle::parse(&handle)?;
    let source = Arc::clone(&state.source);
    let assessor = state.assessor;

    let result = tokio::task::spawn_blocking(move || {
        let session = Session::new(source.as_ref(), handle).with_assessor(assessor);
        f(&session)
    })
    .await
    .map_err(|e| TierlineError::IoError(format!("Worker failed: {}", e)))?;

    Ok(result?)
}

// =============================================================================
// HEALTH HANDLER
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

// =============================================================================
// PROGRESS HANDLERS
// =============================================================================

/// Graduation progress of a creator.
pub async fn progress_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let response = with_session(&state, handle, |session| {
        let report = session.progress()?;
        Ok(ProgressResponse::from_report(Some(session.viewer()), &report))
    })
    .await?;
    Ok(Json(response))
}

/// Progress computed from posted numbers.
pub async fn compute_progress_handler(
    State(state): State<AppState>,
    payload: Result<Json<ProgressRequest>, JsonRejection>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let Json(request) = payload?;
    let report = state.assessor.assess(&request.to_metrics()?)?;
    Ok(Json(ProgressResponse::from_report(None, &report)))
}

// =============================================================================
// STATS HANDLER
// =============================================================================

/// Dashboard stats of a creator.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<StatsResponse>, ApiError> {
    let response = with_session(&state, handle, |session| {
        let creator = session.creator()?;
        let stats = session.stats()?;
        Ok(StatsResponse::new(session.viewer(), &creator, &stats))
    })
    .await?;
    Ok(Json(response))
}

// =============================================================================
// EARNINGS HANDLERS
// =============================================================================

/// Bonus summary of a creator.
pub async fn bonuses_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<BonusesResponse>, ApiError> {
    let now = Utc::now();
    let response = with_session(&state, handle, move |session| {
        let summary = session.bonus_summary(now)?;
        Ok(BonusesResponse::new(session.viewer(), &summary))
    })
    .await?;
    Ok(Json(response))
}

/// Contests open to a creator.
pub async fn contests_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<ContestsResponse>, ApiError> {
    let now = Utc::now();
    let response = with_session(&state, handle, move |session| {
        let creator = session.creator()?;
        Ok(ContestsResponse {
            handle: session.viewer().to_string(),
            region: creator.region,
            contests: session.open_contests(now)?,
        })
    })
    .await?;
    Ok(Json(response))
}

// =============================================================================
// SCHEDULE HANDLER
// =============================================================================

/// Upcoming battles of a creator.
pub async fn battles_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<BattlesResponse>, ApiError> {
    let now = Utc::now();
    let response = with_session(&state, handle, move |session| {
        Ok(BattlesResponse {
            handle: session.viewer().to_string(),
            battles: session.upcoming_battles(now)?,
        })
    })
    .await?;
    Ok(Json(response))
}

// =============================================================================
// LEARNING HANDLERS
// =============================================================================

/// Challenge and education progress of a creator.
pub async fn learning_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
) -> Result<Json<LearningResponse>, ApiError> {
    let response = with_session(&state, handle, |session| {
        let board = session.challenge_board()?;
        let track = session.education_track()?;
        Ok(LearningResponse::new(session.viewer(), &board, &track))
    })
    .await?;
    Ok(Json(response))
}

/// Grade a quiz attempt. Nothing is stored.
pub async fn quiz_handler(
    State(state): State<AppState>,
    Path(handle): Path<String>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> Result<Json<QuizResponse>, ApiError> {
    let Json(request) = payload?;
    let response = with_session(&state, handle, move |session| {
        let outcome =
            session.grade_quiz(request.video, &request.answers, request.watched_percent)?;
        tracing::info!(
            event = "quiz_graded",
            creator = %session.viewer(),
            video = outcome.video_number,
            score = outcome.score_percent,
            passed = outcome.passed,
            "Quiz graded"
        );
        Ok(QuizResponse {
            handle: session.viewer().to_string(),
            outcome,
        })
    })
    .await?;
    Ok(Json(response))
}
