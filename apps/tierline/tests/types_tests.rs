//! Unit tests for API types serialization/deserialization.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::http::StatusCode;
use tierline::api::{
    ApiError, ErrorResponse, HealthResponse, LearningResponse, ProgressRequest, ProgressResponse,
    QuizRequest, QuizResponse,
};
use tierline_core::{
    ChallengeBoard, CreatorHandle, CreatorId, EducationTrack, GraduationAssessor, QuizQuestion,
    Tier, TierlineError, Video,
};

// =============================================================================
// HEALTH RESPONSE TESTS
// =============================================================================

#[test]
fn test_health_response_default() {
    let health = HealthResponse::default();
    assert_eq!(health.status, "ok");
    assert!(!health.version.is_empty());
}

#[test]
fn test_health_response_deserialization() {
    let json = r#"{"status":"healthy","version":"1.0.0"}"#;
    let health: HealthResponse = serde_json::from_str(json).unwrap();

    assert_eq!(health.status, "healthy");
    assert_eq!(health.version, "1.0.0");
}

// =============================================================================
// PROGRESS TESTS
// =============================================================================

#[test]
fn test_progress_request_minimal() {
    let json = r#"{"total_diamonds": 1500}"#;
    let request: ProgressRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.total_diamonds, Some(1500));
    assert!(request.silver_target.is_none());
    assert!(request.gold_target.is_none());
    assert!(request.graduation_status.is_none());
}

#[test]
fn test_progress_request_zero_target_is_absent() {
    let json = r#"{"total_diamonds": 1500, "silver_target": 0, "gold_target": 400000}"#;
    let request: ProgressRequest = serde_json::from_str(json).unwrap();

    let metrics = request.to_metrics().unwrap();
    assert_eq!(metrics.silver_target, None);
    assert_eq!(metrics.gold_target, Some(400_000));
}

#[test]
fn test_progress_request_negative_or_missing_total_is_zero() {
    for json in [r#"{"total_diamonds": -1}"#, r#"{}"#] {
        let request: ProgressRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.to_metrics().unwrap().total_diamonds, 0);
    }
}

#[test]
fn test_progress_response_serialization() {
    let request = ProgressRequest {
        total_diamonds: Some(85_000),
        graduation_status: Some("On Track".to_string()),
        ..ProgressRequest::default()
    };
    let report = GraduationAssessor::new()
        .assess(&request.to_metrics().unwrap())
        .unwrap();
    let handle = CreatorHandle::parse("lumi").unwrap();
    let response = ProgressResponse::from_report(Some(&handle), &report);

    assert_eq!(response.current_tier, Tier::Rookie);
    assert_eq!(response.status_label, "On Track");
    assert_eq!(response.percent_display, "42.5");

    let json = serde_json::to_string(&response).unwrap();
    assert!(json.contains("\"handle\":\"@lumi\""));
    assert!(json.contains("\"basis_points\":4250"));
    assert!(json.contains("\"remaining\":115000"));
}

#[test]
fn test_progress_response_omits_missing_handle() {
    let report = GraduationAssessor::new()
        .assess(&ProgressRequest::default().to_metrics().unwrap())
        .unwrap();
    let response = ProgressResponse::from_report(None, &report);

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("\"handle\""));
    assert!(json.contains("\"status_label\":\"Rookie\""));
}

// =============================================================================
// ERROR TESTS
// =============================================================================

#[test]
fn test_api_error_status_mapping() {
    let cases = [
        (
            TierlineError::CreatorNotFound("@ghost".to_string()),
            StatusCode::NOT_FOUND,
        ),
        (TierlineError::VideoNotFound(4), StatusCode::NOT_FOUND),
        (
            TierlineError::InvalidThresholds {
                silver: 5,
                gold: 5,
            },
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (TierlineError::QuizLocked(2), StatusCode::UNPROCESSABLE_ENTITY),
        (
            TierlineError::IoError("disk".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            TierlineError::DeserializationError("bad".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, expected) in cases {
        assert_eq!(ApiError::from(error).status(), expected);
    }
}

#[test]
fn test_error_response_serialization() {
    let error = ErrorResponse {
        error: "Creator not found: @ghost".to_string(),
    };

    let json = serde_json::to_string(&error).unwrap();
    assert_eq!(json, r#"{"error":"Creator not found: @ghost"}"#);
}

// =============================================================================
// LEARNING TESTS
// =============================================================================

fn catalog() -> Vec<Video> {
    vec![Video {
        number: 1,
        title: "Going Live".to_string(),
        duration: "8:30".to_string(),
        video_url: None,
        quiz: vec![QuizQuestion {
            question: "Best time to go live?".to_string(),
            options: vec!["Never".to_string(), "Evenings".to_string()],
            correct_answer: 1,
        }],
    }]
}

#[test]
fn test_learning_response_hides_answers() {
    let handle = CreatorHandle::parse("lumi").unwrap();
    let board = ChallengeBoard::from_records(Vec::new());
    let track = EducationTrack::new(CreatorId::new("c-1"), catalog(), Vec::new());

    let response = LearningResponse::new(&handle, &board, &track);

    assert_eq!(response.challenge.completed_days, 0);
    assert_eq!(response.challenge.next_open_day, Some(1));
    assert_eq!(response.education.videos.len(), 1);
    assert_eq!(response.education.videos[0].question_count, 1);
    assert!(response.education.videos[0].unlocked);

    let json = serde_json::to_string(&response).unwrap();
    assert!(!json.contains("correct_answer"));
    assert!(!json.contains("Evenings"));
}

// =============================================================================
// QUIZ TESTS
// =============================================================================

#[test]
fn test_quiz_request_defaults() {
    let json = r#"{"video": 1, "answers": [0, 2]}"#;
    let request: QuizRequest = serde_json::from_str(json).unwrap();

    assert_eq!(request.video, 1);
    assert_eq!(request.answers, vec![0, 2]);
    assert!(request.watched_percent.is_none());
}

#[test]
fn test_quiz_response_is_flat() {
    let track = EducationTrack::new(CreatorId::new("c-1"), catalog(), Vec::new());
    let watched = track.record_watch(1, 95).unwrap().unwrap();
    let mut track = track;
    track.apply(watched);
    let outcome = track.submit_quiz(1, &[1]).unwrap();

    let response = QuizResponse {
        handle: "@lumi".to_string(),
        outcome,
    };

    let value = serde_json::to_value(&response).unwrap();
    assert_eq!(value["handle"], "@lumi");
    assert_eq!(value["passed"], true);
    assert_eq!(value["score_percent"], 100);
    assert_eq!(value["progress"]["quiz_attempts"], 1);
    assert!(value["unlocked_next"].is_null());
}
