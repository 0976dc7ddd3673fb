//! # Tierline HTTP API Module
//!
//! This module implements the HTTP REST API server using axum.
//!
//! ## Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /creators/{handle}/progress` - Graduation progress
//! - `GET /creators/{handle}/stats` - Dashboard stats
//! - `GET /creators/{handle}/bonuses` - Bonus summary
//! - `GET /creators/{handle}/contests` - Open contests in the creator's region
//! - `GET /creators/{handle}/battles` - Upcoming battles
//! - `GET /creators/{handle}/learning` - Challenge and education progress
//! - `POST /creators/{handle}/quiz` - Grade a quiz attempt (not stored)
//! - `POST /progress` - Progress from posted numbers
//!
//! Errors are `{"error": "..."}` with 404 for unknown creators, 422 for
//! validation failures and 500 for source failures.
//!
//! ## Security Configuration (Environment Variables)
//!
//! - `TIERLINE_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all (default: localhost only)
//! - `TIERLINE_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `TIERLINE_API_KEY`: If set, requires Bearer token authentication

mod auth;
mod handlers;
mod middleware;
mod types;

pub use auth::get_api_key_from_env;
pub use middleware::{create_rate_limiter, get_rate_limit_from_env};
pub use types::{
    ApiError, BattlesResponse, BonusesResponse, ChallengeJson, ContestsResponse, EducationJson,
    ErrorResponse, HealthResponse, LearningResponse, ProgressRequest, ProgressResponse,
    QuizRequest, QuizResponse, StatsResponse, VideoProgressJson,
};

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware as axum_middleware,
    routing::{get, post},
};
use std::sync::Arc;
use tierline_core::{GraduationAssessor, MetricsSource, Snapshot, TierlineError};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request body limit (1 MiB).
const MAX_BODY_SIZE: usize = 1024 * 1024;

// =============================================================================
// SERVER STATE
// =============================================================================

/// Shared server state. Read-only, so no lock is needed.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn MetricsSource>,
    pub assessor: GraduationAssessor,
}

impl AppState {
    /// Create app state over any source.
    #[must_use]
    pub fn new(source: Arc<dyn MetricsSource>, assessor: GraduationAssessor) -> Self {
        Self { source, assessor }
    }

    /// App state over an in-memory snapshot with default targets.
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        Self::new(Arc::new(snapshot), GraduationAssessor::new())
    }
}

// =============================================================================
// CORS CONFIGURATION
// =============================================================================

/// Build CORS layer from environment configuration.
///
/// Reads `TIERLINE_CORS_ORIGINS`:
/// - `*`: allows all origins (development only)
/// - unset: localhost only
/// - otherwise: a comma-separated list of allowed origins
fn build_cors_layer() -> CorsLayer {
    let origins_env = std::env::var("TIERLINE_CORS_ORIGINS").ok();

    match origins_env.as_deref() {
        Some("*") => {
            tracing::warn!(
                "CORS: Allowing ALL origins (TIERLINE_CORS_ORIGINS=*). This is insecure for production!"
            );
            CorsLayer::permissive()
        }
        Some(origins) => {
            let allowed_origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|s| {
                    let trimmed = s.trim();
                    match trimmed.parse::<HeaderValue>() {
                        Ok(hv) => {
                            tracing::info!("CORS: Allowing origin: {}", trimmed);
                            Some(hv)
                        }
                        Err(e) => {
                            tracing::warn!("CORS: Invalid origin '{}': {}", trimmed, e);
                            None
                        }
                    }
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::warn!(
                    "CORS: No valid origins in TIERLINE_CORS_ORIGINS, defaulting to localhost only"
                );
                build_localhost_cors()
            } else {
                CorsLayer::new()
                    .allow_origin(allowed_origins)
                    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            }
        }
        None => {
            tracing::info!("CORS: No TIERLINE_CORS_ORIGINS set, defaulting to localhost only");
            build_localhost_cors()
        }
    }
}

/// Build a restrictive CORS layer that only allows localhost origins.
fn build_localhost_cors() -> CorsLayer {
    let origins: Vec<HeaderValue> = [
        "http://localhost:3000",
        "http://localhost:8080",
        "http://127.0.0.1:3000",
        "http://127.0.0.1:8080",
    ]
    .iter()
    .filter_map(|o| o.parse::<HeaderValue>().ok())
    .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

// =============================================================================
// ROUTER CREATION
// =============================================================================

/// Create the axum router with all endpoints and middleware.
///
/// Middleware stack (outer to inner):
/// 1. Tracing - logs all requests
/// 2. CORS - handles preflight requests
/// 3. Body limit
/// 4. Rate Limiting (if enabled)
/// 5. Authentication (if configured)
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer();

    let rate_limit = get_rate_limit_from_env();
    let rate_limiter = if rate_limit > 0 {
        tracing::info!("Rate limiting enabled: {} requests/second", rate_limit);
        Some(create_rate_limiter(rate_limit))
    } else {
        tracing::info!("Rate limiting disabled");
        None
    };

    let has_auth = get_api_key_from_env().is_some();
    if has_auth {
        tracing::info!("API key authentication enabled");
    } else {
        tracing::warn!(
            "API key authentication DISABLED - all endpoints are publicly accessible! \
             Set TIERLINE_API_KEY environment variable to enable authentication."
        );
    }

    let mut router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/progress", post(handlers::compute_progress_handler))
        .route("/creators/{handle}/progress", get(handlers::progress_handler))
        .route("/creators/{handle}/stats", get(handlers::stats_handler))
        .route("/creators/{handle}/bonuses", get(handlers::bonuses_handler))
        .route("/creators/{handle}/contests", get(handlers::contests_handler))
        .route("/creators/{handle}/battles", get(handlers::battles_handler))
        .route("/creators/{handle}/learning", get(handlers::learning_handler))
        .route("/creators/{handle}/quiz", post(handlers::quiz_handler));

    if has_auth {
        router = router.layer(axum_middleware::from_fn(auth::api_key_auth_middleware));
    }

    if let Some(limiter) = rate_limiter {
        router = router.layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit_middleware,
        ));
    }

    router
        .layer(axum::extract::DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// SERVER STARTUP
// =============================================================================

/// Start the HTTP server.
pub async fn run_server(addr: &str, state: AppState) -> Result<(), TierlineError> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| TierlineError::IoError(format!("Bind failed: {}", e)))?;

    tracing::info!("Tierline HTTP server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| TierlineError::IoError(format!("Server error: {}", e)))
}

/// Resolve on Ctrl+C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
