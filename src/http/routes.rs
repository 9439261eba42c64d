use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Recording control
        .route("/recordings/start", post(handlers::start_recording))
        .route(
            "/recordings/stop/:recording_id",
            post(handlers::stop_recording),
        )
        .route("/recordings/cancel", post(handlers::cancel_recording))
        .route("/recordings/status", get(handlers::recording_status))
        .route("/recordings/last/audio", get(handlers::last_recording_audio))
        // Uploaded clips and text-only scoring
        .route("/assessments", post(handlers::assess_upload))
        .route("/score", post(handlers::score_text))
        // Presenter runs in the browser on another origin
        .layer(CorsLayer::permissive())
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
