pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Admin interview API
        .route(
            "/api/v1/interviews",
            post(handlers::handle_create_interview),
        )
        .route(
            "/api/v1/interviews/:id",
            get(handlers::handle_get_interview),
        )
        .route(
            "/api/v1/interviews/:id/documents",
            post(handlers::handle_upload_documents),
        )
        .route("/api/v1/interviews/:id/assign", post(handlers::handle_assign))
        .route(
            "/api/v1/interviews/:id/complete",
            post(handlers::handle_complete_interview),
        )
        .route(
            "/api/v1/interviews/:id/transcript",
            get(handlers::handle_get_transcript),
        )
        .route(
            "/api/v1/interviews/:id/report",
            get(handlers::handle_get_report),
        )
        // Candidate chat API
        .route("/api/v1/chat", post(handlers::handle_chat))
        .with_state(state)
}
