use std::sync::Arc;

use crate::interview::engine::InterviewEngine;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Everything routes need goes through the engine; handlers never reach
/// past it to the store or the LLM client.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InterviewEngine>,
}
