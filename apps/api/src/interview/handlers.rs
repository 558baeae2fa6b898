use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use crate::chains::document_analysis::DocumentSet;
use crate::errors::AppError;
use crate::extraction;
use crate::interview::orchestrator::TurnOutcome;
use crate::models::interview::Interview;
use crate::models::message::Message;
use crate::models::report::Report;
use crate::state::AppState;

#[derive(Deserialize, Default)]
pub struct CreateInterviewRequest {
    #[serde(default)]
    pub target_question_count: Option<i32>,
    #[serde(default)]
    pub difficulty_start: Option<i32>,
}

/// The one place the candidate token leaves the system. `Interview`
/// serialization skips the token everywhere else.
#[derive(Serialize)]
pub struct AssignResponse {
    pub interview: Interview,
    pub candidate_token: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub token: String,
    pub message: String,
    #[serde(default)]
    pub client_metadata: Option<Value>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatResponse {
    Reply {
        message: Message,
    },
    Completed {
        report_id: Uuid,
        closing_message: String,
    },
}

/// POST /api/v1/interviews
pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(req): Json<CreateInterviewRequest>,
) -> Result<(StatusCode, Json<Interview>), AppError> {
    let interview = state
        .engine
        .create_interview(req.target_question_count, req.difficulty_start)
        .await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Interview>, AppError> {
    Ok(Json(state.engine.get_interview(id).await?))
}

/// POST /api/v1/interviews/:id/documents
///
/// Multipart upload with three fields: `resume`, `role_description`,
/// `job_offering`. PDF parts are extracted to text; anything else is
/// treated as UTF-8 plain text.
pub async fn handle_upload_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<Interview>, AppError> {
    let mut resume = None;
    let mut role_description = None;
    let mut job_offering = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or("upload.txt").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Could not read field '{name}': {e}")))?;

        let text = extraction::extract_text(&filename, &data)?;
        match name.as_str() {
            "resume" => resume = Some(text),
            "role_description" => role_description = Some(text),
            "job_offering" => job_offering = Some(text),
            other => warn!("Ignoring unexpected document field '{other}'"),
        }
    }

    let documents = DocumentSet {
        resume_text: require_field(resume, "resume")?,
        role_description_text: require_field(role_description, "role_description")?,
        job_offering_text: require_field(job_offering, "job_offering")?,
    };
    Ok(Json(state.engine.upload_documents(id, documents).await?))
}

fn require_field(value: Option<String>, name: &str) -> Result<String, AppError> {
    value.ok_or_else(|| AppError::Validation(format!("Missing document field '{name}'")))
}

/// POST /api/v1/interviews/:id/assign
pub async fn handle_assign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AssignResponse>, AppError> {
    let interview = state.engine.assign(id).await?;
    let candidate_token = interview.candidate_token.clone().unwrap_or_default();
    Ok(Json(AssignResponse {
        interview,
        candidate_token,
    }))
}

/// POST /api/v1/interviews/:id/complete
pub async fn handle_complete_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    Ok(Json(state.engine.complete_interview(id).await?))
}

/// GET /api/v1/interviews/:id/transcript
pub async fn handle_get_transcript(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Message>>, AppError> {
    Ok(Json(state.engine.get_transcript(id).await?))
}

/// GET /api/v1/interviews/:id/report
pub async fn handle_get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Report>, AppError> {
    Ok(Json(state.engine.get_report(id).await?))
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let outcome = state
        .engine
        .submit_message(&req.token, &req.message, req.client_metadata.as_ref())
        .await?;

    let response = match outcome {
        TurnOutcome::Reply(message) => ChatResponse::Reply { message },
        TurnOutcome::Completed {
            report,
            closing_message,
        } => ChatResponse::Completed {
            report_id: report.id,
            closing_message,
        },
    };
    Ok(Json(response))
}
