//! Persistence port for interviews, transcripts, and reports.
//!
//! The engine runs against `InterviewStore` only. Each method is one
//! atomic operation; cross-record consistency comes from the engine's
//! per-interview turn lock, not from transactions.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::Interview;
use crate::models::message::Message;
use crate::models::report::Report;

#[async_trait]
pub trait InterviewStore: Send + Sync {
    /// Loads one interview, `AppError::NotFound` if absent.
    async fn load(&self, id: Uuid) -> Result<Interview, AppError>;

    /// Inserts or fully replaces one interview row.
    async fn save(&self, interview: &Interview) -> Result<(), AppError>;

    /// Appends one transcript message. Rows are immutable afterwards,
    /// except for `attach_evaluation`.
    async fn append_message(&self, message: &Message) -> Result<(), AppError>;

    /// One-shot evaluation fill-in on a candidate message. Fills only
    /// NULL evaluation fields; repeat calls are no-ops.
    async fn attach_evaluation(
        &self,
        message_id: Uuid,
        score: i32,
        feedback: &str,
    ) -> Result<(), AppError>;

    /// Full transcript for an interview in append order. Adapters must not
    /// derive the order from `created_at`; timestamps can tie.
    async fn load_messages(&self, interview_id: Uuid) -> Result<Vec<Message>, AppError>;

    /// Stores the report for an interview. At most one report ever exists
    /// per interview; once written, later saves are no-ops.
    async fn save_report(&self, report: &Report) -> Result<(), AppError>;

    async fn load_report(&self, interview_id: Uuid) -> Result<Option<Report>, AppError>;
}
