//! Interview engine, the facade the HTTP layer talks to.
//!
//! One method per exposed operation. Handlers stay thin: parse the
//! request, call the engine, shape the response. The engine owns the
//! store, the chains, the token issuer and the per-interview turn locks;
//! everything that touches a single interview's record mid-interview goes
//! through that interview's lock.

use std::sync::Arc;

use serde_json::Value;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::chains::document_analysis::DocumentSet;
use crate::chains::Chains;
use crate::config::InterviewTuning;
use crate::errors::AppError;
use crate::interview::locks::TurnLocks;
use crate::interview::orchestrator::{ChatTurnOrchestrator, TurnOutcome};
use crate::interview::state_machine::{self, CompletionReason};
use crate::interview::introduction;
use crate::models::interview::{Interview, InterviewStatus};
use crate::models::message::Message;
use crate::models::report::Report;
use crate::store::InterviewStore;
use crate::tokens::TokenIssuer;

/// Upper bound on how many questions one interview may plan. Keeps a typo
/// in the admin request from scheduling an unbounded interview.
const MAX_TARGET_QUESTIONS: i32 = 50;

pub struct InterviewEngine {
    store: Arc<dyn InterviewStore>,
    chains: Arc<Chains>,
    tokens: Arc<dyn TokenIssuer>,
    locks: TurnLocks,
    tuning: InterviewTuning,
    orchestrator: ChatTurnOrchestrator,
}

impl InterviewEngine {
    pub fn new(
        store: Arc<dyn InterviewStore>,
        chains: Arc<Chains>,
        tokens: Arc<dyn TokenIssuer>,
        tuning: InterviewTuning,
    ) -> Self {
        let orchestrator =
            ChatTurnOrchestrator::new(store.clone(), chains.clone(), tuning.clone());
        InterviewEngine {
            store,
            chains,
            tokens,
            locks: TurnLocks::new(),
            tuning,
            orchestrator,
        }
    }

    /// Creates a DRAFT interview. Unset knobs take the configured
    /// defaults; both are fixed on the record from here on.
    pub async fn create_interview(
        &self,
        target_question_count: Option<i32>,
        difficulty_start: Option<i32>,
    ) -> Result<Interview, AppError> {
        let target = target_question_count.unwrap_or(self.tuning.default_target_questions);
        let start = difficulty_start.unwrap_or(self.tuning.default_difficulty_start);

        if !(1..=MAX_TARGET_QUESTIONS).contains(&target) {
            return Err(AppError::Validation(format!(
                "target_question_count must be between 1 and {MAX_TARGET_QUESTIONS}, got {target}"
            )));
        }
        if !(self.tuning.difficulty_min..=self.tuning.difficulty_max).contains(&start) {
            return Err(AppError::Validation(format!(
                "difficulty_start must be between {} and {}, got {start}",
                self.tuning.difficulty_min, self.tuning.difficulty_max
            )));
        }

        let interview = Interview::new(target, start);
        self.store.save(&interview).await?;
        info!(
            "Interview {} created ({target} questions, starting difficulty {start})",
            interview.id
        );
        Ok(interview)
    }

    /// Analyzes the three documents and moves DRAFT→READY. Re-uploads are
    /// rejected as an illegal transition before any analysis runs, so a
    /// finished analysis is never silently replaced.
    pub async fn upload_documents(
        &self,
        id: Uuid,
        documents: DocumentSet,
    ) -> Result<Interview, AppError> {
        let mut interview = self.store.load(id).await?;
        // Check legality and input shape before spending an LLM call.
        state_machine::ensure_legal(interview.status, InterviewStatus::Ready)?;
        documents.validate().map_err(AppError::Validation)?;

        let analysis = self.chains.analyze_documents(&documents).await?;
        info!(
            "Interview {id}: documents analyzed, match score {}/10, {} focus areas",
            analysis.match_score,
            analysis.focus_areas.len()
        );

        interview.resume_text = Some(documents.resume_text);
        interview.role_description_text = Some(documents.role_description_text);
        interview.job_offering_text = Some(documents.job_offering_text);
        interview.match_score = Some(analysis.match_score);
        interview.match_summary = Some(analysis.match_summary);
        interview.focus_areas = Json(analysis.focus_areas);

        state_machine::transition(&mut interview, InterviewStatus::Ready)?;
        self.store.save(&interview).await?;
        Ok(interview)
    }

    /// Mints the candidate token, moves READY→ASSIGNED and appends the
    /// introduction message so the candidate's first page load has
    /// something to show.
    pub async fn assign(&self, id: Uuid) -> Result<Interview, AppError> {
        let mut interview = self.store.load(id).await?;
        state_machine::ensure_legal(interview.status, InterviewStatus::Assigned)?;

        interview.candidate_token = Some(self.tokens.mint(interview.id)?);
        state_machine::transition(&mut interview, InterviewStatus::Assigned)?;
        self.store.save(&interview).await?;

        let greeting = introduction::introduction(
            interview.role_description_text.as_deref().unwrap_or(""),
            interview.target_question_count,
        );
        self.store
            .append_message(&Message::assistant(interview.id, greeting))
            .await?;
        Ok(interview)
    }

    /// One candidate turn. The token is the only credential; it resolves
    /// to the interview id, whose turn lock is held for the whole turn.
    pub async fn submit_message(
        &self,
        token: &str,
        text: &str,
        client_metadata: Option<&Value>,
    ) -> Result<TurnOutcome, AppError> {
        let interview_id = self.tokens.verify(token)?;
        let _guard = self.locks.acquire(interview_id).await;
        self.orchestrator
            .handle_turn(interview_id, text, client_metadata)
            .await
    }

    /// Admin override: ends an IN_PROGRESS interview now and assembles
    /// its report from whatever transcript exists.
    pub async fn complete_interview(&self, id: Uuid) -> Result<Report, AppError> {
        let _guard = self.locks.acquire(id).await;
        let mut interview = self.store.load(id).await?;
        let (report, _) = self
            .orchestrator
            .finalize(&mut interview, CompletionReason::AdminOverride)
            .await?;
        Ok(report)
    }

    pub async fn get_interview(&self, id: Uuid) -> Result<Interview, AppError> {
        self.store.load(id).await
    }

    pub async fn get_transcript(&self, id: Uuid) -> Result<Vec<Message>, AppError> {
        // Load first so an unknown id is a 404, not an empty transcript.
        self.store.load(id).await?;
        self.store.load_messages(id).await
    }

    pub async fn get_report(&self, id: Uuid) -> Result<Report, AppError> {
        self.store.load(id).await?;
        self.store
            .load_report(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No report exists for interview {id}")))
    }
}
