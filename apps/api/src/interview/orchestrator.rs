//! Chat-turn orchestration.
//!
//! Every candidate message runs the same fixed sequence: admission,
//! classification, persistence, activation, the clarification
//! short-circuit, evaluation, the termination check, and finally either
//! the next question or the closing report. Chain failures never abort a
//! turn once the candidate message is stored; each step that talks to the
//! LLM has a deterministic substitute. Store failures do abort the turn,
//! and the candidate resubmits.
//!
//! The caller holds the per-interview turn lock for the whole sequence,
//! so reads of the record and transcript stay consistent within a turn.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use crate::chains::answer_evaluation::AnswerExchange;
use crate::chains::message_classification::{
    ClassificationRequest, MessageCategory, MessageClassification,
};
use crate::chains::question_generation::{fallback_question, scheduled_topic, QuestionRequest};
use crate::chains::Chains;
use crate::config::InterviewTuning;
use crate::errors::AppError;
use crate::interview::state_machine::{self, CompletionReason};
use crate::interview::{integrity, introduction, report_assembly};
use crate::models::interview::{Interview, InterviewStatus};
use crate::models::message::Message;
use crate::models::report::Report;
use crate::store::InterviewStore;

/// Neutral placeholder recorded when answer evaluation failed after its
/// retry. Real evaluations score 1-10, so 0 is unambiguous in the record.
pub const EVALUATION_FAILED_SCORE: i32 = 0;
pub const EVALUATION_FAILED_FEEDBACK: &str = "evaluation_failed";

/// What one candidate turn produced.
#[derive(Debug)]
pub enum TurnOutcome {
    /// The interview continues; this assistant message is the reply.
    Reply(Message),
    /// This turn ended the interview and assembled the report.
    Completed {
        report: Report,
        closing_message: String,
    },
}

pub struct ChatTurnOrchestrator {
    store: Arc<dyn InterviewStore>,
    chains: Arc<Chains>,
    tuning: InterviewTuning,
}

impl ChatTurnOrchestrator {
    pub fn new(store: Arc<dyn InterviewStore>, chains: Arc<Chains>, tuning: InterviewTuning) -> Self {
        ChatTurnOrchestrator {
            store,
            chains,
            tuning,
        }
    }

    /// Runs one candidate turn end to end. The caller must already hold
    /// the interview's turn lock.
    pub async fn handle_turn(
        &self,
        interview_id: Uuid,
        text: &str,
        client_metadata: Option<&Value>,
    ) -> Result<TurnOutcome, AppError> {
        let mut interview = self.store.load(interview_id).await?;
        admit(&interview, text)?;

        let mut history = self.store.load_messages(interview_id).await?;
        let current_question = history.iter().rev().find(|m| m.is_question()).cloned();

        // Classification compares against the pending question; before the
        // first question there is nothing to compare, so the message is
        // taken as an answer.
        let classification = match &current_question {
            Some(question) => self.classify(question, text).await,
            None => MessageClassification::assumed_answer(),
        };

        let observed = integrity::capture(client_metadata);
        let candidate = Message::candidate(
            interview_id,
            text,
            observed.response_latency_ms,
            observed.paste_detected,
            Some(classification.category.as_str().to_string()),
        );
        self.store.append_message(&candidate).await?;

        // First message from the candidate activates the interview.
        if interview.status == InterviewStatus::Assigned {
            state_machine::transition(&mut interview, InterviewStatus::InProgress)?;
            self.store.save(&interview).await?;
        }

        // Clarification requests restate the pending question verbatim:
        // no evaluation, no difficulty change, no new question number.
        if classification.category == MessageCategory::Clarification {
            if let Some(question) = &current_question {
                info!(
                    "Interview {interview_id}: clarification request on question {:?}, restating",
                    question.question_number
                );
                let restated = Message::assistant(
                    interview_id,
                    introduction::restate_question(&question.content),
                );
                self.store.append_message(&restated).await?;
                return Ok(TurnOutcome::Reply(restated));
            }
        }

        let mut followup_hint = None;
        if let Some(question) = &current_question {
            followup_hint = self.evaluate(&mut interview, question, &candidate).await?;
            interview.updated_at = Utc::now();
            self.store.save(&interview).await?;
        }

        let questions_asked = history.iter().filter(|m| m.is_question()).count() as i32;

        if let Some(reason) = termination_reason(&interview, questions_asked, &self.tuning) {
            let (report, closing_message) = self.finalize(&mut interview, reason).await?;
            return Ok(TurnOutcome::Completed {
                report,
                closing_message,
            });
        }

        history.push(candidate);
        let text = self
            .next_question(&interview, &history, questions_asked, followup_hint)
            .await;
        let question = Message::question(
            interview_id,
            text,
            questions_asked + 1,
            interview.difficulty_current,
        );
        self.store.append_message(&question).await?;
        Ok(TurnOutcome::Reply(question))
    }

    /// Completes the interview and assembles its report. The status
    /// transition persists before report generation starts, so no further
    /// turns are admitted even if assembly is slow. Used both by the
    /// termination check and by the admin completion endpoint.
    pub async fn finalize(
        &self,
        interview: &mut Interview,
        reason: CompletionReason,
    ) -> Result<(Report, String), AppError> {
        state_machine::complete(interview, reason)?;
        self.store.save(interview).await?;

        let messages = self.store.load_messages(interview.id).await?;
        let report = report_assembly::assemble(
            &self.chains,
            interview,
            &messages,
            self.tuning.fast_answer_threshold_ms,
        )
        .await;
        self.store.save_report(&report).await?;
        info!(
            "Interview {}: report {} stored (overall score {})",
            interview.id, report.id, report.overall_score
        );
        Ok((report, introduction::closing_message()))
    }

    async fn classify(&self, question: &Message, text: &str) -> MessageClassification {
        let request = ClassificationRequest {
            current_question: question.content.clone(),
            candidate_message: text.to_string(),
        };
        match self.chains.classify_message(&request).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!("Message classification failed, treating the message as an answer: {e}");
                MessageClassification::assumed_answer()
            }
        }
    }

    /// Evaluates the candidate's answer to the pending question. On chain
    /// failure the neutral placeholder is recorded and the failure counter
    /// moves; on success the counter resets and difficulty adjusts within
    /// bounds. Returns the evaluator's follow-up hint, if any, for the
    /// next question.
    async fn evaluate(
        &self,
        interview: &mut Interview,
        question: &Message,
        candidate: &Message,
    ) -> Result<Option<String>, AppError> {
        let exchange = AnswerExchange {
            question: question.content.clone(),
            answer: candidate.content.clone(),
            difficulty_level: question
                .difficulty_level
                .unwrap_or(interview.difficulty_current),
        };

        match self.chains.evaluate_answer(&exchange).await {
            Ok(evaluation) => {
                self.store
                    .attach_evaluation(candidate.id, evaluation.score, &evaluation.feedback)
                    .await?;
                let level = interview.apply_difficulty_delta(
                    evaluation.difficulty_delta,
                    self.tuning.difficulty_min,
                    self.tuning.difficulty_max,
                );
                interview.consecutive_failures = 0;
                info!(
                    "Interview {}: question {:?} scored {}/10, difficulty now {level}",
                    interview.id, question.question_number, evaluation.score
                );
                Ok(evaluation.followup_hint)
            }
            Err(e) => {
                warn!(
                    "Interview {}: answer evaluation failed, recording placeholder: {e}",
                    interview.id
                );
                self.store
                    .attach_evaluation(candidate.id, EVALUATION_FAILED_SCORE, EVALUATION_FAILED_FEEDBACK)
                    .await?;
                interview.consecutive_failures += 1;
                Ok(None)
            }
        }
    }

    async fn next_question(
        &self,
        interview: &Interview,
        history: &[Message],
        questions_asked: i32,
        followup_hint: Option<String>,
    ) -> String {
        let areas = interview.focus_areas.0.clone();
        let topic = scheduled_topic(&areas, questions_asked)
            .unwrap_or_else(|| "your background for this role".to_string());
        let previous_questions: Vec<String> = history
            .iter()
            .filter(|m| m.is_question())
            .map(|m| m.content.clone())
            .collect();

        let request = QuestionRequest {
            target_topic: topic.clone(),
            focus_areas: areas,
            difficulty_level: interview.difficulty_current,
            questions_asked,
            followup_hint,
            chat_history: report_assembly::transcript(history),
            previous_questions,
        };

        match self.chains.next_question(&request).await {
            Ok(generated) => generated.question,
            Err(e) => {
                warn!(
                    "Interview {}: question generation failed, using the template question: {e}",
                    interview.id
                );
                fallback_question(&topic)
            }
        }
    }
}

/// Admission: only ASSIGNED and IN_PROGRESS interviews accept candidate
/// messages, and only non-empty ones. Rejection happens before anything
/// is persisted, so a rejected turn leaves no trace.
fn admit(interview: &Interview, text: &str) -> Result<(), AppError> {
    match interview.status {
        InterviewStatus::Assigned | InterviewStatus::InProgress => {}
        current => {
            return Err(AppError::InvalidTransition {
                current,
                requested: InterviewStatus::InProgress,
            })
        }
    }
    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "message text must not be empty".to_string(),
        ));
    }
    Ok(())
}

/// Whether this turn ends the interview, and why. Checked after
/// evaluation, before any new question is generated.
fn termination_reason(
    interview: &Interview,
    questions_asked: i32,
    tuning: &InterviewTuning,
) -> Option<CompletionReason> {
    if questions_asked >= interview.target_question_count {
        return Some(CompletionReason::TargetReached);
    }
    if interview.consecutive_failures >= tuning.max_consecutive_failures {
        return Some(CompletionReason::EvaluationFailures);
    }
    None
}
