//! Generation chains — every LLM-backed capability of the interview
//! engine, behind one polymorphic `Chain` contract.
//!
//! Each chain owns its prompt template and output schema; the shared
//! `ChainRunner` owns timeouts, the single repair attempt, and backoff.
//! Callers receive either a validated typed output or a `ChainError`, and
//! decide per call site what degradation looks like (fallback question,
//! neutral evaluation, deterministic report).

pub mod answer_evaluation;
pub mod document_analysis;
pub mod message_classification;
pub mod prompts;
pub mod question_generation;
pub mod report_generation;
pub mod validator;

use std::sync::Arc;
use std::time::Duration;

use crate::llm_client::Completion;

use answer_evaluation::{AnswerEvaluation, AnswerEvaluationChain, AnswerExchange};
use document_analysis::{DocumentAnalysisChain, DocumentSet, MatchAnalysis};
use message_classification::{
    ClassificationRequest, MessageClassification, MessageClassificationChain,
};
use question_generation::{GeneratedQuestion, QuestionGenerationChain, QuestionRequest};
use report_generation::{ReportContext, ReportDraft, ReportGenerationChain};
use validator::{ChainError, ChainRunner};

/// The full chain set the engine runs, sharing one completion backend and
/// one timeout/retry policy.
pub struct Chains {
    runner: ChainRunner,
    analysis: DocumentAnalysisChain,
    questions: QuestionGenerationChain,
    evaluation: AnswerEvaluationChain,
    classification: MessageClassificationChain,
    report: ReportGenerationChain,
}

impl Chains {
    pub fn new(completion: Arc<dyn Completion>, timeout_per_attempt: Duration) -> Self {
        Self {
            runner: ChainRunner::new(completion, timeout_per_attempt),
            analysis: DocumentAnalysisChain,
            questions: QuestionGenerationChain,
            evaluation: AnswerEvaluationChain,
            classification: MessageClassificationChain,
            report: ReportGenerationChain,
        }
    }

    pub async fn analyze_documents(
        &self,
        documents: &DocumentSet,
    ) -> Result<MatchAnalysis, ChainError> {
        self.runner.run(&self.analysis, documents).await
    }

    pub async fn next_question(
        &self,
        request: &QuestionRequest,
    ) -> Result<GeneratedQuestion, ChainError> {
        self.runner.run(&self.questions, request).await
    }

    pub async fn evaluate_answer(
        &self,
        exchange: &AnswerExchange,
    ) -> Result<AnswerEvaluation, ChainError> {
        self.runner.run(&self.evaluation, exchange).await
    }

    pub async fn classify_message(
        &self,
        request: &ClassificationRequest,
    ) -> Result<MessageClassification, ChainError> {
        self.runner.run(&self.classification, request).await
    }

    pub async fn generate_report(
        &self,
        context: &ReportContext,
    ) -> Result<ReportDraft, ChainError> {
        self.runner.run(&self.report, context).await
    }
}
