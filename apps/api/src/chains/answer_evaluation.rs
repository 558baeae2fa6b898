//! Answer evaluation — scores one answer against the question that was
//! asked and proposes a difficulty adjustment for the next one.

use serde::{Deserialize, Serialize};

use crate::chains::prompts::{ANSWER_EVALUATION_PROMPT_TEMPLATE, ANSWER_EVALUATION_SYSTEM};
use crate::chains::validator::{Chain, ChainOutput};

/// Largest difficulty step a single evaluation may request, in either
/// direction. Anything outside it is a schema violation, not a bigger step.
pub const MAX_DIFFICULTY_DELTA: i32 = 2;

/// One question/answer pair plus the difficulty it was asked at.
#[derive(Debug, Clone)]
pub struct AnswerExchange {
    pub question: String,
    pub answer: String,
    pub difficulty_level: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerEvaluation {
    pub score: i32,
    pub feedback: String,
    pub evidence: Option<String>,
    pub followup_hint: Option<String>,
    pub difficulty_delta: i32,
}

impl ChainOutput for AnswerEvaluation {
    fn validate(&self) -> Result<(), String> {
        if !(1..=10).contains(&self.score) {
            return Err(format!(
                "score must be an integer between 1 and 10, got {}",
                self.score
            ));
        }
        if self.feedback.trim().is_empty() {
            return Err("feedback must not be empty".to_string());
        }
        if self.difficulty_delta.abs() > MAX_DIFFICULTY_DELTA {
            return Err(format!(
                "difficulty_delta must be between -{MAX_DIFFICULTY_DELTA} and \
                {MAX_DIFFICULTY_DELTA}, got {}",
                self.difficulty_delta
            ));
        }
        Ok(())
    }
}

pub struct AnswerEvaluationChain;

impl Chain for AnswerEvaluationChain {
    type Input = AnswerExchange;
    type Output = AnswerEvaluation;

    const NAME: &'static str = "answer_evaluation";

    fn prompts(&self, input: &AnswerExchange) -> (String, String) {
        let prompt = ANSWER_EVALUATION_PROMPT_TEMPLATE
            .replace("{difficulty_level}", &input.difficulty_level.to_string())
            .replace("{question}", &input.question)
            .replace("{answer}", &input.answer);
        (prompt, ANSWER_EVALUATION_SYSTEM.to_string())
    }
}
