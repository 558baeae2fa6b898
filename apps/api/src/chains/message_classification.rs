//! Message classification — decides whether a candidate message answers
//! the pending question, asks for clarification, or dodges it.

use serde::{Deserialize, Serialize};

use crate::chains::prompts::{MESSAGE_CLASSIFICATION_PROMPT_TEMPLATE, MESSAGE_CLASSIFICATION_SYSTEM};
use crate::chains::validator::{Chain, ChainOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Answer,
    Clarification,
    OffTopic,
}

impl MessageCategory {
    /// Label persisted on the candidate message.
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::Answer => "answer",
            MessageCategory::Clarification => "clarification",
            MessageCategory::OffTopic => "off_topic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    pub current_question: String,
    pub candidate_message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageClassification {
    pub category: MessageCategory,
    pub confidence: f64,
}

impl MessageClassification {
    /// Default used when classification itself fails: treat the message as
    /// an answer so the candidate is never stalled by an internal error.
    pub fn assumed_answer() -> Self {
        MessageClassification {
            category: MessageCategory::Answer,
            confidence: 0.0,
        }
    }
}

impl ChainOutput for MessageClassification {
    fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "confidence must be between 0.0 and 1.0, got {}",
                self.confidence
            ));
        }
        Ok(())
    }
}

pub struct MessageClassificationChain;

impl Chain for MessageClassificationChain {
    type Input = ClassificationRequest;
    type Output = MessageClassification;

    const NAME: &'static str = "message_classification";

    fn prompts(&self, input: &ClassificationRequest) -> (String, String) {
        let prompt = MESSAGE_CLASSIFICATION_PROMPT_TEMPLATE
            .replace("{current_question}", &input.current_question)
            .replace("{candidate_message}", &input.candidate_message);
        (prompt, MESSAGE_CLASSIFICATION_SYSTEM.to_string())
    }
}
