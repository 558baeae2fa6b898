use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Who authored a transcript message. Stored as the `message_role` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "message_role", rename_all = "lowercase")]
pub enum MessageRole {
    Candidate,
    Assistant,
}

/// One transcript entry. Append-only: rows are never rewritten after the
/// turn that created them, except the one-shot evaluation fill-in on the
/// candidate message being answered in that same turn.
///
/// `question_number` and `difficulty_level` are set only on assistant
/// messages that pose a numbered question; introductions and restated
/// questions leave them NULL. `response_latency_ms` and `paste_detected`
/// are candidate-side client observations and may be NULL when the client
/// did not report them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub question_number: Option<i32>,
    pub difficulty_level: Option<i32>,
    pub response_latency_ms: Option<i64>,
    pub paste_detected: Option<bool>,
    pub classification: Option<String>,
    pub evaluation_score: Option<i32>,
    pub evaluation_feedback: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A candidate message carrying whatever integrity metadata the client
    /// supplied. Evaluation fields start NULL and are filled in later in
    /// the same turn.
    pub fn candidate(
        interview_id: Uuid,
        content: impl Into<String>,
        response_latency_ms: Option<i64>,
        paste_detected: Option<bool>,
        classification: Option<String>,
    ) -> Self {
        Message {
            id: Uuid::new_v4(),
            interview_id,
            role: MessageRole::Candidate,
            content: content.into(),
            question_number: None,
            difficulty_level: None,
            response_latency_ms,
            paste_detected,
            classification,
            evaluation_score: None,
            evaluation_feedback: None,
            created_at: Utc::now(),
        }
    }

    /// An assistant message that is not a numbered question: the interview
    /// introduction or a restated question after a clarification request.
    pub fn assistant(interview_id: Uuid, content: impl Into<String>) -> Self {
        Message {
            id: Uuid::new_v4(),
            interview_id,
            role: MessageRole::Assistant,
            content: content.into(),
            question_number: None,
            difficulty_level: None,
            response_latency_ms: None,
            paste_detected: None,
            classification: None,
            evaluation_score: None,
            evaluation_feedback: None,
            created_at: Utc::now(),
        }
    }

    /// A numbered interview question posed at a given difficulty.
    pub fn question(
        interview_id: Uuid,
        content: impl Into<String>,
        question_number: i32,
        difficulty_level: i32,
    ) -> Self {
        Message {
            question_number: Some(question_number),
            difficulty_level: Some(difficulty_level),
            ..Message::assistant(interview_id, content)
        }
    }

    /// True for assistant messages that pose a numbered question.
    pub fn is_question(&self) -> bool {
        self.role == MessageRole::Assistant && self.question_number.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_carries_number_and_difficulty() {
        let msg = Message::question(Uuid::new_v4(), "Explain ownership in Rust.", 3, 6);
        assert!(msg.is_question());
        assert_eq!(msg.question_number, Some(3));
        assert_eq!(msg.difficulty_level, Some(6));
        assert_eq!(msg.role, MessageRole::Assistant);
    }

    #[test]
    fn test_introduction_is_not_a_question() {
        let msg = Message::assistant(Uuid::new_v4(), "Welcome to the interview.");
        assert!(!msg.is_question());
        assert!(msg.question_number.is_none());
    }

    #[test]
    fn test_candidate_message_starts_unevaluated() {
        let msg = Message::candidate(
            Uuid::new_v4(),
            "I would use a HashMap here.",
            Some(42_000),
            Some(false),
            Some("answer".to_string()),
        );
        assert!(msg.evaluation_score.is_none());
        assert!(msg.evaluation_feedback.is_none());
        assert_eq!(msg.response_latency_ms, Some(42_000));
    }
}
