use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle state of an interview. Stored in PostgreSQL as the
/// `interview_status` enum; serialized to clients in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "interview_status", rename_all = "snake_case")]
pub enum InterviewStatus {
    Draft,
    Ready,
    Assigned,
    InProgress,
    Completed,
}

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewStatus::Draft => "DRAFT",
            InterviewStatus::Ready => "READY",
            InterviewStatus::Assigned => "ASSIGNED",
            InterviewStatus::InProgress => "IN_PROGRESS",
            InterviewStatus::Completed => "COMPLETED",
        }
    }
}

impl std::fmt::Display for InterviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weighted interview topic produced by document analysis.
/// Weights are relative shares in (0, 1]; the scheduler normalizes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusArea {
    pub topic: String,
    pub weight: f64,
}

/// One interview, from document upload through the final report.
///
/// `focus_areas` lives in a JSONB column; everything else is scalar.
/// `difficulty_current` and `consecutive_failures` are the only fields
/// that move during questioning, and only the chat turn moves them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Interview {
    pub id: Uuid,
    pub status: InterviewStatus,
    pub target_question_count: i32,
    pub difficulty_start: i32,
    pub difficulty_current: i32,
    pub match_score: Option<i32>,
    pub match_summary: Option<String>,
    pub focus_areas: Json<Vec<FocusArea>>,
    pub resume_text: Option<String>,
    pub role_description_text: Option<String>,
    pub job_offering_text: Option<String>,
    pub consecutive_failures: i32,
    #[serde(skip_serializing)]
    pub candidate_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Interview {
    /// Builds a fresh DRAFT interview with no documents attached.
    pub fn new(target_question_count: i32, difficulty_start: i32) -> Self {
        let now = Utc::now();
        Interview {
            id: Uuid::new_v4(),
            status: InterviewStatus::Draft,
            target_question_count,
            difficulty_start,
            difficulty_current: difficulty_start,
            match_score: None,
            match_summary: None,
            focus_areas: Json(Vec::new()),
            resume_text: None,
            role_description_text: None,
            job_offering_text: None,
            consecutive_failures: 0,
            candidate_token: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies an evaluation difficulty delta, clamped to `[min, max]`.
    /// Returns the difficulty actually in effect afterwards.
    pub fn apply_difficulty_delta(&mut self, delta: i32, min: i32, max: i32) -> i32 {
        self.difficulty_current = (self.difficulty_current + delta).clamp(min, max);
        self.difficulty_current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_interview_starts_in_draft() {
        let interview = Interview::new(8, 5);
        assert_eq!(interview.status, InterviewStatus::Draft);
        assert_eq!(interview.difficulty_current, 5);
        assert_eq!(interview.consecutive_failures, 0);
        assert!(interview.focus_areas.0.is_empty());
    }

    #[test]
    fn test_difficulty_delta_clamps_at_upper_bound() {
        let mut interview = Interview::new(8, 5);
        interview.difficulty_current = 9;
        assert_eq!(interview.apply_difficulty_delta(2, 3, 10), 10);
    }

    #[test]
    fn test_difficulty_delta_clamps_at_lower_bound() {
        let mut interview = Interview::new(8, 5);
        interview.difficulty_current = 3;
        assert_eq!(interview.apply_difficulty_delta(-2, 3, 10), 3);
    }

    #[test]
    fn test_status_serializes_screaming_snake_case() {
        let json = serde_json::to_string(&InterviewStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
    }

    proptest! {
        #[test]
        fn difficulty_never_leaves_bounds(
            start in 3..=10i32,
            deltas in proptest::collection::vec(-2..=2i32, 0..32),
        ) {
            let mut interview = Interview::new(8, start);
            for delta in deltas {
                let current = interview.apply_difficulty_delta(delta, 3, 10);
                prop_assert!((3..=10).contains(&current));
            }
        }
    }
}
