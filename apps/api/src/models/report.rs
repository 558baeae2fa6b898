use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Per-topic rollup inside a report. `questions_asked` and `average_score`
/// are computed from the transcript; `assessment` is the narrative the
/// report chain wrote for that topic, when it produced one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicBreakdown {
    pub topic: String,
    pub questions_asked: i32,
    pub average_score: Option<f64>,
    pub assessment: Option<String>,
}

/// One flagged answer in the integrity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityFlag {
    pub question_number: Option<i32>,
    pub latency_ms: Option<i64>,
    pub indicators: Vec<String>,
}

/// Aggregated client-side observations across all candidate answers.
/// Informational only. Nothing here gates scoring or completion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegritySummary {
    pub answers_observed: i64,
    pub evaluated_answers: i64,
    pub paste_events: i64,
    pub fast_answers: i64,
    pub unknown_latency: i64,
    pub fast_threshold_ms: i64,
    pub average_latency_ms: Option<f64>,
    pub min_latency_ms: Option<i64>,
    pub flags: Vec<IntegrityFlag>,
}

/// A suspicion the report chain raised about one answer, with its own
/// certainty estimate. Kept separate from the measured integrity summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegrityFinding {
    pub question_number: Option<i32>,
    pub certainty: i32,
    pub indicators: Vec<String>,
}

/// The final hiring-signal report. Exactly one per completed interview,
/// written once and never updated.
///
/// `quality_flags` records degradations that occurred while assembling
/// the report (for example a report-chain failure that forced the
/// deterministic fallback); an empty list means a clean run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub overall_score: i32,
    pub summary: String,
    pub recommendation: String,
    pub strengths: Vec<String>,
    pub gaps: Vec<String>,
    pub topic_breakdown: Json<Vec<TopicBreakdown>>,
    pub integrity: Json<IntegritySummary>,
    pub model_findings: Json<Vec<IntegrityFinding>>,
    pub quality_flags: Vec<String>,
    pub created_at: DateTime<Utc>,
}
