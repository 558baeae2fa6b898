//! PostgreSQL adapter for the interview store.
//!
//! `interviews` is written whole-row via upsert so creation and update
//! are the same atomic statement. `messages` is insert-only plus the
//! guarded evaluation fill-in; the table carries a DB-assigned bigserial
//! `seq` column and transcripts read back in `seq` order, so append order
//! never depends on `created_at` resolution. `reports` is keyed unique on
//! interview_id; `ON CONFLICT DO NOTHING` makes the first report win and
//! keeps reports immutable even across admin retries.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::Interview;
use crate::models::message::Message;
use crate::models::report::Report;
use crate::store::InterviewStore;

pub struct PgInterviewStore {
    pool: PgPool,
}

impl PgInterviewStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterviewStore for PgInterviewStore {
    async fn load(&self, id: Uuid) -> Result<Interview, AppError> {
        sqlx::query_as::<_, Interview>("SELECT * FROM interviews WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
    }

    async fn save(&self, interview: &Interview) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO interviews
                (id, status, target_question_count, difficulty_start, difficulty_current,
                 match_score, match_summary, focus_areas, resume_text, role_description_text,
                 job_offering_text, consecutive_failures, candidate_token, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                difficulty_current = EXCLUDED.difficulty_current,
                match_score = EXCLUDED.match_score,
                match_summary = EXCLUDED.match_summary,
                focus_areas = EXCLUDED.focus_areas,
                resume_text = EXCLUDED.resume_text,
                role_description_text = EXCLUDED.role_description_text,
                job_offering_text = EXCLUDED.job_offering_text,
                consecutive_failures = EXCLUDED.consecutive_failures,
                candidate_token = EXCLUDED.candidate_token,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(interview.id)
        .bind(interview.status)
        .bind(interview.target_question_count)
        .bind(interview.difficulty_start)
        .bind(interview.difficulty_current)
        .bind(interview.match_score)
        .bind(&interview.match_summary)
        .bind(&interview.focus_areas)
        .bind(&interview.resume_text)
        .bind(&interview.role_description_text)
        .bind(&interview.job_offering_text)
        .bind(interview.consecutive_failures)
        .bind(&interview.candidate_token)
        .bind(interview.created_at)
        .bind(interview.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append_message(&self, message: &Message) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO messages
                (id, interview_id, role, content, question_number, difficulty_level,
                 response_latency_ms, paste_detected, classification,
                 evaluation_score, evaluation_feedback, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(message.id)
        .bind(message.interview_id)
        .bind(message.role)
        .bind(&message.content)
        .bind(message.question_number)
        .bind(message.difficulty_level)
        .bind(message.response_latency_ms)
        .bind(message.paste_detected)
        .bind(&message.classification)
        .bind(message.evaluation_score)
        .bind(&message.evaluation_feedback)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn attach_evaluation(
        &self,
        message_id: Uuid,
        score: i32,
        feedback: &str,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE messages
            SET evaluation_score = $2, evaluation_feedback = $3
            WHERE id = $1 AND evaluation_score IS NULL
            "#,
        )
        .bind(message_id)
        .bind(score)
        .bind(feedback)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_messages(&self, interview_id: Uuid) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT * FROM messages WHERE interview_id = $1 ORDER BY seq ASC",
        )
        .bind(interview_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }

    async fn save_report(&self, report: &Report) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO reports
                (id, interview_id, overall_score, summary, recommendation, strengths, gaps,
                 topic_breakdown, integrity, model_findings, quality_flags, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (interview_id) DO NOTHING
            "#,
        )
        .bind(report.id)
        .bind(report.interview_id)
        .bind(report.overall_score)
        .bind(&report.summary)
        .bind(&report.recommendation)
        .bind(&report.strengths)
        .bind(&report.gaps)
        .bind(&report.topic_breakdown)
        .bind(&report.integrity)
        .bind(&report.model_findings)
        .bind(&report.quality_flags)
        .bind(report.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn load_report(&self, interview_id: Uuid) -> Result<Option<Report>, AppError> {
        let report =
            sqlx::query_as::<_, Report>("SELECT * FROM reports WHERE interview_id = $1")
                .bind(interview_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(report)
    }
}
