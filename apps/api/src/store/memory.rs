#![allow(dead_code)]

//! In-memory store adapter. Backs the engine's test suites and mirrors
//! the Postgres adapter's semantics exactly: whole-row interview upsert,
//! append-only messages with the guarded evaluation fill-in, first report
//! wins.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::interview::Interview;
use crate::models::message::Message;
use crate::models::report::Report;
use crate::store::InterviewStore;

#[derive(Default)]
pub struct InMemoryStore {
    interviews: Mutex<HashMap<Uuid, Interview>>,
    messages: Mutex<Vec<Message>>,
    reports: Mutex<HashMap<Uuid, Report>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InterviewStore for InMemoryStore {
    async fn load(&self, id: Uuid) -> Result<Interview, AppError> {
        self.interviews
            .lock()
            .expect("interview map poisoned")
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))
    }

    async fn save(&self, interview: &Interview) -> Result<(), AppError> {
        self.interviews
            .lock()
            .expect("interview map poisoned")
            .insert(interview.id, interview.clone());
        Ok(())
    }

    async fn append_message(&self, message: &Message) -> Result<(), AppError> {
        self.messages
            .lock()
            .expect("message log poisoned")
            .push(message.clone());
        Ok(())
    }

    async fn attach_evaluation(
        &self,
        message_id: Uuid,
        score: i32,
        feedback: &str,
    ) -> Result<(), AppError> {
        let mut messages = self.messages.lock().expect("message log poisoned");
        if let Some(message) = messages
            .iter_mut()
            .find(|m| m.id == message_id && m.evaluation_score.is_none())
        {
            message.evaluation_score = Some(score);
            message.evaluation_feedback = Some(feedback.to_string());
        }
        Ok(())
    }

    async fn load_messages(&self, interview_id: Uuid) -> Result<Vec<Message>, AppError> {
        Ok(self
            .messages
            .lock()
            .expect("message log poisoned")
            .iter()
            .filter(|m| m.interview_id == interview_id)
            .cloned()
            .collect())
    }

    async fn save_report(&self, report: &Report) -> Result<(), AppError> {
        self.reports
            .lock()
            .expect("report map poisoned")
            .entry(report.interview_id)
            .or_insert_with(|| report.clone());
        Ok(())
    }

    async fn load_report(&self, interview_id: Uuid) -> Result<Option<Report>, AppError> {
        Ok(self
            .reports
            .lock()
            .expect("report map poisoned")
            .get(&interview_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::report::IntegritySummary;
    use chrono::Utc;
    use sqlx::types::Json;

    fn report_for(interview_id: Uuid, summary: &str) -> Report {
        Report {
            id: Uuid::new_v4(),
            interview_id,
            overall_score: 5,
            summary: summary.to_string(),
            recommendation: "hold".to_string(),
            strengths: vec![],
            gaps: vec![],
            topic_breakdown: Json(vec![]),
            integrity: Json(IntegritySummary::default()),
            model_findings: Json(vec![]),
            quality_flags: vec![],
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_load_unknown_interview_is_not_found() {
        let store = InMemoryStore::new();
        let err = store.load(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let store = InMemoryStore::new();
        let mut interview = Interview::new(8, 5);
        store.save(&interview).await.unwrap();

        interview.difficulty_current = 7;
        store.save(&interview).await.unwrap();

        let loaded = store.load(interview.id).await.unwrap();
        assert_eq!(loaded.difficulty_current, 7);
    }

    #[tokio::test]
    async fn test_messages_come_back_in_append_order() {
        let store = InMemoryStore::new();
        let interview_id = Uuid::new_v4();

        store
            .append_message(&Message::assistant(interview_id, "welcome"))
            .await
            .unwrap();
        store
            .append_message(&Message::candidate(interview_id, "ready", None, None, None))
            .await
            .unwrap();
        store
            .append_message(&Message::question(interview_id, "first question", 1, 5))
            .await
            .unwrap();

        let messages = store.load_messages(interview_id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "welcome");
        assert_eq!(messages[1].content, "ready");
        assert_eq!(messages[2].content, "first question");
    }

    #[tokio::test]
    async fn test_append_order_survives_identical_timestamps() {
        let store = InMemoryStore::new();
        let interview_id = Uuid::new_v4();
        let stamp = Utc::now();

        let mut first = Message::question(interview_id, "alpha", 1, 5);
        let mut second = Message::candidate(interview_id, "beta", None, None, None);
        let mut third = Message::question(interview_id, "gamma", 2, 5);
        first.created_at = stamp;
        second.created_at = stamp;
        third.created_at = stamp;

        store.append_message(&first).await.unwrap();
        store.append_message(&second).await.unwrap();
        store.append_message(&third).await.unwrap();

        let contents: Vec<String> = store
            .load_messages(interview_id)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, ["alpha", "beta", "gamma"]);
    }

    #[tokio::test]
    async fn test_messages_are_scoped_to_their_interview() {
        let store = InMemoryStore::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        store.append_message(&Message::assistant(a, "for a")).await.unwrap();
        store.append_message(&Message::assistant(b, "for b")).await.unwrap();

        let messages = store.load_messages(a).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "for a");
    }

    #[tokio::test]
    async fn test_attach_evaluation_fills_once_and_only_once() {
        let store = InMemoryStore::new();
        let interview_id = Uuid::new_v4();
        let message = Message::candidate(interview_id, "my answer", None, None, None);
        store.append_message(&message).await.unwrap();

        store.attach_evaluation(message.id, 7, "good").await.unwrap();
        store.attach_evaluation(message.id, 2, "overwrite attempt").await.unwrap();

        let messages = store.load_messages(interview_id).await.unwrap();
        assert_eq!(messages[0].evaluation_score, Some(7));
        assert_eq!(messages[0].evaluation_feedback.as_deref(), Some("good"));
    }

    #[tokio::test]
    async fn test_first_report_wins() {
        let store = InMemoryStore::new();
        let interview_id = Uuid::new_v4();

        store.save_report(&report_for(interview_id, "first")).await.unwrap();
        store.save_report(&report_for(interview_id, "second")).await.unwrap();

        let report = store.load_report(interview_id).await.unwrap().unwrap();
        assert_eq!(report.summary, "first");
    }

    #[tokio::test]
    async fn test_missing_report_is_none() {
        let store = InMemoryStore::new();
        assert!(store.load_report(Uuid::new_v4()).await.unwrap().is_none());
    }
}
