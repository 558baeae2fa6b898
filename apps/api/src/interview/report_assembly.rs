//! Final report assembly.
//!
//! Everything the report rests on — transcript, per-question scores,
//! per-topic rollups, integrity measurements — is computed here from the
//! stored record, then handed to the report chain as pre-rendered text.
//! If the chain fails after its repair attempt, a deterministic fallback
//! report is built from the same blocks, so completion always yields
//! exactly one report.

use tracing::warn;
use uuid::Uuid;

use crate::chains::question_generation::scheduled_topic;
use crate::chains::report_generation::{ReportContext, ReportDraft};
use crate::chains::Chains;
use crate::interview::integrity;
use crate::models::interview::Interview;
use crate::models::message::{Message, MessageRole};
use crate::models::report::{IntegritySummary, Report, TopicBreakdown};

/// Quality flag recorded when the report chain failed and the
/// deterministic fallback produced the report body.
pub const REPORT_FALLBACK_FLAG: &str = "report_generation_failed";

/// One asked question with whatever evaluation its answer received.
/// The latest evaluated answer wins when a turn was resubmitted.
struct ScoredQuestion {
    number: i32,
    difficulty: Option<i32>,
    score: Option<i32>,
    feedback: Option<String>,
}

fn scored_questions(messages: &[Message]) -> Vec<ScoredQuestion> {
    let mut questions: Vec<ScoredQuestion> = Vec::new();
    for message in messages {
        match message.role {
            MessageRole::Assistant => {
                if let Some(number) = message.question_number {
                    questions.push(ScoredQuestion {
                        number,
                        difficulty: message.difficulty_level,
                        score: None,
                        feedback: None,
                    });
                }
            }
            MessageRole::Candidate => {
                if message.evaluation_score.is_some() {
                    if let Some(question) = questions.last_mut() {
                        question.score = message.evaluation_score;
                        question.feedback = message.evaluation_feedback.clone();
                    }
                }
            }
        }
    }
    questions
}

/// Role-tagged transcript, one line per message, in creation order.
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| {
            let speaker = match message.role {
                MessageRole::Assistant => "Interviewer",
                MessageRole::Candidate => "Candidate",
            };
            format!("{speaker}: {}", message.content)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_match_analysis(interview: &Interview) -> String {
    let mut lines = vec![format!(
        "Match score: {}/10",
        interview
            .match_score
            .map(|score| score.to_string())
            .unwrap_or_else(|| "unscored".to_string())
    )];
    if let Some(summary) = &interview.match_summary {
        lines.push(summary.clone());
    }
    if !interview.focus_areas.0.is_empty() {
        let areas = interview
            .focus_areas
            .0
            .iter()
            .map(|area| format!("{} ({:.2})", area.topic, area.weight))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("Focus areas: {areas}"));
    }
    lines.join("\n")
}

fn format_question_scores(messages: &[Message]) -> String {
    let questions = scored_questions(messages);
    if questions.is_empty() {
        return "(no questions were asked)".to_string();
    }

    questions
        .iter()
        .map(|question| {
            let difficulty = question
                .difficulty
                .map(|level| format!(" (difficulty {level})"))
                .unwrap_or_default();
            match question.score {
                Some(score) if score >= 1 => format!(
                    "Q{}{difficulty}: {score}/10 - {}",
                    question.number,
                    question.feedback.as_deref().unwrap_or("no feedback recorded")
                ),
                Some(_) => format!("Q{}{difficulty}: evaluation failed", question.number),
                None => format!("Q{}{difficulty}: unanswered", question.number),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Per-focus-area rollup from the stored record. Topics are attributed by
/// replaying the question schedule, so the breakdown is a pure function
/// of (focus areas, transcript). Scores average over real evaluations;
/// failed-evaluation placeholders count the question but not the score.
fn topic_breakdown(interview: &Interview, messages: &[Message]) -> Vec<TopicBreakdown> {
    let areas = &interview.focus_areas.0;
    let questions = scored_questions(messages);

    areas
        .iter()
        .map(|area| {
            let mut asked = 0;
            let mut scores: Vec<i32> = Vec::new();
            for question in &questions {
                if scheduled_topic(areas, question.number - 1).as_deref() == Some(area.topic.as_str()) {
                    asked += 1;
                    if let Some(score) = question.score.filter(|score| *score >= 1) {
                        scores.push(score);
                    }
                }
            }
            TopicBreakdown {
                topic: area.topic.clone(),
                questions_asked: asked,
                average_score: (!scores.is_empty())
                    .then(|| scores.iter().sum::<i32>() as f64 / scores.len() as f64),
                assessment: None,
            }
        })
        .collect()
}

fn merge_assessments(breakdown: &mut [TopicBreakdown], draft: &ReportDraft) {
    for entry in breakdown {
        entry.assessment = draft
            .topic_assessments
            .iter()
            .find(|assessment| assessment.topic.trim().eq_ignore_ascii_case(entry.topic.trim()))
            .map(|assessment| assessment.assessment.clone());
    }
}

/// Rounded mean of the real evaluation scores, floored at 1 so a report
/// always carries a value on the 1-10 scale even when nothing scored.
fn fallback_overall_score(messages: &[Message]) -> i32 {
    let scores: Vec<i32> = scored_questions(messages)
        .iter()
        .filter_map(|question| question.score.filter(|score| *score >= 1))
        .collect();
    if scores.is_empty() {
        return 1;
    }
    ((scores.iter().sum::<i32>() as f64 / scores.len() as f64).round() as i32).clamp(1, 10)
}

fn fallback_report(
    interview: &Interview,
    messages: &[Message],
    summary: IntegritySummary,
) -> Report {
    let questions = scored_questions(messages);
    let evaluated = questions
        .iter()
        .filter(|question| question.score.is_some_and(|score| score >= 1))
        .count();
    let overall_score = fallback_overall_score(messages);

    Report {
        id: Uuid::new_v4(),
        interview_id: interview.id,
        overall_score,
        summary: format!(
            "Automated report generation was unavailable for this interview. \
            {} questions were asked and {} answers were evaluated, for an average \
            score of {}/10. The stored transcript and per-question scores are \
            complete and should be reviewed directly.",
            questions.len(),
            evaluated,
            overall_score
        ),
        recommendation: "Review the transcript and per-question scores manually before \
            making a decision."
            .to_string(),
        strengths: Vec::new(),
        gaps: Vec::new(),
        topic_breakdown: sqlx::types::Json(topic_breakdown(interview, messages)),
        integrity: sqlx::types::Json(summary),
        model_findings: sqlx::types::Json(Vec::new()),
        quality_flags: vec![REPORT_FALLBACK_FLAG.to_string()],
        created_at: chrono::Utc::now(),
    }
}

fn report_from_draft(
    interview: &Interview,
    messages: &[Message],
    draft: ReportDraft,
    summary: IntegritySummary,
) -> Report {
    let mut breakdown = topic_breakdown(interview, messages);
    merge_assessments(&mut breakdown, &draft);

    Report {
        id: Uuid::new_v4(),
        interview_id: interview.id,
        overall_score: draft.overall_score,
        summary: draft.summary,
        recommendation: draft.recommendation,
        strengths: draft.strengths,
        gaps: draft.gaps,
        topic_breakdown: sqlx::types::Json(breakdown),
        integrity: sqlx::types::Json(summary),
        model_findings: sqlx::types::Json(draft.integrity_findings),
        quality_flags: Vec::new(),
        created_at: chrono::Utc::now(),
    }
}

/// Builds the final report over the full stored record. Chain failure is
/// absorbed here; the returned report is ready to persist either way.
pub async fn assemble(
    chains: &Chains,
    interview: &Interview,
    messages: &[Message],
    fast_threshold_ms: i64,
) -> Report {
    let summary = integrity::summarize(messages, fast_threshold_ms);
    let context = ReportContext {
        match_analysis: format_match_analysis(interview),
        transcript: transcript(messages),
        question_scores: format_question_scores(messages),
        integrity_summary: integrity::describe(&summary),
    };

    match chains.generate_report(&context).await {
        Ok(draft) => report_from_draft(interview, messages, draft, summary),
        Err(e) => {
            warn!(
                "Interview {}: report generation failed, falling back to the \
                deterministic report: {e}",
                interview.id
            );
            fallback_report(interview, messages, summary)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use sqlx::types::Json;

    use crate::llm_client::testing::{ScriptedCompletion, ScriptedReply};
    use crate::models::interview::FocusArea;

    fn interview_with_areas() -> Interview {
        let mut interview = Interview::new(4, 5);
        interview.match_score = Some(7);
        interview.match_summary = Some("Solid backend background.".to_string());
        interview.focus_areas = Json(vec![
            FocusArea { topic: "sql".to_string(), weight: 0.5 },
            FocusArea { topic: "async".to_string(), weight: 0.5 },
        ]);
        interview
    }

    fn evaluated_answer(interview_id: Uuid, score: i32, feedback: &str) -> Message {
        let mut message = Message::candidate(
            interview_id,
            "my answer",
            Some(30_000),
            Some(false),
            Some("answer".to_string()),
        );
        message.evaluation_score = Some(score);
        message.evaluation_feedback = Some(feedback.to_string());
        message
    }

    /// Intro, greeting, then `scores.len()` question/answer pairs.
    fn transcript_messages(interview_id: Uuid, scores: &[i32]) -> Vec<Message> {
        let mut messages = vec![
            Message::assistant(interview_id, "welcome"),
            Message::candidate(interview_id, "ready", None, None, None),
        ];
        for (i, score) in scores.iter().enumerate() {
            let number = i as i32 + 1;
            messages.push(Message::question(
                interview_id,
                format!("question {number}"),
                number,
                5,
            ));
            messages.push(evaluated_answer(interview_id, *score, "noted"));
        }
        messages
    }

    #[test]
    fn test_transcript_tags_roles() {
        let id = Uuid::new_v4();
        let messages = vec![
            Message::question(id, "What is an index?", 1, 5),
            Message::candidate(id, "A lookup structure.", None, None, Some("answer".to_string())),
        ];
        let text = transcript(&messages);
        assert_eq!(text, "Interviewer: What is an index?\nCandidate: A lookup structure.");
    }

    #[test]
    fn test_question_scores_render_failures_and_gaps() {
        let id = Uuid::new_v4();
        let mut messages = vec![
            Message::question(id, "q1", 1, 5),
            evaluated_answer(id, 7, "good depth"),
            Message::question(id, "q2", 2, 6),
            evaluated_answer(id, 0, "evaluation_failed"),
            Message::question(id, "q3", 3, 6),
        ];
        messages.push(Message::candidate(id, "unscored", None, None, Some("answer".to_string())));

        let text = format_question_scores(&messages);
        assert!(text.contains("Q1 (difficulty 5): 7/10 - good depth"));
        assert!(text.contains("Q2 (difficulty 6): evaluation failed"));
        assert!(text.contains("Q3 (difficulty 6): unanswered"));
    }

    #[test]
    fn test_topic_breakdown_replays_the_schedule() {
        let interview = interview_with_areas();
        // Equal weights alternate: Q1 -> sql, Q2 -> async, Q3 -> sql.
        let messages = transcript_messages(interview.id, &[6, 8, 10]);

        let breakdown = topic_breakdown(&interview, &messages);
        assert_eq!(breakdown.len(), 2);

        let sql = breakdown.iter().find(|entry| entry.topic == "sql").unwrap();
        assert_eq!(sql.questions_asked, 2);
        assert_eq!(sql.average_score, Some(8.0));

        let async_topic = breakdown.iter().find(|entry| entry.topic == "async").unwrap();
        assert_eq!(async_topic.questions_asked, 1);
        assert_eq!(async_topic.average_score, Some(8.0));
    }

    #[test]
    fn test_failed_evaluations_count_questions_but_not_scores() {
        let interview = interview_with_areas();
        let messages = transcript_messages(interview.id, &[0, 6]);

        let breakdown = topic_breakdown(&interview, &messages);
        let sql = breakdown.iter().find(|entry| entry.topic == "sql").unwrap();
        assert_eq!(sql.questions_asked, 1);
        assert_eq!(sql.average_score, None);
    }

    #[test]
    fn test_fallback_overall_score_is_rounded_mean_with_floor() {
        let id = Uuid::new_v4();
        assert_eq!(fallback_overall_score(&transcript_messages(id, &[6, 7])), 7);
        assert_eq!(fallback_overall_score(&transcript_messages(id, &[2, 3])), 3);
        // Only failed evaluations: floor at 1.
        assert_eq!(fallback_overall_score(&transcript_messages(id, &[0, 0])), 1);
        assert_eq!(fallback_overall_score(&[]), 1);
    }

    #[tokio::test]
    async fn test_assemble_merges_draft_assessments_into_breakdown() {
        let interview = interview_with_areas();
        let messages = transcript_messages(interview.id, &[7]);

        let completion = Arc::new(ScriptedCompletion::new(vec![ScriptedReply::text(
            r#"{
                "overall_score": 7,
                "summary": "Competent throughout.",
                "strengths": ["query planning"],
                "gaps": [],
                "recommendation": "Advance",
                "topic_assessments": [
                    {"topic": "SQL", "assessment": "Confident with indexing."}
                ],
                "integrity_findings": []
            }"#,
        )]));
        let chains = Chains::new(completion, Duration::from_secs(60));

        let report = assemble(&chains, &interview, &messages, 10_000).await;
        assert_eq!(report.overall_score, 7);
        assert!(report.quality_flags.is_empty());

        // "SQL" from the draft matches the "sql" focus area.
        let sql = report
            .topic_breakdown
            .0
            .iter()
            .find(|entry| entry.topic == "sql")
            .unwrap();
        assert_eq!(sql.assessment.as_deref(), Some("Confident with indexing."));
        assert_eq!(report.integrity.0.answers_observed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_assemble_falls_back_when_the_chain_fails_twice() {
        let interview = interview_with_areas();
        let messages = transcript_messages(interview.id, &[6, 8]);

        let completion = Arc::new(ScriptedCompletion::new(vec![
            ScriptedReply::Fail,
            ScriptedReply::Fail,
        ]));
        let chains = Chains::new(completion, Duration::from_secs(60));

        let report = assemble(&chains, &interview, &messages, 10_000).await;
        assert_eq!(report.quality_flags, vec![REPORT_FALLBACK_FLAG.to_string()]);
        assert_eq!(report.overall_score, 7);
        assert!(report.summary.contains("2 questions were asked"));
        assert!(report.model_findings.0.is_empty());
        assert_eq!(report.topic_breakdown.0.len(), 2);
    }

    #[test]
    fn test_match_analysis_block_lists_focus_areas() {
        let interview = interview_with_areas();
        let text = format_match_analysis(&interview);
        assert!(text.contains("Match score: 7/10"));
        assert!(text.contains("Solid backend background."));
        assert!(text.contains("sql (0.50)"));
    }
}
