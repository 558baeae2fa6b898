//! Integrity signal capture and aggregation.
//!
//! The client reports how long the candidate took to answer and whether
//! text was pasted into the editor. Both signals are informational: they
//! annotate the transcript and the final report, and never gate a turn.
//! Missing or malformed metadata therefore degrades to "unknown" instead
//! of failing the submission.

use serde_json::Value;
use tracing::warn;

use crate::models::message::{Message, MessageRole};
use crate::models::report::{IntegrityFlag, IntegritySummary};

/// Latency values above this are treated as client clock bugs rather
/// than measurements. A day covers any plausible take-home pause.
const MAX_PLAUSIBLE_LATENCY_MS: i64 = 86_400_000;

/// What one turn's client metadata resolved to. Stored verbatim on the
/// candidate message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrityRecord {
    pub response_latency_ms: Option<i64>,
    pub paste_detected: Option<bool>,
}

/// Reads `response_latency_ms` and `paste_detected` out of the client
/// metadata blob. Each field degrades independently: a wrong type, a
/// negative latency, or an absurd latency becomes `None` for that field
/// while the other survives.
pub fn capture(metadata: Option<&Value>) -> IntegrityRecord {
    let Some(metadata) = metadata else {
        return IntegrityRecord::default();
    };

    let response_latency_ms = match metadata.get("response_latency_ms") {
        None => None,
        Some(value) => match value.as_i64() {
            Some(ms) if (0..=MAX_PLAUSIBLE_LATENCY_MS).contains(&ms) => Some(ms),
            _ => {
                warn!("Ignoring implausible response_latency_ms: {value}");
                None
            }
        },
    };

    let paste_detected = match metadata.get("paste_detected") {
        None => None,
        Some(value) => match value.as_bool() {
            Some(flag) => Some(flag),
            None => {
                warn!("Ignoring non-boolean paste_detected: {value}");
                None
            }
        },
    };

    IntegrityRecord {
        response_latency_ms,
        paste_detected,
    }
}

/// Aggregates the stored per-message signals across one transcript.
/// An "answer" is a candidate message sent while a question was pending,
/// excluding clarification requests; the pre-question greeting never
/// counts.
pub fn summarize(messages: &[Message], fast_threshold_ms: i64) -> IntegritySummary {
    let mut summary = IntegritySummary {
        fast_threshold_ms,
        ..IntegritySummary::default()
    };
    let mut latencies: Vec<i64> = Vec::new();
    let mut pending_question: Option<i32> = None;

    for message in messages {
        match message.role {
            MessageRole::Assistant => {
                if message.question_number.is_some() {
                    pending_question = message.question_number;
                }
            }
            MessageRole::Candidate => {
                if pending_question.is_none() {
                    continue;
                }
                if message.classification.as_deref() == Some("clarification") {
                    continue;
                }

                summary.answers_observed += 1;
                if message.evaluation_score.is_some_and(|score| score >= 1) {
                    summary.evaluated_answers += 1;
                }

                let mut indicators: Vec<String> = Vec::new();
                if message.paste_detected == Some(true) {
                    summary.paste_events += 1;
                    indicators.push("paste event".to_string());
                }
                match message.response_latency_ms {
                    Some(ms) => {
                        latencies.push(ms);
                        if ms < fast_threshold_ms {
                            summary.fast_answers += 1;
                            indicators.push(format!(
                                "answered in {:.1}s",
                                ms as f64 / 1000.0
                            ));
                        }
                    }
                    None => summary.unknown_latency += 1,
                }

                if !indicators.is_empty() {
                    summary.flags.push(IntegrityFlag {
                        question_number: pending_question,
                        latency_ms: message.response_latency_ms,
                        indicators,
                    });
                }
            }
        }
    }

    if !latencies.is_empty() {
        summary.average_latency_ms =
            Some(latencies.iter().sum::<i64>() as f64 / latencies.len() as f64);
        summary.min_latency_ms = latencies.iter().min().copied();
    }

    summary
}

/// Renders the summary as the plain-text block fed to report generation.
pub fn describe(summary: &IntegritySummary) -> String {
    let mut lines = vec![
        format!(
            "Answers observed: {} ({} evaluated)",
            summary.answers_observed, summary.evaluated_answers
        ),
        format!("Paste events detected: {}", summary.paste_events),
        format!(
            "Answers faster than {}s: {}",
            summary.fast_threshold_ms / 1000,
            summary.fast_answers
        ),
    ];

    match summary.average_latency_ms {
        Some(average) => lines.push(format!(
            "Average response time: {:.1}s (fastest {:.1}s)",
            average / 1000.0,
            summary.min_latency_ms.unwrap_or_default() as f64 / 1000.0
        )),
        None => lines.push("No response timings were reported by the client".to_string()),
    }
    if summary.unknown_latency > 0 {
        lines.push(format!(
            "{} answers arrived without a timing measurement",
            summary.unknown_latency
        ));
    }

    if !summary.flags.is_empty() {
        lines.push("Flagged answers:".to_string());
        for flag in &summary.flags {
            let question = flag
                .question_number
                .map(|n| format!("Q{n}"))
                .unwrap_or_else(|| "Q?".to_string());
            lines.push(format!("- {question}: {}", flag.indicators.join("; ")));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn test_missing_metadata_degrades_to_unknown() {
        assert_eq!(capture(None), IntegrityRecord::default());
        assert_eq!(capture(Some(&json!({}))), IntegrityRecord::default());
    }

    #[test]
    fn test_valid_metadata_is_captured() {
        let metadata = json!({"response_latency_ms": 42_000, "paste_detected": true});
        let record = capture(Some(&metadata));
        assert_eq!(record.response_latency_ms, Some(42_000));
        assert_eq!(record.paste_detected, Some(true));
    }

    #[test]
    fn test_malformed_fields_degrade_independently() {
        let metadata = json!({"response_latency_ms": "fast", "paste_detected": false});
        let record = capture(Some(&metadata));
        assert_eq!(record.response_latency_ms, None);
        assert_eq!(record.paste_detected, Some(false));

        let metadata = json!({"response_latency_ms": 9_000, "paste_detected": "yes"});
        let record = capture(Some(&metadata));
        assert_eq!(record.response_latency_ms, Some(9_000));
        assert_eq!(record.paste_detected, None);
    }

    #[test]
    fn test_negative_and_absurd_latencies_are_dropped() {
        let metadata = json!({"response_latency_ms": -5});
        assert_eq!(capture(Some(&metadata)).response_latency_ms, None);

        let metadata = json!({"response_latency_ms": MAX_PLAUSIBLE_LATENCY_MS + 1});
        assert_eq!(capture(Some(&metadata)).response_latency_ms, None);
    }

    fn answer(
        interview_id: Uuid,
        latency_ms: Option<i64>,
        paste: Option<bool>,
        score: Option<i32>,
    ) -> Message {
        let mut message = Message::candidate(
            interview_id,
            "an answer",
            latency_ms,
            paste,
            Some("answer".to_string()),
        );
        message.evaluation_score = score;
        message
    }

    #[test]
    fn test_summary_aggregates_across_answers() {
        let id = Uuid::new_v4();
        let messages = vec![
            Message::assistant(id, "welcome"),
            // Greeting before any question: ignored entirely.
            Message::candidate(id, "ready", Some(1_000), Some(true), None),
            Message::question(id, "q1", 1, 5),
            answer(id, Some(4_000), Some(true), Some(7)),
            Message::question(id, "q2", 2, 6),
            answer(id, Some(40_000), None, Some(8)),
            Message::question(id, "q3", 3, 6),
            answer(id, None, Some(false), Some(0)),
        ];

        let summary = summarize(&messages, 10_000);
        assert_eq!(summary.answers_observed, 3);
        assert_eq!(summary.evaluated_answers, 2, "the score-0 placeholder is not an evaluation");
        assert_eq!(summary.paste_events, 1);
        assert_eq!(summary.fast_answers, 1);
        assert_eq!(summary.unknown_latency, 1);
        assert_eq!(summary.average_latency_ms, Some(22_000.0));
        assert_eq!(summary.min_latency_ms, Some(4_000));

        assert_eq!(summary.flags.len(), 1);
        assert_eq!(summary.flags[0].question_number, Some(1));
        assert_eq!(
            summary.flags[0].indicators,
            vec!["paste event".to_string(), "answered in 4.0s".to_string()]
        );
    }

    #[test]
    fn test_clarifications_are_not_answers() {
        let id = Uuid::new_v4();
        let messages = vec![
            Message::question(id, "q1", 1, 5),
            Message::candidate(
                id,
                "what do you mean?",
                Some(2_000),
                Some(true),
                Some("clarification".to_string()),
            ),
            Message::assistant(id, "restated q1"),
            answer(id, Some(30_000), Some(false), Some(6)),
        ];

        let summary = summarize(&messages, 10_000);
        assert_eq!(summary.answers_observed, 1);
        assert_eq!(summary.paste_events, 0);
        assert!(summary.flags.is_empty());
    }

    #[test]
    fn test_describe_renders_counts_and_flags() {
        let id = Uuid::new_v4();
        let messages = vec![
            Message::question(id, "q1", 1, 5),
            answer(id, Some(3_000), Some(true), Some(7)),
        ];

        let text = describe(&summarize(&messages, 10_000));
        assert!(text.contains("Answers observed: 1 (1 evaluated)"));
        assert!(text.contains("Paste events detected: 1"));
        assert!(text.contains("- Q1: paste event; answered in 3.0s"));
    }

    #[test]
    fn test_describe_without_timings() {
        let id = Uuid::new_v4();
        let messages = vec![
            Message::question(id, "q1", 1, 5),
            answer(id, None, None, Some(7)),
        ];

        let text = describe(&summarize(&messages, 10_000));
        assert!(text.contains("No response timings were reported"));
    }
}
