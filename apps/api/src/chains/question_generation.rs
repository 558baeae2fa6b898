//! Question generation — picks the next topic deterministically, asks the
//! LLM for one question, and rejects repeats.
//!
//! Topic selection is smooth weighted round-robin over the focus areas,
//! recomputed from the question index alone. The schedule is therefore an
//! auditable function of the interview record, not of runtime state, and
//! the report can reconstruct which topic every question belonged to.

use serde::{Deserialize, Serialize};

use crate::chains::prompts::{QUESTION_GENERATION_PROMPT_TEMPLATE, QUESTION_GENERATION_SYSTEM};
use crate::chains::validator::{Chain, ChainOutput};
use crate::models::interview::FocusArea;

/// Everything the chain needs to phrase the next question.
#[derive(Debug, Clone)]
pub struct QuestionRequest {
    pub target_topic: String,
    pub focus_areas: Vec<FocusArea>,
    pub difficulty_level: i32,
    pub questions_asked: i32,
    pub followup_hint: Option<String>,
    pub chat_history: String,
    pub previous_questions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question: String,
}

impl ChainOutput for GeneratedQuestion {
    fn validate(&self) -> Result<(), String> {
        if self.question.trim().is_empty() {
            return Err("question must not be empty".to_string());
        }
        Ok(())
    }
}

pub struct QuestionGenerationChain;

impl Chain for QuestionGenerationChain {
    type Input = QuestionRequest;
    type Output = GeneratedQuestion;

    const NAME: &'static str = "question_generation";

    fn prompts(&self, input: &QuestionRequest) -> (String, String) {
        let focus_areas = input
            .focus_areas
            .iter()
            .map(|fa| format!("{} (weight {:.2})", fa.topic, fa.weight))
            .collect::<Vec<_>>()
            .join(", ");

        let previous = if input.previous_questions.is_empty() {
            "(none yet)".to_string()
        } else {
            input
                .previous_questions
                .iter()
                .map(|q| format!("- {q}"))
                .collect::<Vec<_>>()
                .join("\n")
        };

        let history = if input.chat_history.trim().is_empty() {
            "No previous questions yet."
        } else {
            input.chat_history.as_str()
        };

        let prompt = QUESTION_GENERATION_PROMPT_TEMPLATE
            .replace("{target_topic}", &input.target_topic)
            .replace("{focus_areas}", &focus_areas)
            .replace("{difficulty_level}", &input.difficulty_level.to_string())
            .replace("{difficulty_band}", difficulty_band(input.difficulty_level))
            .replace("{questions_asked}", &input.questions_asked.to_string())
            .replace(
                "{followup_hint}",
                input.followup_hint.as_deref().unwrap_or("(none)"),
            )
            .replace("{chat_history}", history)
            .replace("{previous_questions}", &previous);

        (prompt, QUESTION_GENERATION_SYSTEM.to_string())
    }

    fn check(&self, input: &QuestionRequest, output: &GeneratedQuestion) -> Result<(), String> {
        let candidate = normalized(&output.question);
        if input
            .previous_questions
            .iter()
            .any(|prev| normalized(prev) == candidate)
        {
            return Err(
                "that exact question was already asked earlier in this interview; \
                ask a different question on the same topic"
                    .to_string(),
            );
        }
        Ok(())
    }
}

/// Duplicate detection ignores casing and whitespace runs; anything more
/// (paraphrases) is the prompt's job, not the validator's.
fn normalized(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Maps a difficulty level to the band description used in prompts.
pub fn difficulty_band(level: i32) -> &'static str {
    match level {
        i32::MIN..=4 => "basic concepts and definitions",
        5..=6 => "practical application and common scenarios",
        7..=8 => "complex problem-solving and edge cases",
        _ => "advanced optimization and architectural decisions",
    }
}

/// Smooth weighted round-robin over the focus areas, evaluated at one
/// question index. Ties break toward the earlier entry, so the schedule
/// is fully determined by (focus_areas, index).
pub fn scheduled_topic(focus_areas: &[FocusArea], question_index: i32) -> Option<String> {
    if focus_areas.is_empty() {
        return None;
    }

    let credits: Vec<i64> = focus_areas
        .iter()
        .map(|fa| ((fa.weight.max(0.0) * 100.0).round() as i64).max(1))
        .collect();
    let total: i64 = credits.iter().sum();

    let mut current = vec![0i64; focus_areas.len()];
    let mut winner = 0usize;

    for _ in 0..=question_index.max(0) {
        for (slot, credit) in current.iter_mut().zip(&credits) {
            *slot += credit;
        }
        winner = 0;
        for i in 1..current.len() {
            if current[i] > current[winner] {
                winner = i;
            }
        }
        current[winner] -= total;
    }

    Some(focus_areas[winner].topic.clone())
}

/// Deterministic substitute question used when the chain fails twice.
/// Stays on the scheduled topic so the interview plan holds.
pub fn fallback_question(topic: &str) -> String {
    format!(
        "Let's talk about {topic}. Walk me through a concrete situation where you \
        worked with it: the problem you faced, the approach you took, and what you \
        would do differently today."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn areas(weights: &[(&str, f64)]) -> Vec<FocusArea> {
        weights
            .iter()
            .map(|(topic, weight)| FocusArea {
                topic: topic.to_string(),
                weight: *weight,
            })
            .collect()
    }

    #[test]
    fn test_schedule_follows_weights_proportionally() {
        let focus = areas(&[("sql", 0.5), ("async", 0.25), ("testing", 0.25)]);

        let picks: Vec<String> = (0..4)
            .map(|i| scheduled_topic(&focus, i).unwrap())
            .collect();

        let sql_count = picks.iter().filter(|t| *t == "sql").count();
        assert_eq!(sql_count, 2, "half the weight should earn half the slots");
        assert!(picks.contains(&"async".to_string()));
        assert!(picks.contains(&"testing".to_string()));
    }

    #[test]
    fn test_schedule_is_deterministic_per_index() {
        let focus = areas(&[("sql", 0.5), ("async", 0.5)]);
        for index in 0..10 {
            assert_eq!(
                scheduled_topic(&focus, index),
                scheduled_topic(&focus, index),
            );
        }
    }

    #[test]
    fn test_equal_weights_alternate() {
        let focus = areas(&[("a", 0.5), ("b", 0.5)]);
        assert_eq!(scheduled_topic(&focus, 0).unwrap(), "a");
        assert_eq!(scheduled_topic(&focus, 1).unwrap(), "b");
        assert_eq!(scheduled_topic(&focus, 2).unwrap(), "a");
        assert_eq!(scheduled_topic(&focus, 3).unwrap(), "b");
    }

    #[test]
    fn test_empty_focus_areas_yield_no_topic() {
        assert_eq!(scheduled_topic(&[], 0), None);
    }

    #[test]
    fn test_duplicate_question_is_rejected() {
        let request = QuestionRequest {
            target_topic: "sql".to_string(),
            focus_areas: areas(&[("sql", 1.0)]),
            difficulty_level: 5,
            questions_asked: 1,
            followup_hint: None,
            chat_history: String::new(),
            previous_questions: vec!["Explain indexes.".to_string()],
        };
        // Casing and whitespace differences do not make it a new question.
        let output = GeneratedQuestion {
            question: "  explain  INDEXES.  ".to_string(),
        };

        let err = QuestionGenerationChain.check(&request, &output).unwrap_err();
        assert!(err.contains("already asked"));
    }

    #[test]
    fn test_fresh_question_passes_duplicate_check() {
        let request = QuestionRequest {
            target_topic: "sql".to_string(),
            focus_areas: areas(&[("sql", 1.0)]),
            difficulty_level: 5,
            questions_asked: 1,
            followup_hint: None,
            chat_history: String::new(),
            previous_questions: vec!["Explain indexes.".to_string()],
        };
        let output = GeneratedQuestion {
            question: "How would you diagnose a slow query?".to_string(),
        };

        assert!(QuestionGenerationChain.check(&request, &output).is_ok());
    }

    #[test]
    fn test_difficulty_bands_cover_scale() {
        assert_eq!(difficulty_band(3), "basic concepts and definitions");
        assert_eq!(difficulty_band(5), "practical application and common scenarios");
        assert_eq!(difficulty_band(8), "complex problem-solving and edge cases");
        assert_eq!(difficulty_band(10), "advanced optimization and architectural decisions");
    }

    #[test]
    fn test_prompt_lists_previous_questions() {
        let request = QuestionRequest {
            target_topic: "async".to_string(),
            focus_areas: areas(&[("async", 1.0)]),
            difficulty_level: 6,
            questions_asked: 2,
            followup_hint: Some("probe cancellation safety".to_string()),
            chat_history: "Interviewer: Q1\nCandidate: A1".to_string(),
            previous_questions: vec!["Q1".to_string(), "Q2".to_string()],
        };

        let (prompt, _) = QuestionGenerationChain.prompts(&request);
        assert!(prompt.contains("- Q1"));
        assert!(prompt.contains("- Q2"));
        assert!(prompt.contains("probe cancellation safety"));
        assert!(prompt.contains("practical application"));
    }

    #[test]
    fn test_fallback_question_names_the_topic() {
        let question = fallback_question("connection pooling");
        assert!(question.contains("connection pooling"));
    }
}
