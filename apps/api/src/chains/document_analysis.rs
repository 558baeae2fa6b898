//! Document analysis — scores candidate/role fit and proposes the
//! weighted focus areas that drive question scheduling.

use serde::{Deserialize, Serialize};

use crate::chains::prompts::{DOCUMENT_ANALYSIS_PROMPT_TEMPLATE, DOCUMENT_ANALYSIS_SYSTEM};
use crate::chains::validator::{Chain, ChainOutput};
use crate::models::interview::FocusArea;

/// Shortest acceptable document after trimming. Anything below this is a
/// client mistake, not analyzable content.
pub const MIN_DOCUMENT_CHARS: usize = 20;

/// The three candidate documents, already extracted to plain text.
#[derive(Debug, Clone)]
pub struct DocumentSet {
    pub resume_text: String,
    pub role_description_text: String,
    pub job_offering_text: String,
}

impl DocumentSet {
    /// Rejects empty or too-short documents before any LLM spend.
    pub fn validate(&self) -> Result<(), String> {
        for (name, text) in [
            ("resume", &self.resume_text),
            ("role_description", &self.role_description_text),
            ("job_offering", &self.job_offering_text),
        ] {
            if text.trim().len() < MIN_DOCUMENT_CHARS {
                return Err(format!(
                    "{name} must contain at least {MIN_DOCUMENT_CHARS} characters of text"
                ));
            }
        }
        Ok(())
    }
}

/// Parsed analysis result: the match verdict plus interview focus areas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchAnalysis {
    pub match_score: i32,
    pub match_summary: String,
    pub focus_areas: Vec<FocusArea>,
}

impl ChainOutput for MatchAnalysis {
    fn validate(&self) -> Result<(), String> {
        if !(1..=10).contains(&self.match_score) {
            return Err(format!(
                "match_score must be an integer between 1 and 10, got {}",
                self.match_score
            ));
        }
        if self.match_summary.trim().is_empty() {
            return Err("match_summary must not be empty".to_string());
        }
        if !(3..=5).contains(&self.focus_areas.len()) {
            return Err(format!(
                "focus_areas must contain 3 to 5 entries, got {}",
                self.focus_areas.len()
            ));
        }
        for area in &self.focus_areas {
            if area.topic.trim().is_empty() {
                return Err("every focus area needs a non-empty topic".to_string());
            }
            if !(area.weight > 0.0 && area.weight <= 1.0) {
                return Err(format!(
                    "focus area '{}' has weight {}, expected a value in (0, 1]",
                    area.topic, area.weight
                ));
            }
        }
        Ok(())
    }
}

pub struct DocumentAnalysisChain;

impl Chain for DocumentAnalysisChain {
    type Input = DocumentSet;
    type Output = MatchAnalysis;

    const NAME: &'static str = "document_analysis";

    fn prompts(&self, input: &DocumentSet) -> (String, String) {
        let prompt = DOCUMENT_ANALYSIS_PROMPT_TEMPLATE
            .replace("{resume_text}", input.resume_text.trim())
            .replace("{role_description_text}", input.role_description_text.trim())
            .replace("{job_offering_text}", input.job_offering_text.trim());
        (prompt, DOCUMENT_ANALYSIS_SYSTEM.to_string())
    }
}
