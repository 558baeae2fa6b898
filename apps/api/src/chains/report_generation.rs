//! Report generation — turns the full interview record into the final
//! hiring-signal narrative.

use serde::{Deserialize, Serialize};

use crate::chains::prompts::{REPORT_GENERATION_PROMPT_TEMPLATE, REPORT_GENERATION_SYSTEM};
use crate::chains::validator::{Chain, ChainOutput};
use crate::models::report::IntegrityFinding;

/// Pre-rendered blocks of interview evidence. Formatting happens in
/// `interview::report_assembly` so the deterministic fallback and the
/// prompt always describe the same record.
#[derive(Debug, Clone)]
pub struct ReportContext {
    pub match_analysis: String,
    pub transcript: String,
    pub question_scores: String,
    pub integrity_summary: String,
}

/// One narrative per focus area the chain chose to comment on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicAssessment {
    pub topic: String,
    pub assessment: String,
}

/// The chain's half of the final report. Deterministic rollups (per-topic
/// counts, integrity measurements) are merged in afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportDraft {
    pub overall_score: i32,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub gaps: Vec<String>,
    pub recommendation: String,
    #[serde(default)]
    pub topic_assessments: Vec<TopicAssessment>,
    #[serde(default)]
    pub integrity_findings: Vec<IntegrityFinding>,
}

impl ChainOutput for ReportDraft {
    fn validate(&self) -> Result<(), String> {
        if !(1..=10).contains(&self.overall_score) {
            return Err(format!(
                "overall_score must be an integer between 1 and 10, got {}",
                self.overall_score
            ));
        }
        if self.summary.trim().is_empty() {
            return Err("summary must not be empty".to_string());
        }
        if self.recommendation.trim().is_empty() {
            return Err("recommendation must not be empty".to_string());
        }
        for finding in &self.integrity_findings {
            if !(0..=100).contains(&finding.certainty) {
                return Err(format!(
                    "integrity finding certainty must be between 0 and 100, got {}",
                    finding.certainty
                ));
            }
        }
        Ok(())
    }
}

pub struct ReportGenerationChain;

impl Chain for ReportGenerationChain {
    type Input = ReportContext;
    type Output = ReportDraft;

    const NAME: &'static str = "report_generation";

    fn prompts(&self, input: &ReportContext) -> (String, String) {
        let prompt = REPORT_GENERATION_PROMPT_TEMPLATE
            .replace("{match_analysis}", &input.match_analysis)
            .replace("{transcript}", &input.transcript)
            .replace("{question_scores}", &input.question_scores)
            .replace("{integrity_summary}", &input.integrity_summary);
        (prompt, REPORT_GENERATION_SYSTEM.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chains::validator::parse_output;

    #[test]
    fn test_draft_with_omitted_lists_parses_to_empty() {
        let parsed: ReportDraft = parse_output(
            r#"{
                "overall_score": 6,
                "summary": "Competent candidate with uneven depth.",
                "recommendation": "Proceed with a focused follow-up round"
            }"#,
        )
        .unwrap();
        assert!(parsed.strengths.is_empty());
        assert!(parsed.topic_assessments.is_empty());
        assert!(parsed.integrity_findings.is_empty());
    }

    #[test]
    fn test_certainty_above_hundred_is_rejected() {
        let result: Result<ReportDraft, _> = parse_output(
            r#"{
                "overall_score": 6,
                "summary": "ok",
                "recommendation": "ok",
                "integrity_findings": [
                    {"question_number": 2, "certainty": 150, "indicators": ["paste event"]}
                ]
            }"#,
        );
        assert!(result.unwrap_err().contains("certainty"));
    }

    #[test]
    fn test_prompt_carries_all_context_blocks() {
        let context = ReportContext {
            match_analysis: "Match Score: 8/10".to_string(),
            transcript: "Interviewer: Q1\nCandidate: A1".to_string(),
            question_scores: "Q1: 7/10 - solid".to_string(),
            integrity_summary: "paste events: 0".to_string(),
        };
        let (prompt, _) = ReportGenerationChain.prompts(&context);
        assert!(prompt.contains("Match Score: 8/10"));
        assert!(prompt.contains("Candidate: A1"));
        assert!(prompt.contains("Q1: 7/10"));
        assert!(prompt.contains("paste events: 0"));
    }
}
