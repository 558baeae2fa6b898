// All LLM prompt constants for the generation chains.
// Systems enforce JSON-only output; templates carry the exact schema the
// validator parses against, so repair errors point at a concrete contract.

/// System prompt for document analysis — enforces JSON-only output.
pub const DOCUMENT_ANALYSIS_SYSTEM: &str =
    "You are an expert technical recruiter analyzing a candidate's fit for a role. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Document analysis prompt template.
/// Replace: {resume_text}, {role_description_text}, {job_offering_text}
pub const DOCUMENT_ANALYSIS_PROMPT_TEMPLATE: &str = r#"Analyze how well the candidate matches the role using the three documents below.

Return a JSON object with this EXACT schema (no extra fields):
{
  "match_score": 7,
  "match_summary": "Strong backend background with relevant async experience; limited exposure to distributed storage.",
  "focus_areas": [
    {"topic": "async runtime internals", "weight": 0.4},
    {"topic": "database design", "weight": 0.35},
    {"topic": "API security", "weight": 0.25}
  ]
}

Rules for analysis:

MATCH SCORE: integer 1-10, where 10 is a perfect match. Consider both
technical skills and experience level. Be objective and fair.

MATCH SUMMARY: 2-4 sentences explaining the score, naming concrete
strengths and concrete gaps.

FOCUS AREAS: 3 to 5 topics to probe during the interview. Prefer areas
where the role demands depth and the resume is thin or unverified.
Each topic must be specific and actionable ("connection pooling under
load", not "databases"). Weights are relative shares in (0, 1] and
should roughly sum to 1; give more weight to areas that matter more
for this role.

RESUME:
{resume_text}

ROLE DESCRIPTION:
{role_description_text}

JOB OFFERING:
{job_offering_text}"#;

/// System prompt for question generation.
pub const QUESTION_GENERATION_SYSTEM: &str =
    "You are an expert technical interviewer generating the next interview question. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Question generation prompt template.
/// Replace: {target_topic}, {focus_areas}, {difficulty_level},
///          {difficulty_band}, {questions_asked}, {followup_hint},
///          {chat_history}, {previous_questions}
pub const QUESTION_GENERATION_PROMPT_TEMPLATE: &str = r#"Generate the next interview question.

Return a JSON object with this EXACT schema (no extra fields):
{
  "question": "Your database sees a sudden 10x spike in write volume. Walk me through how you would keep p99 latency stable."
}

INTERVIEW CONTEXT:
- Topic to probe NOW: {target_topic}
- All focus areas: {focus_areas}
- Current difficulty: {difficulty_level} on a 3-10 scale ({difficulty_band})
- Questions asked so far: {questions_asked}
- Follow-up hint from the last evaluation: {followup_hint}

CHAT HISTORY:
{chat_history}

QUESTIONS ALREADY ASKED (never repeat any of these verbatim or near-verbatim):
{previous_questions}

HARD RULES:
1. Ask exactly ONE clear question targeting the topic to probe NOW
2. Match the current difficulty level
3. Build naturally on the conversation so far; use the follow-up hint when it fits the topic
4. Be specific and answerable — not too broad
5. Keep it conversational, as an interviewer would speak it"#;

/// System prompt for answer evaluation.
pub const ANSWER_EVALUATION_SYSTEM: &str =
    "You are an expert technical interviewer evaluating a candidate's answer. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Answer evaluation prompt template.
/// Replace: {question}, {answer}, {difficulty_level}
pub const ANSWER_EVALUATION_PROMPT_TEMPLATE: &str = r#"Evaluate the candidate's answer to an interview question asked at difficulty {difficulty_level} (3-10 scale).

Return a JSON object with this EXACT schema (no extra fields):
{
  "score": 7,
  "feedback": "Correctly identified the race condition and proposed a lock-free fix, but did not address memory ordering.",
  "evidence": "we can swap the pointer atomically and retire the old buffer",
  "followup_hint": "Probe understanding of acquire/release semantics",
  "difficulty_delta": 1
}

EVALUATION CRITERIA:
1. Technical correctness (40%): is the answer technically accurate?
2. Problem-solving approach (30%): does the candidate reason well?
3. Communication (30%): is the answer clear and well-structured?

SCORING GUIDE:
- 1-3: poor or incorrect answer with major gaps
- 4-6: partial understanding with some correct elements
- 7-8: good answer with minor gaps
- 9-10: excellent, comprehensive answer

DIFFICULTY DELTA: integer between -2 and 2. Positive when the candidate
cleared this difficulty comfortably and should be pushed harder; negative
when they struggled and the next question should ease off; 0 to hold.

"evidence" is a short quote from the answer supporting your score, or null.
"followup_hint" is an optional pointer for the next question, or null.

QUESTION ASKED:
{question}

CANDIDATE'S ANSWER:
{answer}"#;

/// System prompt for message classification.
pub const MESSAGE_CLASSIFICATION_SYSTEM: &str =
    "You are analyzing a candidate's message during a technical interview. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Message classification prompt template.
/// Replace: {current_question}, {candidate_message}
pub const MESSAGE_CLASSIFICATION_PROMPT_TEMPLATE: &str = r#"Classify the candidate's message relative to the current interview question.

Return a JSON object with this EXACT schema (no extra fields):
{
  "category": "answer",
  "confidence": 0.9
}

CATEGORIES (pick exactly one):
- "answer": the message addresses the current question in any way
- "clarification": the message asks what the question means ("what do you mean by...", "could you rephrase...")
- "off_topic": the message changes subject or avoids the question

"confidence" is a number between 0.0 and 1.0.

CURRENT QUESTION:
{current_question}

CANDIDATE'S MESSAGE:
{candidate_message}"#;

/// System prompt for report generation.
pub const REPORT_GENERATION_SYSTEM: &str =
    "You are an expert technical recruiter creating a final interview report. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Report generation prompt template.
/// Replace: {match_analysis}, {transcript}, {question_scores}, {integrity_summary}
pub const REPORT_GENERATION_PROMPT_TEMPLATE: &str = r#"Write the final report for a completed technical interview.

Return a JSON object with this EXACT schema (no extra fields):
{
  "overall_score": 6,
  "summary": "Two to three paragraphs covering trajectory, depth, and communication.",
  "strengths": ["clear articulation of tradeoffs", "solid SQL fundamentals"],
  "gaps": ["shaky on consensus algorithms", "no production debugging stories"],
  "recommendation": "Proceed to onsite with a systems-design deep dive",
  "topic_assessments": [
    {"topic": "database design", "assessment": "Handled normalization and indexing well; struggled with partitioning."}
  ],
  "integrity_findings": [
    {"question_number": 3, "certainty": 40, "indicators": ["paste event", "style shift versus earlier answers"]}
  ]
}

MATCH ANALYSIS (from before the interview):
{match_analysis}

FULL TRANSCRIPT:
{transcript}

PER-QUESTION SCORES:
{question_scores}

INTEGRITY OBSERVATIONS (client-side measurements, informational):
{integrity_summary}

RULES:
1. "overall_score" is an integer 1-10 weighing technical accuracy,
   problem-solving, and communication; weight later answers slightly
   higher to credit the learning curve
2. "summary" is 2-3 paragraphs, concrete and honest about gaps
3. "topic_assessments" covers each focus area that was actually probed
4. "integrity_findings" lists suspicious patterns only — certainty is an
   integer 0-100, and an empty list is the correct output when nothing
   stands out. Fast answers alone are not suspicious for simple questions
5. Keep every list entry short and specific"#;
