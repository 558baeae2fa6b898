//! Deterministic assistant copy: the assignment-time introduction, the
//! restated-question reply, and the closing message. Plain templates, no
//! model call, so these render identically on every run.

/// Minutes budgeted per question in the intro's duration estimate.
const MINUTES_PER_QUESTION: i32 = 4;

/// The first assistant message, appended when the interview is assigned.
/// The role title is the first line of the role description, truncated.
pub fn introduction(role_description: &str, target_questions: i32) -> String {
    let role_title: String = role_description
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("the role")
        .chars()
        .take(50)
        .collect();
    let expected_minutes = target_questions.max(1) * MINUTES_PER_QUESTION;

    format!(
        "Hello! I'm your interviewer for today.\n\n\
        I'll be conducting a technical interview for the **{role_title}** position.\n\n\
        **Interview overview:**\n\
        - Number of questions: approximately {target_questions}\n\
        - Expected duration: about {expected_minutes} minutes\n\
        - Format: one question at a time\n\n\
        **Ground rules:**\n\
        - Answer each question to the best of your ability\n\
        - Ask for clarification if a question is unclear\n\
        - Stay focused on the current question\n\
        - Take the time you need to think through your answers\n\n\
        Once you're ready, let me know and we'll start with the first question!"
    )
}

/// Reply to a clarification request: the pending question, re-presented.
pub fn restate_question(question: &str) -> String {
    format!(
        "No problem — let me restate the current question:\n\n\
        {question}\n\n\
        Take your time, and answer when you're ready."
    )
}

/// Returned to the candidate when the interview completes. Not persisted;
/// the transcript ends with their final answer.
pub fn closing_message() -> String {
    "That was the last question — thank you for completing the interview!\n\n\
    Your responses have been recorded and will be reviewed by the hiring team. \
    We appreciate the time and thought you put into your answers.\n\n\
    You'll hear back soon about next steps. Best of luck!"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_introduction_names_role_and_question_count() {
        let text = introduction("Senior Backend Engineer\n\nOwn the storage layer.", 8);
        assert!(text.contains("**Senior Backend Engineer**"));
        assert!(text.contains("approximately 8"));
        assert!(text.contains("about 32 minutes"));
    }

    #[test]
    fn test_introduction_skips_leading_blank_lines() {
        let text = introduction("\n\n  Platform Engineer\nMore detail.", 5);
        assert!(text.contains("**Platform Engineer**"));
    }

    #[test]
    fn test_introduction_truncates_long_titles() {
        let long_line = "X".repeat(120);
        let text = introduction(&long_line, 5);
        assert!(text.contains(&format!("**{}**", "X".repeat(50))));
        assert!(!text.contains(&"X".repeat(51)));
    }

    #[test]
    fn test_introduction_survives_empty_description() {
        let text = introduction("", 5);
        assert!(text.contains("**the role**"));
    }

    #[test]
    fn test_restated_question_embeds_the_original() {
        let text = restate_question("Explain the borrow checker.");
        assert!(text.contains("Explain the borrow checker."));
        assert!(text.contains("restate"));
    }

    #[test]
    fn test_closing_message_is_stable() {
        assert_eq!(closing_message(), closing_message());
        assert!(closing_message().contains("thank you"));
    }
}
