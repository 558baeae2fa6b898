//! Interview lifecycle state machine.
//!
//! One legal path: DRAFT → READY → ASSIGNED → IN_PROGRESS → COMPLETED.
//! No edge may be skipped or reversed, and COMPLETED is terminal. The
//! machine validates and applies transitions; the precondition *work*
//! (running document analysis, minting the token, persisting the first
//! candidate message) always happens in the caller before the edge is
//! requested, and the machine only checks that the record proves it.

use chrono::Utc;
use tracing::info;

use crate::errors::AppError;
use crate::models::interview::{Interview, InterviewStatus};

/// Why an IN_PROGRESS interview is being completed. Supplied by the
/// caller, logged for the audit trail; the machine never derives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionReason {
    TargetReached,
    AdminOverride,
    EvaluationFailures,
}

impl std::fmt::Display for CompletionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CompletionReason::TargetReached => "target question count reached",
            CompletionReason::AdminOverride => "admin override",
            CompletionReason::EvaluationFailures => "evaluation failure threshold reached",
        })
    }
}

fn is_legal(current: InterviewStatus, target: InterviewStatus) -> bool {
    matches!(
        (current, target),
        (InterviewStatus::Draft, InterviewStatus::Ready)
            | (InterviewStatus::Ready, InterviewStatus::Assigned)
            | (InterviewStatus::Assigned, InterviewStatus::InProgress)
            | (InterviewStatus::InProgress, InterviewStatus::Completed)
    )
}

/// Checks edge legality without touching the record. Callers use this to
/// fail fast before doing expensive precondition work (LLM calls, token
/// minting) for a transition that could never apply.
pub fn ensure_legal(current: InterviewStatus, requested: InterviewStatus) -> Result<(), AppError> {
    if is_legal(current, requested) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition { current, requested })
    }
}

/// Record-level evidence that the precondition work for an edge was done.
/// Failures leave the interview untouched.
fn check_preconditions(interview: &Interview, target: InterviewStatus) -> Result<(), AppError> {
    match target {
        InterviewStatus::Ready => {
            if interview.match_score.is_none() || interview.focus_areas.0.is_empty() {
                return Err(AppError::Validation(
                    "Cannot mark interview READY before document analysis has produced \
                    a match score and focus areas"
                        .to_string(),
                ));
            }
        }
        InterviewStatus::Assigned => {
            if interview.candidate_token.is_none() {
                return Err(AppError::Validation(
                    "Cannot mark interview ASSIGNED before a candidate token is minted"
                        .to_string(),
                ));
            }
        }
        // ASSIGNED -> IN_PROGRESS: the witness is the first candidate
        // message, which lives in the transcript, not on this record; the
        // orchestrator persists it before requesting the edge.
        InterviewStatus::InProgress | InterviewStatus::Completed | InterviewStatus::Draft => {}
    }
    Ok(())
}

/// Validates and applies one lifecycle transition, bumping `updated_at`.
/// On any failure the interview is returned exactly as it came in.
pub fn transition(interview: &mut Interview, target: InterviewStatus) -> Result<(), AppError> {
    ensure_legal(interview.status, target)?;
    check_preconditions(interview, target)?;

    let previous = interview.status;
    interview.status = target;
    interview.updated_at = Utc::now();

    info!("Interview {}: {previous} -> {target}", interview.id);
    Ok(())
}

/// The IN_PROGRESS → COMPLETED edge with its reason on the record (in the
/// logs; the row itself only carries the status).
pub fn complete(interview: &mut Interview, reason: CompletionReason) -> Result<(), AppError> {
    transition(interview, InterviewStatus::Completed)?;
    info!("Interview {} completed: {reason}", interview.id);
    Ok(())
}
