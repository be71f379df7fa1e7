use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use assess_core::model::{AnswerValue, Question, QuestionId, SessionStatus};

use super::clock::TimeRemaining;

/// Derived read-only view of a session, rebuilt on every change.
///
/// This is intentionally **not** a UI view-model:
/// - no pre-formatted strings
/// - no localization assumptions
///
/// The UI formats remaining time and progress as it sees fit.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status: SessionStatus,
    pub current_index: usize,
    pub current_question: Question,
    pub current_answer: Option<AnswerValue>,
    pub remaining: TimeRemaining,
    /// `answered / total * 100`.
    pub progress: f64,
    pub answered_count: usize,
    pub total: usize,
    pub flagged: BTreeSet<QuestionId>,
    /// True whenever the session is `InProgress`. Submission with warnings is
    /// always allowed; completeness only gates the confirmation step.
    pub can_submit: bool,
}

/// Serializable draft state handed to the autosave collaborator.
///
/// The catalog is excluded: the server owns the questions and supplies them
/// again on resume. Only the learner's work travels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub answers: BTreeMap<QuestionId, AnswerValue>,
    pub flags: BTreeSet<QuestionId>,
    pub cursor: usize,
    pub status: SessionStatus,
    pub saved_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// JSON payload for transports that want a string body.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
