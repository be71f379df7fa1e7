use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::model::{AnswerValue, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordError {
    #[error("submitted_at is before started_at")]
    InvalidTimeRange,
}

/// Lifecycle of a session. `Submitted` and `Expired` are both terminal and
/// both mean "locked"; they differ only in how the transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    NotStarted,
    InProgress,
    Submitted,
    Expired,
}

impl SessionStatus {
    /// Whether this status accepts no further mutation.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Submitted | SessionStatus::Expired)
    }
}

/// How a session reached its terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitReason {
    /// The learner submitted.
    Manual,
    /// The deadline ran out.
    Expired,
}

/// The final payload handed to the submission collaborator, built exactly
/// once at the moment the session turns terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    answers: BTreeMap<QuestionId, AnswerValue>,
    flags: BTreeSet<QuestionId>,
    submitted_at: DateTime<Utc>,
    reason: SubmitReason,
}

impl SubmissionRecord {
    /// Builds the record from the session's final state.
    #[must_use]
    pub fn new(
        answers: BTreeMap<QuestionId, AnswerValue>,
        flags: BTreeSet<QuestionId>,
        submitted_at: DateTime<Utc>,
        reason: SubmitReason,
    ) -> Self {
        Self {
            answers,
            flags,
            submitted_at,
            reason,
        }
    }

    /// Rehydrates a record from persisted data, checking the time range
    /// against the attempt's start.
    ///
    /// # Errors
    ///
    /// Returns `RecordError::InvalidTimeRange` if `submitted_at` precedes
    /// `started_at`.
    pub fn from_persisted(
        answers: BTreeMap<QuestionId, AnswerValue>,
        flags: BTreeSet<QuestionId>,
        started_at: DateTime<Utc>,
        submitted_at: DateTime<Utc>,
        reason: SubmitReason,
    ) -> Result<Self, RecordError> {
        if submitted_at < started_at {
            return Err(RecordError::InvalidTimeRange);
        }
        Ok(Self::new(answers, flags, submitted_at, reason))
    }

    #[must_use]
    pub fn answers(&self) -> &BTreeMap<QuestionId, AnswerValue> {
        &self.answers
    }

    #[must_use]
    pub fn flags(&self) -> &BTreeSet<QuestionId> {
        &self.flags
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn reason(&self) -> SubmitReason {
        self.reason
    }
}
