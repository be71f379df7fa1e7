use serde::{Deserialize, Serialize};

use crate::model::QuestionKind;

/// A learner's answer to one question, tagged by shape.
///
/// The shape must agree with the owning question's `QuestionKind`; the engine
/// checks `fits` on every write so a stored answer never disagrees with its
/// question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerValue {
    /// One label from a single-choice question's declared set.
    Choice(String),
    /// An integer rating for a likert-scale question.
    Scale(i32),
    /// Free-form text for `FreeText` / `Essay` questions. An empty string
    /// means "not answered", not "answered with nothing".
    Text(String),
}

impl AnswerValue {
    /// Whether this value is a valid answer for the given question kind.
    ///
    /// This is value-level validation, not just shape-level: a `Choice` must
    /// name one of the declared labels and a `Scale` must fall inside the
    /// declared bounds.
    #[must_use]
    pub fn fits(&self, kind: &QuestionKind) -> bool {
        match (self, kind) {
            (AnswerValue::Choice(label), QuestionKind::SingleChoice { choices }) => {
                choices.iter().any(|c| c == label)
            }
            (AnswerValue::Scale(rating), QuestionKind::LikertScale { min, max }) => {
                *min <= *rating && *rating <= *max
            }
            (AnswerValue::Text(_), QuestionKind::FreeText | QuestionKind::Essay) => true,
            _ => false,
        }
    }

    /// Whether this value counts as "unanswered" for progress purposes.
    ///
    /// Only text answers have an empty representation; a stored `Choice` or
    /// `Scale` always counts as answered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.is_empty(),
            AnswerValue::Choice(_) | AnswerValue::Scale(_) => false,
        }
    }

    /// The "cleared" representation for the given kind, if it has one.
    ///
    /// Text kinds clear to the empty string; choice and scale answers have no
    /// empty representation and are cleared by removing the entry instead.
    #[must_use]
    pub fn empty_for(kind: &QuestionKind) -> Option<Self> {
        match kind {
            QuestionKind::FreeText | QuestionKind::Essay => {
                Some(AnswerValue::Text(String::new()))
            }
            QuestionKind::SingleChoice { .. } | QuestionKind::LikertScale { .. } => None,
        }
    }
}
