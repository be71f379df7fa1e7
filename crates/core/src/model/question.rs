use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::model::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("a session needs at least one question")]
    Empty,

    #[error("duplicate question id: {0}")]
    DuplicateId(QuestionId),

    #[error("single-choice question {0} declares no choices")]
    NoChoices(QuestionId),

    #[error("likert bounds for question {id} are inverted: min {min}, max {max}")]
    InvertedScale { id: QuestionId, min: i32, max: i32 },
}

/// Closed set of question shapes the engine understands.
///
/// Each feature area (assignments, ARCS questionnaires) maps its own question
/// records onto this union; validation of answers is exhaustive over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionKind {
    /// One answer out of a fixed label set (e.g. "A".."D").
    SingleChoice { choices: Vec<String> },
    /// An integer rating within `[min, max]`, inclusive.
    LikertScale { min: i32, max: i32 },
    /// Short free-form text.
    FreeText,
    /// Long free-form text. Same answer shape as `FreeText`; the distinction
    /// only matters to the rendering layer.
    Essay,
}

/// One question descriptor. Immutable for the session's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    required: bool,
    /// Domain tag supplied by the feature area, e.g. an ARCS dimension.
    /// Opaque to the engine.
    tag: Option<String>,
}

impl Question {
    #[must_use]
    pub fn new(id: QuestionId, kind: QuestionKind, required: bool) -> Self {
        Self {
            id,
            kind,
            required,
            tag: None,
        }
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    #[must_use]
    pub fn required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }
}

/// Immutable ordered list of questions for one session.
///
/// The list order is canonical: it defines navigation order and is never
/// reordered or mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionCatalog {
    questions: Vec<Question>,
    index: HashMap<QuestionId, usize>,
}

impl QuestionCatalog {
    /// Validates and freezes the question list.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Empty` for an empty list,
    /// `CatalogError::DuplicateId` for repeated ids, and
    /// `CatalogError::NoChoices` / `CatalogError::InvertedScale` for
    /// malformed question shapes.
    pub fn new(questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut index = HashMap::with_capacity(questions.len());
        for (pos, question) in questions.iter().enumerate() {
            match question.kind() {
                QuestionKind::SingleChoice { choices } if choices.is_empty() => {
                    return Err(CatalogError::NoChoices(question.id()));
                }
                QuestionKind::LikertScale { min, max } if min > max => {
                    return Err(CatalogError::InvertedScale {
                        id: question.id(),
                        min: *min,
                        max: *max,
                    });
                }
                _ => {}
            }
            if index.insert(question.id(), pos).is_some() {
                return Err(CatalogError::DuplicateId(question.id()));
            }
        }

        Ok(Self { questions, index })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Always false; construction rejects empty lists.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Question> {
        self.questions.get(position)
    }

    #[must_use]
    pub fn by_id(&self, id: QuestionId) -> Option<&Question> {
        self.index.get(&id).map(|&pos| &self.questions[pos])
    }

    #[must_use]
    pub fn position_of(&self, id: QuestionId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.index.contains_key(&id)
    }
}
