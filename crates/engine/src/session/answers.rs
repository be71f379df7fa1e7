use std::collections::{BTreeMap, BTreeSet};

use assess_core::model::{AnswerValue, QuestionCatalog, QuestionId};

use super::outcome::Rejection;

/// Mapping from question id to the learner's current answer.
///
/// Writes are validated against the catalog so the sheet never holds a value
/// whose shape disagrees with its question. Assignment is last-write-wins;
/// there is no history.
#[derive(Debug, Clone, Default)]
pub struct AnswerSheet {
    values: BTreeMap<QuestionId, AnswerValue>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a previously autosaved draft, dropping any entry that no longer
    /// fits the catalog (stale ids, changed question shapes).
    #[must_use]
    pub fn resume(catalog: &QuestionCatalog, saved: BTreeMap<QuestionId, AnswerValue>) -> Self {
        let values = saved
            .into_iter()
            .filter(|(id, value)| {
                catalog
                    .by_id(*id)
                    .is_some_and(|question| value.fits(question.kind()))
            })
            .collect();
        Self { values }
    }

    /// Validates and stores an answer, replacing any prior value.
    ///
    /// Unknown ids and mismatched values are refused with no mutation.
    pub fn set(
        &mut self,
        catalog: &QuestionCatalog,
        id: QuestionId,
        value: AnswerValue,
    ) -> Result<(), Rejection> {
        let Some(question) = catalog.by_id(id) else {
            return Err(Rejection::UnknownQuestion(id));
        };
        if !value.fits(question.kind()) {
            return Err(Rejection::ValueMismatch(id));
        }
        self.values.insert(id, value);
        Ok(())
    }

    /// Removes the stored answer for a question, if any.
    ///
    /// This is the clearing path for kinds without an empty representation;
    /// text answers may equivalently be set to the empty string.
    pub fn clear(&mut self, catalog: &QuestionCatalog, id: QuestionId) -> Result<(), Rejection> {
        if !catalog.contains(id) {
            return Err(Rejection::UnknownQuestion(id));
        }
        self.values.remove(&id);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: QuestionId) -> Option<&AnswerValue> {
        self.values.get(&id)
    }

    /// Number of questions with a non-empty answer. Empty text entries count
    /// as unanswered.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.values.values().filter(|v| !v.is_empty()).count()
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<QuestionId, AnswerValue> {
        &self.values
    }
}

/// Set of question ids the learner marked for review.
///
/// Always a subset of the catalog's ids; toggling is symmetric.
#[derive(Debug, Clone, Default)]
pub struct FlagSet {
    ids: BTreeSet<QuestionId>,
}

impl FlagSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads persisted flags, keeping only ids present in the catalog.
    #[must_use]
    pub fn resume(catalog: &QuestionCatalog, saved: BTreeSet<QuestionId>) -> Self {
        let ids = saved.into_iter().filter(|id| catalog.contains(*id)).collect();
        Self { ids }
    }

    /// Flags an unflagged question, unflags a flagged one. Returns whether
    /// the question is flagged after the call.
    pub fn toggle(&mut self, catalog: &QuestionCatalog, id: QuestionId) -> Result<bool, Rejection> {
        if !catalog.contains(id) {
            return Err(Rejection::UnknownQuestion(id));
        }
        if self.ids.remove(&id) {
            Ok(false)
        } else {
            self.ids.insert(id);
            Ok(true)
        }
    }

    #[must_use]
    pub fn contains(&self, id: QuestionId) -> bool {
        self.ids.contains(&id)
    }

    #[must_use]
    pub fn ids(&self) -> &BTreeSet<QuestionId> {
        &self.ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::model::{Question, QuestionKind};

    fn catalog() -> (QuestionCatalog, Vec<QuestionId>) {
        let ids: Vec<_> = (0..3).map(|_| QuestionId::random()).collect();
        let questions = vec![
            Question::new(
                ids[0],
                QuestionKind::SingleChoice {
                    choices: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                },
                true,
            ),
            Question::new(ids[1], QuestionKind::LikertScale { min: 1, max: 5 }, true),
            Question::new(ids[2], QuestionKind::FreeText, false),
        ];
        (QuestionCatalog::new(questions).unwrap(), ids)
    }

    #[test]
    fn last_write_wins() {
        let (catalog, ids) = catalog();
        let mut sheet = AnswerSheet::new();

        sheet
            .set(&catalog, ids[0], AnswerValue::Choice("A".into()))
            .unwrap();
        sheet
            .set(&catalog, ids[0], AnswerValue::Choice("C".into()))
            .unwrap();

        assert_eq!(sheet.get(ids[0]), Some(&AnswerValue::Choice("C".into())));
        assert_eq!(sheet.answered_count(), 1);
    }

    #[test]
    fn unknown_id_and_mismatch_leave_sheet_untouched() {
        let (catalog, ids) = catalog();
        let mut sheet = AnswerSheet::new();

        let stranger = QuestionId::random();
        assert_eq!(
            sheet.set(&catalog, stranger, AnswerValue::Scale(3)),
            Err(Rejection::UnknownQuestion(stranger))
        );
        assert_eq!(
            sheet.set(&catalog, ids[1], AnswerValue::Scale(9)),
            Err(Rejection::ValueMismatch(ids[1]))
        );
        assert_eq!(
            sheet.set(&catalog, ids[0], AnswerValue::Choice("Z".into())),
            Err(Rejection::ValueMismatch(ids[0]))
        );
        assert_eq!(sheet.answered_count(), 0);
    }

    #[test]
    fn empty_text_does_not_count_as_answered() {
        let (catalog, ids) = catalog();
        let mut sheet = AnswerSheet::new();

        sheet
            .set(&catalog, ids[2], AnswerValue::Text("draft".into()))
            .unwrap();
        assert_eq!(sheet.answered_count(), 1);

        // Clearing by writing the empty representation.
        sheet
            .set(&catalog, ids[2], AnswerValue::Text(String::new()))
            .unwrap();
        assert_eq!(sheet.answered_count(), 0);
    }

    #[test]
    fn clear_removes_non_text_answers() {
        let (catalog, ids) = catalog();
        let mut sheet = AnswerSheet::new();

        sheet.set(&catalog, ids[1], AnswerValue::Scale(4)).unwrap();
        sheet.clear(&catalog, ids[1]).unwrap();
        assert_eq!(sheet.get(ids[1]), None);

        let stranger = QuestionId::random();
        assert_eq!(
            sheet.clear(&catalog, stranger),
            Err(Rejection::UnknownQuestion(stranger))
        );
    }

    #[test]
    fn resume_drops_entries_that_no_longer_fit() {
        let (catalog, ids) = catalog();
        let mut saved = BTreeMap::new();
        saved.insert(ids[0], AnswerValue::Choice("B".into()));
        saved.insert(ids[1], AnswerValue::Scale(99)); // out of bounds now
        saved.insert(QuestionId::random(), AnswerValue::Text("orphan".into()));

        let sheet = AnswerSheet::resume(&catalog, saved);
        assert_eq!(sheet.answered_count(), 1);
        assert_eq!(sheet.get(ids[0]), Some(&AnswerValue::Choice("B".into())));
    }

    #[test]
    fn toggle_is_an_involution() {
        let (catalog, ids) = catalog();
        let mut flags = FlagSet::new();

        assert_eq!(flags.toggle(&catalog, ids[1]), Ok(true));
        assert!(flags.contains(ids[1]));
        assert_eq!(flags.toggle(&catalog, ids[1]), Ok(false));
        assert!(!flags.contains(ids[1]));
    }

    #[test]
    fn toggle_refuses_unknown_ids() {
        let (catalog, _ids) = catalog();
        let mut flags = FlagSet::new();
        let stranger = QuestionId::random();
        assert_eq!(
            flags.toggle(&catalog, stranger),
            Err(Rejection::UnknownQuestion(stranger))
        );
        assert!(flags.ids().is_empty());
    }

    #[test]
    fn resume_flags_prunes_stale_ids() {
        let (catalog, ids) = catalog();
        let mut saved = BTreeSet::new();
        saved.insert(ids[2]);
        saved.insert(QuestionId::random());

        let flags = FlagSet::resume(&catalog, saved);
        assert_eq!(flags.ids().len(), 1);
        assert!(flags.contains(ids[2]));
    }
}
