use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use assess_core::Clock;
use assess_core::model::{
    AnswerValue, AttemptId, Question, QuestionCatalog, QuestionId, SessionStatus,
    SubmissionRecord, SubmitReason,
};

use crate::error::BootstrapError;
use crate::persist::{AutosaveSink, SubmissionSink};
use super::answers::{AnswerSheet, FlagSet};
use super::clock::{DeadlineClock, TimeRemaining};
use super::guard::{GuardDecision, SubmissionGuard};
use super::navigator::Navigator;
use super::outcome::{MutationOutcome, MutationResult, Rejection, SubmitOutcome, SubmitResult};
use super::view::{SessionSnapshot, SessionView};

/// Everything the server supplies to open one assessment attempt.
///
/// `prior_answers` / `prior_flags` resume a previously autosaved draft; stale
/// entries are dropped during loading rather than rejected.
#[derive(Debug, Clone)]
pub struct SessionBootstrap {
    pub questions: Vec<Question>,
    pub deadline_at: Option<DateTime<Utc>>,
    pub prior_answers: Option<BTreeMap<QuestionId, AnswerValue>>,
    pub prior_flags: Option<BTreeSet<QuestionId>>,
    pub prior_cursor: Option<usize>,
}

impl SessionBootstrap {
    #[must_use]
    pub fn new(questions: Vec<Question>, deadline_at: Option<DateTime<Utc>>) -> Self {
        Self {
            questions,
            deadline_at,
            prior_answers: None,
            prior_flags: None,
            prior_cursor: None,
        }
    }

    #[must_use]
    pub fn with_prior_answers(mut self, answers: BTreeMap<QuestionId, AnswerValue>) -> Self {
        self.prior_answers = Some(answers);
        self
    }

    #[must_use]
    pub fn with_prior_flags(mut self, flags: BTreeSet<QuestionId>) -> Self {
        self.prior_flags = Some(flags);
        self
    }

    /// Restores the question the learner was looking at when the draft was
    /// saved. Clamped into range on load.
    #[must_use]
    pub fn with_prior_cursor(mut self, cursor: usize) -> Self {
        self.prior_cursor = Some(cursor);
        self
    }
}

/// The single state machine the UI holds for one assessment attempt.
///
/// Composes the deadline clock, navigator, answer sheet, flag set and
/// submission guard. Every mutating call returns a fresh derived view; every
/// applied mutation pulses the autosave sink; the terminal transition hands
/// the submission record to the submission sink exactly once. The controller
/// never awaits either sink.
pub struct SessionController {
    attempt_id: AttemptId,
    catalog: QuestionCatalog,
    sheet: AnswerSheet,
    flags: FlagSet,
    navigator: Navigator,
    deadline: DeadlineClock,
    guard: SubmissionGuard,
    clock: Clock,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    record_delivered: bool,
    autosave: Arc<dyn AutosaveSink>,
    submission: Arc<dyn SubmissionSink>,
}

impl SessionController {
    /// Builds the session and evaluates the deadline once.
    ///
    /// A deadline already in the past locks the session as `Expired` here,
    /// before any tick is scheduled; the learner never sees an editable
    /// expired session.
    ///
    /// # Errors
    ///
    /// Returns `BootstrapError` if the question list is empty or malformed.
    pub fn new(
        bootstrap: SessionBootstrap,
        clock: Clock,
        autosave: Arc<dyn AutosaveSink>,
        submission: Arc<dyn SubmissionSink>,
    ) -> Result<Self, BootstrapError> {
        let catalog = QuestionCatalog::new(bootstrap.questions)?;
        let sheet = match bootstrap.prior_answers {
            Some(saved) => AnswerSheet::resume(&catalog, saved),
            None => AnswerSheet::new(),
        };
        let flags = match bootstrap.prior_flags {
            Some(saved) => FlagSet::resume(&catalog, saved),
            None => FlagSet::new(),
        };
        let navigator = match bootstrap.prior_cursor {
            Some(cursor) => Navigator::resume(catalog.len(), cursor),
            None => Navigator::new(catalog.len()),
        };

        let mut session = Self {
            attempt_id: AttemptId::random(),
            catalog,
            sheet,
            flags,
            navigator,
            deadline: DeadlineClock::new(bootstrap.deadline_at),
            guard: SubmissionGuard::new(),
            clock,
            started_at: None,
            finished_at: None,
            record_delivered: false,
            autosave,
            submission,
        };

        let now = session.clock.now();
        if session.deadline.poll_expiry(now) {
            session.expire(now);
        }

        Ok(session)
    }

    // ─── Accessors ─────────────────────────────────────────────────────────────

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.guard.status()
    }

    #[must_use]
    pub fn catalog(&self) -> &QuestionCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.sheet.answered_count()
    }

    #[must_use]
    pub fn remaining(&self) -> TimeRemaining {
        self.deadline.remaining(self.clock.now())
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// Mutable clock access, mainly so tests can advance a fixed clock.
    pub fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }

    // ─── Lifecycle ─────────────────────────────────────────────────────────────

    /// `NotStarted → InProgress`. A second call is a refused no-op.
    pub fn start(&mut self) -> MutationResult {
        if !self.guard.start() {
            let rejection = if self.guard.is_terminal() {
                Rejection::NotEditable
            } else {
                Rejection::AlreadyStarted
            };
            return self.refuse(rejection);
        }
        self.started_at = Some(self.clock.now());
        self.applied()
    }

    /// One clock tick. Samples "now", fires the expiry edge if the deadline
    /// just ran out, and returns a fresh view either way so a countdown
    /// display stays live. This is the only place auto-submission is wired.
    pub fn tick(&mut self) -> SessionView {
        if self.guard.status() == SessionStatus::InProgress {
            let now = self.clock.now();
            if self.deadline.poll_expiry(now) {
                self.expire(now);
            }
        }
        self.view()
    }

    /// Attempts submission. Incomplete sessions get `ConfirmationRequired`
    /// unless `force` is true; the UI re-invokes with `force = true` after
    /// explicit learner confirmation.
    pub fn request_submit(&mut self, force: bool) -> SubmitResult {
        let complete = self.sheet.answered_count() == self.catalog.len();
        let outcome = match self.guard.request_submit(force, complete) {
            GuardDecision::Submitted => {
                let now = self.clock.now();
                self.finish(now, SubmitReason::Manual);
                SubmitOutcome::Submitted
            }
            GuardDecision::ConfirmationRequired => SubmitOutcome::ConfirmationRequired {
                unanswered: self.catalog.len() - self.sheet.answered_count(),
            },
            GuardDecision::AlreadyTerminal => SubmitOutcome::AlreadyTerminal,
            GuardDecision::NotStarted => SubmitOutcome::NotStarted,
        };
        SubmitResult {
            outcome,
            view: self.view(),
        }
    }

    // ─── Mutations ─────────────────────────────────────────────────────────────

    /// Validates and stores an answer (last-write-wins).
    pub fn set_answer(&mut self, id: QuestionId, value: AnswerValue) -> MutationResult {
        if !self.editable() {
            return self.refuse(Rejection::NotEditable);
        }
        match self.sheet.set(&self.catalog, id, value) {
            Ok(()) => self.applied(),
            Err(rejection) => self.refuse(rejection),
        }
    }

    /// Removes the stored answer for a question. This is the clearing path
    /// for choice and scale answers, which have no empty representation.
    pub fn clear_answer(&mut self, id: QuestionId) -> MutationResult {
        if !self.editable() {
            return self.refuse(Rejection::NotEditable);
        }
        match self.sheet.clear(&self.catalog, id) {
            Ok(()) => self.applied(),
            Err(rejection) => self.refuse(rejection),
        }
    }

    /// Flags or unflags a question for review.
    pub fn toggle_flag(&mut self, id: QuestionId) -> MutationResult {
        if !self.editable() {
            return self.refuse(Rejection::NotEditable);
        }
        match self.flags.toggle(&self.catalog, id) {
            Ok(_) => self.applied(),
            Err(rejection) => self.refuse(rejection),
        }
    }

    /// Moves to the next question; clamped no-op at the end.
    pub fn next(&mut self) -> MutationResult {
        if !self.editable() {
            return self.refuse(Rejection::NotEditable);
        }
        if self.navigator.next() {
            self.applied()
        } else {
            // Boundary: a no-op by contract, not a rejection.
            self.unchanged()
        }
    }

    /// Moves to the previous question; clamped no-op at the start.
    pub fn prev(&mut self) -> MutationResult {
        if !self.editable() {
            return self.refuse(Rejection::NotEditable);
        }
        if self.navigator.prev() {
            self.applied()
        } else {
            self.unchanged()
        }
    }

    /// Jumps to an absolute question position.
    pub fn jump_to(&mut self, position: usize) -> MutationResult {
        if !self.editable() {
            return self.refuse(Rejection::NotEditable);
        }
        if self.navigator.jump_to(position) {
            self.applied()
        } else {
            self.refuse(Rejection::OutOfRange(position))
        }
    }

    // ─── Derived state ─────────────────────────────────────────────────────────

    /// Builds the derived read-only view the UI renders from.
    #[must_use]
    pub fn view(&self) -> SessionView {
        let position = self.navigator.cursor();
        // The navigator clamps its cursor into the catalog range.
        let current_question = self.catalog.questions()[position].clone();
        let current_answer = self.sheet.get(current_question.id()).cloned();
        let answered_count = self.sheet.answered_count();
        let total = self.catalog.len();
        let status = self.guard.status();

        SessionView {
            status,
            current_index: position,
            current_question,
            current_answer,
            remaining: self.remaining(),
            progress: answered_count as f64 / total as f64 * 100.0,
            answered_count,
            total,
            flagged: self.flags.ids().clone(),
            can_submit: status == SessionStatus::InProgress,
        }
    }

    /// Serializable draft state for the autosave collaborator.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            answers: self.sheet.values().clone(),
            flags: self.flags.ids().clone(),
            cursor: self.navigator.cursor(),
            status: self.guard.status(),
            saved_at: self.clock.now(),
        }
    }

    // ─── Internals ─────────────────────────────────────────────────────────────

    fn editable(&self) -> bool {
        self.guard.status() == SessionStatus::InProgress
    }

    /// Applied mutation: pulse the autosave sink, return a fresh view.
    fn applied(&mut self) -> MutationResult {
        let snapshot = self.snapshot();
        self.autosave.save(&snapshot, false);
        MutationResult {
            outcome: MutationOutcome::Applied,
            view: self.view(),
        }
    }

    /// Clamped boundary no-op: nothing changed, nothing to autosave.
    fn unchanged(&self) -> MutationResult {
        MutationResult {
            outcome: MutationOutcome::Applied,
            view: self.view(),
        }
    }

    fn refuse(&self, rejection: Rejection) -> MutationResult {
        MutationResult {
            outcome: MutationOutcome::Rejected(rejection),
            view: self.view(),
        }
    }

    fn expire(&mut self, now: DateTime<Utc>) {
        if self.guard.on_expiry() {
            self.finish(now, SubmitReason::Expired);
        }
    }

    /// Runs once per session, at the moment a terminal status is entered:
    /// final autosave, then exactly-once delivery of the submission record.
    fn finish(&mut self, now: DateTime<Utc>, reason: SubmitReason) {
        self.finished_at = Some(now);

        let snapshot = self.snapshot();
        self.autosave.save(&snapshot, true);

        if self.record_delivered {
            return;
        }
        let record = SubmissionRecord::new(
            self.sheet.values().clone(),
            self.flags.ids().clone(),
            now,
            reason,
        );
        self.submission.submit(&record);
        self.record_delivered = true;
    }
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("attempt_id", &self.attempt_id)
            .field("status", &self.guard.status())
            .field("questions", &self.catalog.len())
            .field("answered", &self.sheet.answered_count())
            .field("cursor", &self.navigator.cursor())
            .field("deadline_at", &self.deadline.deadline_at())
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::RecordingSink;
    use assess_core::model::QuestionKind;
    use assess_core::time::{fixed_clock, fixed_now};
    use chrono::Duration;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|_| {
                Question::new(
                    QuestionId::random(),
                    QuestionKind::LikertScale { min: 1, max: 5 },
                    true,
                )
            })
            .collect()
    }

    fn session(n: usize, deadline: Option<DateTime<Utc>>) -> (SessionController, RecordingSink) {
        let sink = RecordingSink::new();
        let controller = SessionController::new(
            SessionBootstrap::new(questions(n), deadline),
            fixed_clock(),
            Arc::new(sink.clone()),
            Arc::new(sink.clone()),
        )
        .unwrap();
        (controller, sink)
    }

    #[test]
    fn mutations_before_start_are_refused() {
        let (mut controller, sink) = session(3, None);
        let id = controller.catalog().questions()[0].id();

        let result = controller.set_answer(id, AnswerValue::Scale(3));
        assert_eq!(
            result.outcome,
            MutationOutcome::Rejected(Rejection::NotEditable)
        );
        assert_eq!(sink.save_count(), 0);
    }

    #[test]
    fn double_start_is_refused() {
        let (mut controller, _sink) = session(3, None);
        assert!(controller.start().outcome.is_applied());
        assert_eq!(
            controller.start().outcome,
            MutationOutcome::Rejected(Rejection::AlreadyStarted)
        );
    }

    #[test]
    fn applied_mutations_pulse_autosave() {
        let (mut controller, sink) = session(3, None);
        controller.start();
        let id = controller.catalog().questions()[0].id();

        controller.set_answer(id, AnswerValue::Scale(4));
        controller.toggle_flag(id);

        let saves = sink.saves();
        // start + answer + flag, none of them final.
        assert_eq!(saves.len(), 3);
        assert!(saves.iter().all(|(_, is_final)| !is_final));
        assert_eq!(saves[1].0.answers.get(&id), Some(&AnswerValue::Scale(4)));
    }

    #[test]
    fn rejected_mutations_do_not_pulse_autosave() {
        let (mut controller, sink) = session(3, None);
        controller.start();
        let before = sink.save_count();

        controller.set_answer(QuestionId::random(), AnswerValue::Scale(1));
        controller.jump_to(99);

        assert_eq!(sink.save_count(), before);
    }

    #[test]
    fn view_tracks_cursor_and_progress() {
        let (mut controller, _sink) = session(4, None);
        controller.start();
        let ids: Vec<_> = controller
            .catalog()
            .questions()
            .iter()
            .map(Question::id)
            .collect();

        controller.set_answer(ids[0], AnswerValue::Scale(5));
        let result = controller.next();
        assert_eq!(result.view.current_index, 1);
        assert_eq!(result.view.current_question.id(), ids[1]);
        assert_eq!(result.view.answered_count, 1);
        assert!((result.view.progress - 25.0).abs() < f64::EPSILON);
        assert!(result.view.can_submit);
    }

    #[test]
    fn submit_freezes_everything() {
        let (mut controller, sink) = session(2, None);
        controller.start();
        let id = controller.catalog().questions()[0].id();
        controller.set_answer(id, AnswerValue::Scale(2));

        let result = controller.request_submit(true);
        assert_eq!(result.outcome, SubmitOutcome::Submitted);
        assert_eq!(result.view.status, SessionStatus::Submitted);
        assert!(!result.view.can_submit);

        // All further mutation is a refused no-op.
        assert_eq!(
            controller.set_answer(id, AnswerValue::Scale(5)).outcome,
            MutationOutcome::Rejected(Rejection::NotEditable)
        );
        assert_eq!(
            controller.next().outcome,
            MutationOutcome::Rejected(Rejection::NotEditable)
        );
        assert_eq!(
            controller.toggle_flag(id).outcome,
            MutationOutcome::Rejected(Rejection::NotEditable)
        );
        assert_eq!(controller.answered_count(), 1);
        assert_eq!(sink.submission_count(), 1);
    }

    #[test]
    fn final_autosave_accompanies_submission() {
        let (mut controller, sink) = session(1, None);
        controller.start();
        let id = controller.catalog().questions()[0].id();
        controller.set_answer(id, AnswerValue::Scale(1));
        controller.request_submit(false);

        let saves = sink.saves();
        let (last, is_final) = saves.last().unwrap();
        assert!(*is_final);
        assert_eq!(last.status, SessionStatus::Submitted);
    }

    #[test]
    fn tick_refreshes_view_without_input() {
        let (mut controller, _sink) = session(2, Some(fixed_now() + Duration::seconds(30)));
        controller.start();

        let view = controller.tick();
        assert_eq!(view.remaining, TimeRemaining::Seconds(30));
        assert_eq!(view.status, SessionStatus::InProgress);

        controller.clock_mut().advance_secs(10);
        let view = controller.tick();
        assert_eq!(view.remaining, TimeRemaining::Seconds(20));
    }

    #[test]
    fn expiry_races_with_manual_submit() {
        let (mut controller, sink) = session(2, Some(fixed_now() + Duration::seconds(5)));
        controller.start();

        let result = controller.request_submit(true);
        assert_eq!(result.outcome, SubmitOutcome::Submitted);

        // A dangling timer fires after submission; the guard absorbs it.
        controller.clock_mut().advance_secs(10);
        let view = controller.tick();
        assert_eq!(view.status, SessionStatus::Submitted);
        assert_eq!(sink.submission_count(), 1);
        assert_eq!(
            sink.submissions()[0].reason(),
            SubmitReason::Manual
        );
    }

    #[test]
    fn resumed_draft_restores_answers_and_flags() {
        let sink = RecordingSink::new();
        let qs = questions(3);
        let ids: Vec<_> = qs.iter().map(Question::id).collect();
        let mut prior_answers = BTreeMap::new();
        prior_answers.insert(ids[0], AnswerValue::Scale(4));
        let mut prior_flags = BTreeSet::new();
        prior_flags.insert(ids[2]);

        let mut controller = SessionController::new(
            SessionBootstrap::new(qs, None)
                .with_prior_answers(prior_answers)
                .with_prior_flags(prior_flags)
                .with_prior_cursor(0),
            fixed_clock(),
            Arc::new(sink.clone()),
            Arc::new(sink.clone()),
        )
        .unwrap();
        controller.start();

        let view = controller.view();
        assert_eq!(view.answered_count, 1);
        assert!(view.flagged.contains(&ids[2]));
        assert_eq!(view.current_answer, Some(AnswerValue::Scale(4)));
    }
}
