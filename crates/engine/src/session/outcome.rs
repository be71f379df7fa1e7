use assess_core::model::QuestionId;

use super::view::SessionView;

/// Why a mutation was refused. The prior state is always kept; none of these
/// surface as Rust errors because they represent stale UI references or
/// duplicate events, not learner-facing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The question id is not part of this session's catalog.
    UnknownQuestion(QuestionId),
    /// The answer's shape or value does not fit the question's declared kind.
    ValueMismatch(QuestionId),
    /// `jump_to` target outside the catalog.
    OutOfRange(usize),
    /// The session is not in progress (not yet started, or already locked).
    NotEditable,
    /// `start` on a session that already left `NotStarted`.
    AlreadyStarted,
}

/// Whether a mutating call changed the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    Rejected(Rejection),
}

impl MutationOutcome {
    #[must_use]
    pub fn is_applied(self) -> bool {
        matches!(self, MutationOutcome::Applied)
    }
}

/// Result of a single mutating call: what happened plus a fresh derived view.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    pub outcome: MutationOutcome,
    pub view: SessionView,
}

/// Result of a `request_submit` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The session transitioned to `Submitted`.
    Submitted,
    /// Some questions are unanswered and `force` was false. No transition
    /// happened; the UI must confirm with the learner and re-invoke with
    /// `force = true`.
    ConfirmationRequired { unanswered: usize },
    /// The session was already `Submitted` or `Expired`. No side effects.
    AlreadyTerminal,
    /// The session was never started.
    NotStarted,
}

/// Submit outcome plus the fresh derived view.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitResult {
    pub outcome: SubmitOutcome,
    pub view: SessionView,
}
