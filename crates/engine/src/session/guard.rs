use assess_core::model::SessionStatus;

/// What the guard decided for a submit request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Submitted,
    ConfirmationRequired,
    AlreadyTerminal,
    NotStarted,
}

/// One-way gate over the session lifecycle.
///
/// `NotStarted → InProgress → {Submitted, Expired}`. The terminal states are
/// irreversible, and both terminal entry points are idempotent: a second
/// submit or a late expiry tick finds the gate already closed and does
/// nothing. That idempotence, not caller discipline, is what guarantees
/// "submit exactly once" under double clicks or an expiry racing a manual
/// submit.
#[derive(Debug, Clone)]
pub struct SubmissionGuard {
    status: SessionStatus,
}

impl SubmissionGuard {
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: SessionStatus::NotStarted,
        }
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// `NotStarted → InProgress`. Returns false (no-op) from any other state.
    pub fn start(&mut self) -> bool {
        if self.status == SessionStatus::NotStarted {
            self.status = SessionStatus::InProgress;
            true
        } else {
            false
        }
    }

    /// Attempts the `InProgress → Submitted` transition.
    ///
    /// An incomplete session submits only when `force` is true; otherwise the
    /// caller gets `ConfirmationRequired` and the state is untouched. It is
    /// the confirmation, not the permission, that depends on completeness.
    pub fn request_submit(&mut self, force: bool, complete: bool) -> GuardDecision {
        match self.status {
            SessionStatus::Submitted | SessionStatus::Expired => GuardDecision::AlreadyTerminal,
            SessionStatus::NotStarted => GuardDecision::NotStarted,
            SessionStatus::InProgress => {
                if complete || force {
                    self.status = SessionStatus::Submitted;
                    GuardDecision::Submitted
                } else {
                    GuardDecision::ConfirmationRequired
                }
            }
        }
    }

    /// Deadline expiry: unconditionally locks a non-terminal session as
    /// `Expired`, regardless of completeness. Returns whether this call made
    /// the transition.
    ///
    /// Accepting expiry from `NotStarted` covers sessions constructed with a
    /// deadline already in the past; the learner must never see an editable
    /// expired session.
    pub fn on_expiry(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = SessionStatus::Expired;
        true
    }
}

impl Default for SubmissionGuard {
    fn default() -> Self {
        Self::new()
    }
}
