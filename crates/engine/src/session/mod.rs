mod answers;
mod clock;
mod controller;
mod guard;
mod navigator;
mod outcome;
mod view;

// Public API of the session engine.
pub use answers::{AnswerSheet, FlagSet};
pub use clock::{DeadlineClock, TimeRemaining};
pub use controller::{SessionBootstrap, SessionController};
pub use guard::{GuardDecision, SubmissionGuard};
pub use navigator::Navigator;
pub use outcome::{MutationOutcome, MutationResult, Rejection, SubmitOutcome, SubmitResult};
pub use view::{SessionSnapshot, SessionView};
