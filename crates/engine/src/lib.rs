#![forbid(unsafe_code)]

pub mod error;
pub mod persist;
pub mod session;
pub mod ticker;

pub use assess_core::Clock;

pub use error::BootstrapError;
pub use persist::{AutosaveSink, NullAutosave, RecordingSink, SubmissionSink};
pub use session::{
    MutationOutcome, MutationResult, Rejection, SessionBootstrap, SessionController,
    SessionSnapshot, SessionView, SubmitOutcome, SubmitResult, TimeRemaining,
};
pub use ticker::{SessionTicker, SharedSession};
