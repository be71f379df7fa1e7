mod answer;
mod ids;
mod question;
mod status;

pub use answer::AnswerValue;
pub use ids::{AttemptId, ParseIdError, QuestionId};
pub use question::{CatalogError, Question, QuestionCatalog, QuestionKind};
pub use status::{RecordError, SessionStatus, SubmissionRecord, SubmitReason};
