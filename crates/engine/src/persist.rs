//! Collaborator seams for draft persistence and final submission.
//!
//! The engine is fire-and-forget at this boundary: it hands data over and
//! never awaits, retries, or inspects a result. Scheduling (debounce, fixed
//! interval) and retry policy belong to the implementation behind the trait.

use std::sync::{Arc, Mutex};

use assess_core::model::SubmissionRecord;

use crate::session::SessionSnapshot;

/// Receives `(snapshot, is_final)` on every dirty pulse and once more, with
/// `is_final = true`, at the terminal transition.
pub trait AutosaveSink: Send + Sync {
    fn save(&self, snapshot: &SessionSnapshot, is_final: bool);
}

/// Receives the final submission record exactly once, at the moment the
/// session enters `Submitted` or `Expired`.
pub trait SubmissionSink: Send + Sync {
    fn submit(&self, record: &SubmissionRecord);
}

/// Autosave sink that drops everything. For embedders that only care about
/// the final submission.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAutosave;

impl AutosaveSink for NullAutosave {
    fn save(&self, _snapshot: &SessionSnapshot, _is_final: bool) {}
}

#[derive(Debug, Default)]
struct Recorded {
    saves: Vec<(SessionSnapshot, bool)>,
    submissions: Vec<SubmissionRecord>,
}

/// In-memory sink recording everything it receives. Implements both
/// collaborator traits; used throughout the tests and handy for embedders
/// wiring the engine up before real transports exist.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All `(snapshot, is_final)` pairs received so far.
    #[must_use]
    pub fn saves(&self) -> Vec<(SessionSnapshot, bool)> {
        self.inner.lock().map(|r| r.saves.clone()).unwrap_or_default()
    }

    /// All submission records received so far.
    #[must_use]
    pub fn submissions(&self) -> Vec<SubmissionRecord> {
        self.inner
            .lock()
            .map(|r| r.submissions.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|r| r.saves.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn submission_count(&self) -> usize {
        self.inner.lock().map(|r| r.submissions.len()).unwrap_or(0)
    }
}

impl AutosaveSink for RecordingSink {
    fn save(&self, snapshot: &SessionSnapshot, is_final: bool) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.saves.push((snapshot.clone(), is_final));
        }
    }
}

impl SubmissionSink for RecordingSink {
    fn submit(&self, record: &SubmissionRecord) {
        if let Ok(mut recorded) = self.inner.lock() {
            recorded.submissions.push(record.clone());
        }
    }
}
