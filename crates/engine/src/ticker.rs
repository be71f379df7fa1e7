//! Tokio driver that pumps one tick per second into a shared session.
//!
//! The engine itself owns no timer; this is the one piece of autonomous
//! execution, and it is owned per session rather than ambient. Stopping is
//! explicit (`stop`, or dropping the ticker), and a tick that lands after the
//! session already went terminal is absorbed by the submission guard's
//! idempotence, so a dangling timer can never re-submit.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::session::{SessionController, SessionView};

/// A session shared between the UI task and the ticker task.
pub type SharedSession = Arc<Mutex<SessionController>>;

/// Handle to the per-session tick task.
pub struct SessionTicker {
    handle: JoinHandle<()>,
}

impl SessionTicker {
    /// Spawns the tick loop. `on_view` receives the fresh view produced by
    /// every tick, countdown refreshes included; the loop ends on its own
    /// once the session turns terminal.
    #[must_use]
    pub fn spawn<F>(session: SharedSession, mut on_view: F) -> Self
    where
        F: FnMut(SessionView) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval(Duration::from_secs(1));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; skip it so the
            // loop fires on whole-second boundaries after spawn.
            interval.tick().await;

            loop {
                interval.tick().await;
                let view = {
                    let mut session = session.lock().await;
                    session.tick()
                };
                let terminal = view.status.is_terminal();
                on_view(view);
                if terminal {
                    break;
                }
            }
        });
        Self { handle }
    }

    /// Spawns the tick loop without a view observer.
    #[must_use]
    pub fn spawn_silent(session: SharedSession) -> Self {
        Self::spawn(session, |_| {})
    }

    /// Stops ticking. Idempotent; also runs on drop.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Whether the tick task has ended (stopped, or session went terminal).
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for SessionTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
