use chrono::{DateTime, Utc};

/// Remaining time for a session, in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRemaining {
    /// No deadline was set for this session.
    Unlimited,
    /// Seconds left until the deadline; never negative.
    Seconds(u64),
}

impl TimeRemaining {
    /// Whether time has fully run out. Always false for `Unlimited`.
    #[must_use]
    pub fn is_out(self) -> bool {
        matches!(self, TimeRemaining::Seconds(0))
    }

    /// Seconds left, or `None` for `Unlimited`.
    #[must_use]
    pub fn as_seconds(self) -> Option<u64> {
        match self {
            TimeRemaining::Unlimited => None,
            TimeRemaining::Seconds(s) => Some(s),
        }
    }
}

/// Derives remaining time from a fixed absolute deadline and a sampled "now".
///
/// The clock itself holds no timer; a driver samples time and calls
/// `poll_expiry` once per tick. Expiry is edge-triggered: `poll_expiry`
/// reports it exactly once, the first time remaining reaches zero, so the
/// submission guard can never be fired twice by the same deadline.
#[derive(Debug, Clone)]
pub struct DeadlineClock {
    deadline_at: Option<DateTime<Utc>>,
    expiry_signalled: bool,
}

impl DeadlineClock {
    /// `None` means unlimited time; the clock then never signals expiry.
    #[must_use]
    pub fn new(deadline_at: Option<DateTime<Utc>>) -> Self {
        Self {
            deadline_at,
            expiry_signalled: false,
        }
    }

    #[must_use]
    pub fn deadline_at(&self) -> Option<DateTime<Utc>> {
        self.deadline_at
    }

    /// `max(0, deadline_at - now)` in whole seconds, or `Unlimited`.
    #[must_use]
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeRemaining {
        match self.deadline_at {
            None => TimeRemaining::Unlimited,
            Some(deadline) => {
                let secs = (deadline - now).num_seconds().max(0);
                // num_seconds() is non-negative after the clamp above.
                TimeRemaining::Seconds(secs.unsigned_abs())
            }
        }
    }

    /// Returns true exactly once, the first evaluation at which remaining
    /// time is zero. A deadline already in the past reports expiry on the
    /// very first call, before any tick is scheduled.
    pub fn poll_expiry(&mut self, now: DateTime<Utc>) -> bool {
        if self.expiry_signalled {
            return false;
        }
        if self.remaining(now).is_out() {
            self.expiry_signalled = true;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assess_core::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn unlimited_clock_never_expires() {
        let mut clock = DeadlineClock::new(None);
        let now = fixed_now();
        assert_eq!(clock.remaining(now), TimeRemaining::Unlimited);
        assert!(!clock.poll_expiry(now + Duration::days(365)));
    }

    #[test]
    fn remaining_counts_down_and_clamps_at_zero() {
        let now = fixed_now();
        let clock = DeadlineClock::new(Some(now + Duration::seconds(90)));

        assert_eq!(clock.remaining(now), TimeRemaining::Seconds(90));
        assert_eq!(
            clock.remaining(now + Duration::seconds(89)),
            TimeRemaining::Seconds(1)
        );
        assert_eq!(
            clock.remaining(now + Duration::seconds(500)),
            TimeRemaining::Seconds(0)
        );
    }

    #[test]
    fn expiry_fires_exactly_once() {
        let now = fixed_now();
        let mut clock = DeadlineClock::new(Some(now + Duration::seconds(2)));

        assert!(!clock.poll_expiry(now));
        assert!(!clock.poll_expiry(now + Duration::seconds(1)));
        assert!(clock.poll_expiry(now + Duration::seconds(2)));
        // Later ticks stay silent; the edge already fired.
        assert!(!clock.poll_expiry(now + Duration::seconds(3)));
        assert!(!clock.poll_expiry(now + Duration::seconds(60)));
    }

    #[test]
    fn past_deadline_expires_on_first_evaluation() {
        let now = fixed_now();
        let mut clock = DeadlineClock::new(Some(now - Duration::seconds(10)));
        assert!(clock.poll_expiry(now));
        assert!(!clock.poll_expiry(now));
    }
}
