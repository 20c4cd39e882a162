use std::time::{Duration, SystemTime};

/// Repeating display timer for a round.
///
/// The timer does not own a thread. The event loop calls [`RoundTimer::poll`]
/// on every tick and the timer reports whether a period boundary has passed.
/// Cancelling clears the next deadline, so a poll after a reset never fires
/// for the superseded round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTimer {
    period: Duration,
    next_due: Option<SystemTime>,
}

impl RoundTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            next_due: None,
        }
    }

    pub fn every_second() -> Self {
        Self::new(Duration::from_secs(1))
    }

    pub fn arm(&mut self, now: SystemTime) {
        self.next_due = Some(now + self.period);
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    /// Returns true when at least one period elapsed since the last firing.
    /// Missed periods collapse into a single firing.
    pub fn poll(&mut self, now: SystemTime) -> bool {
        let Some(mut due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }
        while due <= now {
            due += self.period;
        }
        self.next_due = Some(due);
        true
    }
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self::every_second()
    }
}
