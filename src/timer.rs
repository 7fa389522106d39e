use std::time::{Duration, SystemTime};

use log::debug;

use crate::session::SessionConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Session time limit reached.
    Finish,
    /// Periodic refill check is due.
    Refill,
}

/// The two timers of a running session: a one-shot deadline that ends the
/// session and a periodic refill poll. Both only fire while armed.
#[derive(Debug, Clone, Default)]
pub struct SessionTimers {
    finish_at: Option<SystemTime>,
    next_refill_poll: Option<SystemTime>,
    refill_interval: Duration,
}

impl SessionTimers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, config: &SessionConfig, started_at: SystemTime) {
        self.finish_at = Some(started_at + config.session_duration);
        self.next_refill_poll = Some(started_at + config.refill_poll_interval);
        self.refill_interval = config.refill_poll_interval;
        debug!(
            "timers armed: finish in {}s, refill poll every {}s",
            config.session_duration.as_secs(),
            config.refill_poll_interval.as_secs()
        );
    }

    pub fn disarm(&mut self) {
        if self.is_armed() {
            debug!("timers disarmed");
        }
        self.finish_at = None;
        self.next_refill_poll = None;
    }

    pub fn is_armed(&self) -> bool {
        self.finish_at.is_some() || self.next_refill_poll.is_some()
    }

    pub fn finish_at(&self) -> Option<SystemTime> {
        self.finish_at
    }

    /// Next event due at `now`, if any. Call repeatedly until `None` to
    /// drain everything that elapsed since the last poll. A due `Finish`
    /// wins over pending refills and disarms both timers.
    pub fn poll(&mut self, now: SystemTime) -> Option<TimerEvent> {
        if self.finish_at.is_some_and(|at| at <= now) {
            self.disarm();
            return Some(TimerEvent::Finish);
        }

        match self.next_refill_poll {
            Some(at) if at <= now && !self.refill_interval.is_zero() => {
                self.next_refill_poll = Some(at + self.refill_interval);
                Some(TimerEvent::Refill)
            }
            _ => None,
        }
    }
}
