//! Progress poll timer
//!
//! A deadline, not a task. The session arms it with the generation of the
//! resource it should poll; whoever drives the session sleeps until
//! [`PollTimer::deadline`] and then calls [`PollTimer::fire`]. Re-arming
//! replaces the previous deadline, so there is never more than one timer.

use crate::slot::Generation;
use std::time::Duration;
use tokio::time::Instant;

/// Shortest accepted poll period
const MIN_PERIOD: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    generation: Generation,
    deadline: Instant,
}

/// Single-shot-per-period poll timer
#[derive(Debug, Clone)]
pub struct PollTimer {
    period: Duration,
    armed: Option<Armed>,
}

impl PollTimer {
    /// Create a disarmed timer
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(MIN_PERIOD),
            armed: None,
        }
    }

    /// Poll period
    pub fn period(&self) -> Duration {
        self.period
    }

    /// Arm for `generation`, first firing one period from now
    pub fn start(&mut self, generation: Generation) {
        self.start_at(generation, Instant::now());
    }

    /// Arm for `generation`, first firing one period after `now`
    pub fn start_at(&mut self, generation: Generation, now: Instant) {
        self.armed = Some(Armed {
            generation,
            deadline: now + self.period,
        });
    }

    /// Disarm. Returns whether the timer was armed.
    pub fn stop(&mut self) -> bool {
        self.armed.take().is_some()
    }

    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Generation the timer was armed for
    pub fn generation(&self) -> Option<Generation> {
        self.armed.map(|armed| armed.generation)
    }

    /// Next firing instant
    pub fn deadline(&self) -> Option<Instant> {
        self.armed.map(|armed| armed.deadline)
    }

    /// Fire if due, rescheduling one period after `now`
    ///
    /// Missed periods are not replayed; a late fire simply delays the
    /// next one.
    pub fn fire(&mut self, now: Instant) -> Option<Generation> {
        let armed = self.armed.as_mut()?;
        if now < armed.deadline {
            return None;
        }
        armed.deadline = now + self.period;
        Some(armed.generation)
    }
}
