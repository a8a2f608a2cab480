//! The per-context FSM timer (§3 "Timer", §9 "Timer re-arming").
//!
//! One logical timer slot per connection, distinct from the service
//! layer's per-invocation deadlines (§4.4): this one gates the
//! association/configuring/disassociating phases. Arming always replaces
//! whatever deadline was previously set — nothing here queues multiple
//! entries for the same context.

use std::time::{Duration, Instant};

#[derive(Debug, Default, Clone, Copy)]
pub struct Timer {
    deadline: Option<Instant>,
}

impl Timer {
    pub fn new() -> Self {
        Timer::default()
    }

    /// §3 `count_timeout`: arms (or re-arms) the single timer slot.
    pub fn count_timeout(&mut self, now: Instant, duration: Duration) {
        self.deadline = Some(now + duration);
    }

    /// §3 `reset_timeout`: cancels the timer.
    pub fn reset_timeout(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(d) if d <= now)
    }
}
