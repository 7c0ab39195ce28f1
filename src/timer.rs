//! Single-slot deferred actions.
//!
//! The coordinator thread owns every slot and polls them with the current
//! time, so a timer is just a deadline plus the payload to act on. Arming a
//! slot always cancels whatever it held.

use std::time::Instant;

#[derive(Debug)]
struct Pending<T> {
    deadline: Instant,
    payload: T,
}

#[derive(Debug)]
pub struct TimerSlot<T> {
    name: &'static str,
    pending: Option<Pending<T>>,
}

impl<T> TimerSlot<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            pending: None,
        }
    }

    pub fn arm(&mut self, deadline: Instant, payload: T) {
        self.cancel();
        tracing::debug!(timer = self.name, "armed");
        self.pending = Some(Pending { deadline, payload });
    }

    /// Returns `true` if something was pending.
    pub fn cancel(&mut self) -> bool {
        let cancelled = self.pending.take().is_some();
        if cancelled {
            tracing::debug!(timer = self.name, "cancelled");
        }
        cancelled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|pending| pending.deadline)
    }

    /// Fire the slot if its deadline has passed.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.pending.as_ref() {
            Some(pending) if now >= pending.deadline => {
                tracing::debug!(timer = self.name, "fired");
                self.pending.take().map(|pending| pending.payload)
            }
            _ => None,
        }
    }
}
