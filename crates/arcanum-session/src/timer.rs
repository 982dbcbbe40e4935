//! Virtual-time timer queue.
//!
//! Deadlines are offsets from an arbitrary origin, so the same queue serves
//! the tokio runtime (which maps offsets onto `tokio::time::Instant`) and
//! tests that advance a fake clock by hand.

use std::time::Duration;

use crate::event::{SessionEvent, Timer};

#[derive(Debug, Clone)]
struct PendingTimer {
    deadline: Duration,
    seq: u64,
    timer: Timer,
    epoch: u64,
}

/// Pending session timers, ordered by deadline then by scheduling order.
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    pending: Vec<PendingTimer>,
    next_seq: u64,
}

impl TimerQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `timer` to fire `delay` after `now`, tagged with `epoch`.
    pub fn schedule(&mut self, now: Duration, timer: Timer, delay: Duration, epoch: u64) {
        let entry = PendingTimer {
            deadline: now + delay,
            seq: self.next_seq,
            timer,
            epoch,
        };
        self.next_seq += 1;

        let at = self
            .pending
            .partition_point(|p| (p.deadline, p.seq) <= (entry.deadline, entry.seq));
        self.pending.insert(at, entry);
    }

    /// Drop every pending timer.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// The earliest deadline, if any timer is pending.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.first().map(|p| p.deadline)
    }

    /// Remove and return the earliest timer whose deadline is at or before
    /// `now`, as the event to feed the session.
    pub fn pop_due(&mut self, now: Duration) -> Option<SessionEvent> {
        if self.pending.first()?.deadline > now {
            return None;
        }
        let due = self.pending.remove(0);
        Some(SessionEvent::TimerFired {
            timer: due.timer,
            epoch: due.epoch,
        })
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no timers are pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
