//! Cancellable one-shot timers driven by the host event loop.
//!
//! The queue never sleeps: the host asks for [`TimerQueue::next_deadline`],
//! wakes itself, and drains due handles with [`TimerQueue::pop_due`].

use std::collections::BTreeMap;
use std::time::Instant;

/// Handle returned by [`TimerQueue::schedule_at`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: BTreeMap<TimerHandle, Instant>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_at(&mut self, deadline: Instant) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.pending.insert(handle, deadline);
        handle
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.pending.remove(&handle).is_some()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Removes and returns every timer with `deadline <= now`, earliest first.
    pub fn pop_due(&mut self, now: Instant) -> Vec<TimerHandle> {
        let mut due: Vec<(Instant, TimerHandle)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(handle, deadline)| (*deadline, *handle))
            .collect();
        due.sort();

        for (_, handle) in &due {
            self.pending.remove(handle);
        }
        due.into_iter().map(|(_, handle)| handle).collect()
    }
}
