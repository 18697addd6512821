//! Time sources for the ledger and the coordinator timers.
//!
//! # Responsibility
//! - Provide wall-clock epoch seconds for persisted launch timestamps.
//! - Provide a monotonic instant for cancellable timers.
//!
//! # Invariants
//! - `ManualClock` only moves when told to; both readings advance together.

use std::cell::Cell;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Time source shared by stores and the coordinator.
pub trait Clock {
    /// Wall-clock Unix epoch seconds.
    fn epoch_secs(&self) -> i64;
    /// Monotonic instant for deadlines.
    fn instant(&self) -> Instant;
}

/// Operating-system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_secs(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            // Clock set before 1970; treat as epoch.
            Err(_) => 0,
        }
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }
}

/// Explicitly driven clock for tests and hosts that own their time base.
///
/// Epoch seconds are derived from total elapsed time, so sub-second steps
/// accumulate into whole seconds.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    elapsed: Cell<Duration>,
    epoch_base: Cell<i64>,
    /// `elapsed` at the moment `epoch_base` was set.
    base_elapsed: Cell<Duration>,
}

impl ManualClock {
    /// Starts the clock at `epoch_secs` wall-clock time.
    pub fn new(epoch_secs: i64) -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Cell::new(Duration::ZERO),
            epoch_base: Cell::new(epoch_secs),
            base_elapsed: Cell::new(Duration::ZERO),
        }
    }

    /// Moves both readings forward by `step`.
    pub fn advance(&self, step: Duration) {
        self.elapsed.set(self.elapsed.get().saturating_add(step));
    }

    /// Jumps the wall-clock reading without touching the monotonic one.
    pub fn set_epoch_secs(&self, epoch_secs: i64) {
        self.epoch_base.set(epoch_secs);
        self.base_elapsed.set(self.elapsed.get());
    }
}

impl Clock for ManualClock {
    fn epoch_secs(&self) -> i64 {
        let since_base = self.elapsed.get().saturating_sub(self.base_elapsed.get());
        let secs = i64::try_from(since_base.as_secs()).unwrap_or(i64::MAX);
        self.epoch_base.get().saturating_add(secs)
    }

    fn instant(&self) -> Instant {
        self.origin + self.elapsed.get()
    }
}
