//! Time sources for transaction ids and commit timestamps.
//!
//! Transaction ids are derived from the submission time, so two identical
//! transfers submitted within the same tick collide. Tests inject a
//! [`CounterClock`] to make ids reproducible and distinct.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub trait Clock: Send + Sync + Debug {
    /// Current tick. Units are up to the implementation.
    fn now(&self) -> u64;
}

/// Wall clock in nanoseconds since the Unix epoch.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default()
    }
}

/// Monotonic counter that returns `start`, `start + 1`, ... on each call.
#[derive(Debug, Default)]
pub struct CounterClock {
    next: AtomicU64,
}

impl CounterClock {
    pub fn new(start: u64) -> Self {
        Self {
            next: AtomicU64::new(start),
        }
    }
}

impl Clock for CounterClock {
    fn now(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}
