//! Clock abstraction for testable entry timestamps

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

/// A clock that provides the current wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

/// Manually driven clock. Clones share the same current time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<SystemTime>>,
}

impl ManualClock {
    pub fn new(start: SystemTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Clock reading `secs` seconds after the epoch
    pub fn at_secs(secs: u64) -> Self {
        Self::new(UNIX_EPOCH + Duration::from_secs(secs))
    }

    /// Advance the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        *self.current.lock() += duration;
    }

    /// Set the clock to a specific time
    pub fn set(&self, time: SystemTime) {
        *self.current.lock() = time;
    }

    pub fn set_secs(&self, secs: u64) {
        self.set(UNIX_EPOCH + Duration::from_secs(secs));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> SystemTime {
        *self.current.lock()
    }
}
