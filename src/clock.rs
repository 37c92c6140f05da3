//! Wall-clock access
//!
//! Deadlines and `{date}` expansion both read time through [`Clock`] so
//! they can be pinned in tests.

use chrono::{DateTime, Local};
use std::sync::{Arc, Mutex};

/// Source of the current wall-clock time
pub trait Clock: Send + Sync {
    /// Read the current local time
    fn now(&self) -> DateTime<Local>;
}

/// The system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that reads whatever it was last set to
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl FixedClock {
    /// Create a clock pinned at `now`
    pub fn new(now: impl Into<DateTime<Local>>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now.into())),
        }
    }

    /// Move the clock to `now`
    ///
    /// Clones share the same reading, so a clone handed to a component can
    /// be moved from the outside.
    pub fn set(&self, now: impl Into<DateTime<Local>>) {
        let mut guard = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = now.into();
    }

    /// Advance the clock by `delta`
    pub fn advance(&self, delta: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// The default shared clock
pub fn system_clock() -> SharedClock {
    Arc::new(SystemClock)
}
