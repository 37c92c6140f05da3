//! Stopping conditions for a polling session
//!
//! Polling stops once the issued-query counter reaches its limit or the
//! wall clock reaches the deadline, whichever comes first. Evaluating the
//! predicate never moves the counter; the client records each successful
//! query explicitly.

use crate::clock::{system_clock, SharedClock};
use chrono::{DateTime, Local};
use std::fmt;
use std::time::Duration;

/// Query-count and deadline limits for a polling loop
#[derive(Clone)]
pub struct EndConditions {
    query_count: u64,
    max_queries: Option<u64>,
    deadline: Option<DateTime<Local>>,
    clock: SharedClock,
}

impl EndConditions {
    /// Create conditions with no limits
    ///
    /// Without limits [`EndConditions::should_continue`] is always true.
    pub fn new() -> Self {
        Self {
            query_count: 0,
            max_queries: None,
            deadline: None,
            clock: system_clock(),
        }
    }

    /// Stop once `max` queries have been recorded
    #[must_use]
    pub fn with_max_queries(mut self, max: u64) -> Self {
        self.max_queries = Some(max);
        self
    }

    /// Stop once the clock reaches `deadline`
    #[must_use]
    pub fn with_deadline(mut self, deadline: impl Into<DateTime<Local>>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    /// Stop once `limit` has elapsed from now
    ///
    /// The deadline is fixed against the clock configured at call time, so
    /// set a custom clock first. A limit past the representable range of
    /// dates leaves the deadline unset.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        let now = self.clock.now();
        self.deadline = chrono::Duration::from_std(limit)
            .ok()
            .and_then(|limit| now.checked_add_signed(limit));
        self
    }

    /// Read time from `clock` instead of the system clock
    #[must_use]
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    /// Check whether polling should go on
    pub fn should_continue(&self) -> bool {
        if let Some(max) = self.max_queries {
            if self.query_count >= max {
                return false;
            }
        }

        if let Some(deadline) = self.deadline {
            if self.clock.now() >= deadline {
                return false;
            }
        }

        true
    }

    /// Record one issued query
    pub fn record_query(&mut self) {
        self.query_count = self.query_count.saturating_add(1);
    }

    /// Number of queries recorded so far
    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    /// Configured query limit
    pub fn max_queries(&self) -> Option<u64> {
        self.max_queries
    }

    /// Configured deadline
    pub fn deadline(&self) -> Option<DateTime<Local>> {
        self.deadline
    }
}

impl Default for EndConditions {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EndConditions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndConditions")
            .field("query_count", &self.query_count)
            .field("max_queries", &self.max_queries)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
