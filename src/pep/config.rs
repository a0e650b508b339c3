//! Coordinator configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::time::Duration;

/// Configuration of a [`PepCoordinator`](crate::pep::PepCoordinator).
///
/// With the `serde` feature, the configuration can be deserialized; missing fields
/// take default values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PepConfig {
    trustee_timeout: Duration,
    max_concurrent_runs: usize,
}

impl Default for PepConfig {
    fn default() -> Self {
        Self {
            trustee_timeout: Duration::from_secs(30),
            max_concurrent_runs: 4,
        }
    }
}

impl PepConfig {
    /// Sets the timeout for a single call to a blinding trustee. The default is 30 seconds.
    #[must_use]
    pub fn with_trustee_timeout(mut self, timeout: Duration) -> Self {
        self.trustee_timeout = timeout;
        self
    }

    /// Sets the maximum number of runs driven concurrently by
    /// [`PepCoordinator::run_many()`](crate::pep::PepCoordinator::run_many()). The default is 4;
    /// zero is treated as 1.
    #[must_use]
    pub fn with_max_concurrent_runs(mut self, limit: usize) -> Self {
        self.max_concurrent_runs = limit;
        self
    }

    /// Returns the timeout for a single call to a blinding trustee.
    pub fn trustee_timeout(&self) -> Duration {
        self.trustee_timeout
    }

    /// Returns the maximum number of concurrent runs.
    pub fn max_concurrent_runs(&self) -> usize {
        self.max_concurrent_runs.max(1)
    }
}
