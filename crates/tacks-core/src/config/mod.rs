//! Sync engine tuning knobs.
//!
//! Defaults match the production cadence: a 30-second background reload, a
//! 5-second drain delay, and a tighter timeout on the initial load so a cold
//! start fails fast instead of hanging the first paint.

use std::time::Duration;

/// Timing and retry configuration for the sync engine and scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// How often a background reload runs while the queue is empty
    pub reload_interval: Duration,
    /// Delay between the queue becoming non-empty and a drain pass
    pub drain_delay: Duration,
    /// Per-fetch timeout during the initial load
    pub initial_fetch_timeout: Duration,
    /// Per-fetch timeout during background reloads
    pub reload_fetch_timeout: Duration,
    /// Delivery attempts before a pending change is abandoned
    pub max_retries: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            reload_interval: Duration::from_secs(30),
            drain_delay: Duration::from_secs(5),
            initial_fetch_timeout: Duration::from_secs(15),
            reload_fetch_timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }
}

impl SyncSettings {
    /// Set the background reload interval
    #[must_use]
    pub const fn with_reload_interval(mut self, interval: Duration) -> Self {
        self.reload_interval = interval;
        self
    }

    /// Set the delay before a drain pass runs
    #[must_use]
    pub const fn with_drain_delay(mut self, delay: Duration) -> Self {
        self.drain_delay = delay;
        self
    }

    /// Set both fetch timeouts at once
    #[must_use]
    pub const fn with_fetch_timeouts(mut self, initial: Duration, reload: Duration) -> Self {
        self.initial_fetch_timeout = initial;
        self.reload_fetch_timeout = reload;
        self
    }

    /// Set the retry ceiling for pending changes
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}
