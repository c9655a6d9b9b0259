//! Wall-clock access for the poll loop.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::discovery::error::{DiscoveryError, DiscoveryResult};

/// Source of the current time in whole seconds since the unix epoch.
pub trait Clock: Send + Sync {
    fn now_secs(&self) -> DiscoveryResult<u64>;
}

/// The system wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> DiscoveryResult<u64> {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .map_err(|e| DiscoveryError::Clock(e.to_string()))
    }
}
