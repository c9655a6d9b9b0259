//! Watcher run state.
//!
//! # States
//! ```text
//! Idle → Polling → Idle → ...
//! any → Stopped (terminal)
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherStatus {
    Idle = 0,
    Polling = 1,
    Stopped = 2,
}

impl From<u8> for WatcherStatus {
    fn from(val: u8) -> Self {
        match val {
            1 => WatcherStatus::Polling,
            2 => WatcherStatus::Stopped,
            _ => WatcherStatus::Idle,
        }
    }
}

/// Status readable from other threads.
#[derive(Debug, Default)]
pub struct StatusCell(AtomicU8);

impl StatusCell {
    pub fn get(&self) -> WatcherStatus {
        WatcherStatus::from(self.0.load(Ordering::Acquire))
    }

    /// Set the status unless already stopped.
    pub fn set(&self, status: WatcherStatus) {
        let stopped = WatcherStatus::Stopped as u8;
        // Err means the watcher is already stopped.
        self.0
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |cur| {
                (cur != stopped).then_some(status as u8)
            })
            .ok();
    }

    pub fn stop(&self) {
        self.0.store(WatcherStatus::Stopped as u8, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopped_is_terminal() {
        let cell = StatusCell::default();
        assert_eq!(cell.get(), WatcherStatus::Idle);

        cell.set(WatcherStatus::Polling);
        assert_eq!(cell.get(), WatcherStatus::Polling);

        cell.stop();
        cell.set(WatcherStatus::Idle);
        assert_eq!(cell.get(), WatcherStatus::Stopped);
    }
}
