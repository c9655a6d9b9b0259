//! Backend discovery from a gossip membership snapshot.
//!
//! # Data Flow
//! ```text
//! tick (poll.rs, debounced)
//!     → snapshot.rs (mod time, then content)
//!     → change.rs (identical bytes? stop)
//!     → members.rs (validate & decode the untrusted document)
//!     → extract.rs (alive members, service tags, backup annotation, sort)
//!     → change.rs (identical endpoint list? stop)
//!     → BackendSet swap + notifier.rs signal
//! ```
//!
//! # Design Decisions
//! - Every failure is contained inside one poll
//! - Published lists are replaced atomically, never edited in place
//! - Time and file access sit behind traits so the loop can run on fakes

use std::sync::Arc;

use crate::backends::Endpoint;

pub mod change;
pub mod clock;
pub mod error;
pub mod extract;
pub mod members;
pub mod notifier;
pub mod poll;
pub mod snapshot;
pub mod state;

pub use clock::{Clock, SystemClock};
pub use error::{DiscoveryError, DiscoveryResult, ParseFailure};
pub use extract::EndpointExtractor;
pub use members::{parse_members, MemberRecord, MemberStatus};
pub use notifier::{ChannelNotifier, Reconfigure};
pub use poll::{DebounceSchedule, PollOutcome, SerfWatcher, WatcherHandle};
pub use snapshot::{FileSnapshot, SnapshotSource};
pub use state::WatcherStatus;

/// Contract shared by discovery strategies.
pub trait ServiceWatcher: Send + Sync {
    /// Name of the watched service.
    fn name(&self) -> &str;

    /// Currently published backends.
    fn backends(&self) -> Arc<Vec<Endpoint>>;

    fn status(&self) -> WatcherStatus;

    /// Stop watching. No further polls happen afterwards.
    fn stop(&self);
}
