//! Discovered backends.
//!
//! # Data Flow
//! ```text
//! discovery poll loop
//!     → endpoint.rs (one Endpoint per matching member tag)
//!     → set.rs (atomic swap of the published list)
//!     → config writer reads snapshot() from its own thread
//! ```
//!
//! # Design Decisions
//! - The published list is immutable; updates replace it wholesale
//! - Readers never observe a partially built list
//! - Endpoint ordering is total so lists can be compared by value

pub mod endpoint;
pub mod set;

pub use endpoint::{Endpoint, BACKUP_ANNOTATION};
pub use set::BackendSet;
