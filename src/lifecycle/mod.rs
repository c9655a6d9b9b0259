//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build one watcher per service → Spawn poll loops
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Broadcast to watchers → Loops exit at next tick → Join
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Trigger shutdown
//! ```
//!
//! # Design Decisions
//! - Fail fast: a watcher that cannot be built aborts startup
//! - Shutdown does not flush or persist watcher state

pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
