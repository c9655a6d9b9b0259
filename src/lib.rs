//! Backend discovery from a gossip agent's membership snapshot.

pub mod backends;
pub mod config;
pub mod discovery;
pub mod lifecycle;
pub mod observability;

pub use backends::{BackendSet, Endpoint};
pub use config::DiscoveryConfig;
pub use discovery::{SerfWatcher, ServiceWatcher};
pub use lifecycle::Shutdown;
