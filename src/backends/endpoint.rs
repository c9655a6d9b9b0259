//! Backend endpoint abstraction.

use std::fmt;

/// Annotation telling the load balancer to treat an endpoint as standby.
pub const BACKUP_ANNOTATION: &str = "backup";

/// A single discovered backend.
///
/// Field order defines the canonical sort order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Endpoint {
    /// Member name as reported by the gossip agent.
    pub name: String,
    pub host: String,
    pub port: String,
    /// Extra load balancer server options; empty or [`BACKUP_ANNOTATION`].
    pub extra_config: String,
}

impl Endpoint {
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port: port.into(),
            extra_config: String::new(),
        }
    }

    /// Attach an extra config token.
    pub fn with_extra_config(mut self, extra: impl Into<String>) -> Self {
        self.extra_config = extra.into();
        self
    }

    pub fn is_backup(&self) -> bool {
        self.extra_config == BACKUP_ANNOTATION
    }

    /// `host:port` form.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}:{}", self.name, self.host, self.port)?;
        if !self.extra_config.is_empty() {
            write!(f, " {}", self.extra_config)?;
        }
        Ok(())
    }
}
