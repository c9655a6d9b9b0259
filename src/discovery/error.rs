//! Discovery error definitions.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a single poll of the membership snapshot.
///
/// None of these are fatal to the watcher; the poll loop logs them and
/// retries on the next tick.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The snapshot file is missing or unreadable.
    #[error("cannot read membership snapshot {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The wall clock is before the unix epoch.
    #[error("system clock error: {0}")]
    Clock(String),

    /// The service name cannot be turned into a tag pattern.
    #[error("invalid service name {service:?}: {source}")]
    InvalidService {
        service: String,
        #[source]
        source: regex::Error,
    },
}

impl DiscoveryError {
    /// Short label used as a metrics dimension.
    pub fn kind(&self) -> &'static str {
        match self {
            DiscoveryError::Snapshot { .. } => "snapshot_io",
            DiscoveryError::Clock(_) => "clock",
            DiscoveryError::InvalidService { .. } => "invalid_service",
        }
    }
}

/// Reasons a membership document is rejected.
///
/// A rejected document means "no usable members" for this poll.
#[derive(Debug, Error)]
pub enum ParseFailure {
    #[error("snapshot is not valid JSON: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("snapshot root is not an object")]
    NotAnObject,

    #[error("snapshot has no `members` field")]
    MissingMembers,

    #[error("snapshot `members` field is not a list")]
    MembersNotAList,
}

/// Result type for discovery operations.
pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DiscoveryError::Snapshot {
            path: PathBuf::from("/dev/shm/serf_members.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/dev/shm/serf_members.json"));
        assert_eq!(err.kind(), "snapshot_io");

        assert_eq!(
            ParseFailure::MembersNotAList.to_string(),
            "snapshot `members` field is not a list"
        );
    }
}
