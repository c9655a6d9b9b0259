//! Membership snapshot access.
//!
//! # Responsibilities
//! - Report the snapshot's modification time (whole seconds)
//! - Read the snapshot's full content on demand
//!
//! # Design Decisions
//! - Reads are synchronous; the snapshot is a small file on tmpfs
//! - A missing file is a transient error, not a fatal one

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::discovery::error::{DiscoveryError, DiscoveryResult};

/// Source of the membership snapshot.
pub trait SnapshotSource: Send + Sync {
    /// Modification time in seconds since the unix epoch.
    fn mod_time(&self) -> DiscoveryResult<u64>;

    /// Full byte content.
    fn read(&self) -> DiscoveryResult<Vec<u8>>;
}

/// Snapshot written by the gossip agent at a fixed path.
#[derive(Debug, Clone)]
pub struct FileSnapshot {
    path: PathBuf,
}

impl FileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> DiscoveryError {
        DiscoveryError::Snapshot {
            path: self.path.clone(),
            source,
        }
    }
}

impl SnapshotSource for FileSnapshot {
    fn mod_time(&self) -> DiscoveryResult<u64> {
        let modified = fs::metadata(&self.path)
            .and_then(|meta| meta.modified())
            .map_err(|e| self.io_error(e))?;

        // Files stamped before the epoch are treated as "never changed".
        Ok(modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0))
    }

    fn read(&self) -> DiscoveryResult<Vec<u8>> {
        fs::read(&self.path).map_err(|e| self.io_error(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_reads_content_and_mod_time() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"members": []}"#).unwrap();

        let snapshot = FileSnapshot::new(file.path());
        assert_eq!(snapshot.read().unwrap(), br#"{"members": []}"#.to_vec());

        let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs();
        let mtime = snapshot.mod_time().unwrap();
        assert!(mtime > 0);
        assert!(mtime <= now + 1);
    }

    #[test]
    fn test_missing_file_is_snapshot_error() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = FileSnapshot::new(dir.path().join("serf_members.json"));

        match snapshot.mod_time() {
            Err(DiscoveryError::Snapshot { source, .. }) => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected snapshot error, got {:?}", other),
        }
        assert!(snapshot.read().is_err());
    }
}
