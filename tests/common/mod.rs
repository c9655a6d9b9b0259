//! Shared utilities for integration tests.

use std::fs::{self, File};
use std::path::Path;
use std::time::{Duration, UNIX_EPOCH};

use serde_json::{json, Map};
use serf_discovery::config::ServiceConfig;
use tokio::sync::mpsc;

/// Write a membership snapshot and stamp it with `mtime` seconds.
pub fn write_snapshot(path: &Path, content: &str, mtime: u64) {
    fs::write(path, content).unwrap();
    let file = File::options().write(true).open(path).unwrap();
    file.set_modified(UNIX_EPOCH + Duration::from_secs(mtime)).unwrap();
}

/// Snapshot document with alive members `(name, tag, host:port)`.
pub fn members_json(members: &[(&str, &str, &str)]) -> String {
    let members: Vec<_> = members
        .iter()
        .map(|(name, tag, addr)| {
            let mut tags = Map::new();
            tags.insert(tag.to_string(), json!(addr));
            json!({
                "name": name,
                "status": "alive",
                "tags": tags,
            })
        })
        .collect();
    json!({ "members": members }).to_string()
}

/// Service config polling `path` quickly.
pub fn fast_service(name: &str, path: &Path) -> ServiceConfig {
    let mut config = ServiceConfig::named(name);
    config.discovery.path = path.to_string_lossy().into_owned();
    config.discovery.cycle_delay_ms = 10;
    config
}

/// Wait for the next reconfiguration signal.
pub async fn next_signal(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("no reconfiguration signal within 5s")
        .expect("notifier dropped")
}

/// Assert no reconfiguration signal arrives for a while.
#[allow(dead_code)]
pub async fn assert_quiet(rx: &mut mpsc::UnboundedReceiver<String>) {
    let res = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(res.is_err(), "unexpected reconfiguration signal: {:?}", res);
}
