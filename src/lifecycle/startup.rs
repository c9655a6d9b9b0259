//! Startup orchestration.

use std::sync::Arc;

use crate::config::DiscoveryConfig;
use crate::discovery::{DiscoveryResult, Reconfigure, SerfWatcher, WatcherHandle};
use crate::lifecycle::Shutdown;

/// Build and spawn one watcher per configured service.
///
/// Watchers are all built before any is spawned, so a bad service aborts
/// startup without leaving loops running.
pub fn start_watchers(
    config: &DiscoveryConfig,
    shutdown: &Shutdown,
    notifier: Arc<dyn Reconfigure>,
) -> DiscoveryResult<Vec<WatcherHandle>> {
    let watchers = config
        .services
        .iter()
        .map(|service| SerfWatcher::from_config(service, notifier.clone()))
        .collect::<DiscoveryResult<Vec<_>>>()?;

    Ok(watchers
        .into_iter()
        .map(|watcher| {
            tracing::info!(
                service = %watcher.service(),
                "Starting serf watcher"
            );
            watcher.start(shutdown.subscribe())
        })
        .collect())
}
