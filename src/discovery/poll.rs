//! Debounced poll loop over the membership snapshot.
//!
//! # Responsibilities
//! - Decide each tick whether the snapshot must be re-read
//! - Run read → parse → extract → change detection
//! - Publish the new backend list and signal reconfiguration
//!
//! # Coarse timestamps
//! Modification times only have second resolution. A write landing in the
//! same second as an earlier read leaves the timestamp unchanged, so one
//! extra read is forced once the recheck window after a change has passed.
//!
//! # Design Decisions
//! - One task per watcher; polls never overlap
//! - A failed poll is logged and retried on the next tick
//! - Discovery yielding nothing falls back to the default servers, or keeps
//!   the previous list when there are none

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::backends::{BackendSet, Endpoint};
use crate::config::ServiceConfig;
use crate::discovery::change::ChangeDetector;
use crate::discovery::clock::{Clock, SystemClock};
use crate::discovery::error::DiscoveryResult;
use crate::discovery::extract::EndpointExtractor;
use crate::discovery::members::parse_members;
use crate::discovery::notifier::Reconfigure;
use crate::discovery::snapshot::{FileSnapshot, SnapshotSource};
use crate::discovery::state::{StatusCell, WatcherStatus};
use crate::discovery::ServiceWatcher;
use crate::observability::metrics;

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Snapshot not due for a re-read.
    Skipped,
    /// Snapshot bytes identical to the last processed content.
    ContentUnchanged,
    /// Extracted list identical to the last one.
    EndpointsUnchanged,
    /// New discovered list published.
    Published,
    /// Default servers published.
    FellBack,
    /// Nothing to publish; previous list kept.
    Retained,
}

impl PollOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollOutcome::Skipped => "skipped",
            PollOutcome::ContentUnchanged => "content_unchanged",
            PollOutcome::EndpointsUnchanged => "endpoints_unchanged",
            PollOutcome::Published => "published",
            PollOutcome::FellBack => "fell_back",
            PollOutcome::Retained => "retained",
        }
    }
}

/// When to read the snapshot.
#[derive(Debug, Clone)]
pub struct DebounceSchedule {
    recheck_window: u64,
    last_mod_time: u64,
    last_poll_time: u64,
}

impl DebounceSchedule {
    pub fn new(recheck_window: u64) -> Self {
        Self {
            recheck_window,
            last_mod_time: 0,
            last_poll_time: 0,
        }
    }

    /// Due when the file visibly changed, or when no poll has happened
    /// since the recheck deadline of the last change and that deadline has
    /// passed.
    pub fn is_due(&self, ctime: u64, now: u64) -> bool {
        let deadline = ctime.saturating_add(self.recheck_window);
        ctime > self.last_mod_time || (self.last_poll_time < deadline && now > deadline)
    }

    pub fn mark_triggered(&mut self, ctime: u64) {
        self.last_mod_time = ctime;
    }

    pub fn mark_polled(&mut self, now: u64) {
        self.last_poll_time = now;
    }
}

/// Backend discovery from the gossip agent's membership snapshot.
pub struct SerfWatcher {
    service: String,
    extractor: EndpointExtractor,
    source: Arc<dyn SnapshotSource>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Reconfigure>,
    backends: Arc<BackendSet>,
    default_backends: Arc<Vec<Endpoint>>,
    status: Arc<StatusCell>,
    cycle_delay: Duration,
    schedule: DebounceSchedule,
    changes: ChangeDetector,
}

impl SerfWatcher {
    /// Create a watcher reading `source` with the given clock.
    pub fn new(
        config: &ServiceConfig,
        source: Arc<dyn SnapshotSource>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Reconfigure>,
    ) -> DiscoveryResult<Self> {
        let extractor = EndpointExtractor::new(
            &config.name,
            config.haproxy.all_backups_except_one.clone(),
        )?;
        let default_backends = Arc::new(config.default_endpoints());

        Ok(Self {
            service: config.name.clone(),
            extractor,
            source,
            clock,
            notifier,
            backends: Arc::new(BackendSet::new(default_backends.to_vec())),
            default_backends,
            status: Arc::new(StatusCell::default()),
            cycle_delay: Duration::from_millis(config.discovery.cycle_delay_ms),
            schedule: DebounceSchedule::new(config.discovery.recheck_window_secs),
            changes: ChangeDetector::new(),
        })
    }

    /// Create a watcher on the configured snapshot path and the system clock.
    pub fn from_config(config: &ServiceConfig, notifier: Arc<dyn Reconfigure>) -> DiscoveryResult<Self> {
        Self::new(
            config,
            Arc::new(FileSnapshot::new(&config.discovery.path)),
            Arc::new(SystemClock),
            notifier,
        )
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Published backend list, shared with readers on other threads.
    pub fn backends(&self) -> Arc<BackendSet> {
        self.backends.clone()
    }

    pub fn status(&self) -> WatcherStatus {
        self.status.get()
    }

    /// Run one tick: check the schedule and discover when due.
    pub fn tick(&mut self) -> DiscoveryResult<PollOutcome> {
        let ctime = self.source.mod_time()?;
        let now = self.clock.now_secs()?;

        if !self.schedule.is_due(ctime, now) {
            return Ok(PollOutcome::Skipped);
        }
        self.schedule.mark_triggered(ctime);
        self.discover(now)
    }

    /// Read the snapshot and publish its endpoints if they changed.
    pub fn discover(&mut self, now: u64) -> DiscoveryResult<PollOutcome> {
        tracing::info!(service = %self.service, "Discovering backends");
        self.schedule.mark_polled(now);

        let raw = self.source.read()?;
        if !self.changes.observe_content(&raw) {
            return Ok(PollOutcome::ContentUnchanged);
        }

        match parse_members(&raw) {
            Ok(members) => {
                let endpoints = self.extractor.extract(&members);
                if !self.changes.observe_endpoints(&endpoints) {
                    tracing::info!(
                        service = %self.service,
                        "Membership returned identical results - not reconfiguring"
                    );
                    return Ok(PollOutcome::EndpointsUnchanged);
                }
                Ok(self.publish(endpoints))
            }
            Err(failure) => {
                tracing::info!(
                    service = %self.service,
                    error = %failure,
                    "Membership snapshot rejected"
                );
                metrics::record_discovery_error(&self.service, "parse");
                Ok(self.fall_back())
            }
        }
    }

    fn publish(&mut self, endpoints: Vec<Endpoint>) -> PollOutcome {
        if endpoints.is_empty() {
            return self.fall_back();
        }

        tracing::info!(
            service = %self.service,
            backends = endpoints.len(),
            "Discovered backends"
        );
        self.backends.replace(endpoints);
        self.signal_change();
        PollOutcome::Published
    }

    /// Publish the default servers, or keep the previous list without them.
    ///
    /// While defaults are live the stored signature is cleared, so the next
    /// discovered list is published even if it matches the one before.
    fn fall_back(&mut self) -> PollOutcome {
        if self.default_backends.is_empty() {
            tracing::warn!(
                service = %self.service,
                previous = self.backends.len(),
                "No backends and no default servers; using previous backends"
            );
            return PollOutcome::Retained;
        }

        self.changes.invalidate_endpoints();
        if *self.backends.snapshot() == *self.default_backends {
            tracing::debug!(service = %self.service, "Default servers already published");
            return PollOutcome::FellBack;
        }

        tracing::warn!(
            service = %self.service,
            defaults = self.default_backends.len(),
            "No backends; using default servers"
        );
        self.backends.replace_shared(self.default_backends.clone());
        self.signal_change();
        PollOutcome::FellBack
    }

    fn signal_change(&self) {
        metrics::record_backend_count(&self.service, self.backends.len());
        metrics::record_reconfiguration(&self.service);
        self.notifier.reconfigure(&self.service);
    }

    /// Tick with error containment; a failed poll never ends the loop.
    fn poll(&mut self) {
        self.status.set(WatcherStatus::Polling);
        match self.tick() {
            Ok(outcome) => metrics::record_poll(&self.service, outcome.as_str()),
            Err(e) => {
                tracing::warn!(service = %self.service, error = %e, "Error in watcher poll");
                metrics::record_discovery_error(&self.service, e.kind());
            }
        }
        self.status.set(WatcherStatus::Idle);
    }

    /// Run the loop until a shutdown signal arrives.
    pub async fn run(mut self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(
            service = %self.service,
            cycle_delay_ms = self.cycle_delay.as_millis() as u64,
            "Serf watcher starting"
        );

        let mut ticker = time::interval(self.cycle_delay.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll();
                }
                _ = shutdown.recv() => {
                    tracing::info!(service = %self.service, "Serf watcher received shutdown signal");
                    break;
                }
            }
        }

        self.status.stop();
        tracing::info!(service = %self.service, "Serf watcher exited successfully");
    }

    /// Spawn the loop on the tokio runtime.
    pub fn start(self, shutdown: broadcast::Receiver<()>) -> WatcherHandle {
        let service = self.service.clone();
        let backends = self.backends.clone();
        let status = self.status.clone();
        let task = tokio::spawn(self.run(shutdown));
        WatcherHandle {
            service,
            backends,
            status,
            task,
        }
    }
}

/// Handle on a running watcher.
pub struct WatcherHandle {
    service: String,
    backends: Arc<BackendSet>,
    status: Arc<StatusCell>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Shared published list, for readers that keep it around.
    pub fn backend_set(&self) -> Arc<BackendSet> {
        self.backends.clone()
    }

    /// Wait for the loop to exit.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                tracing::error!(service = %self.service, error = %e, "Serf watcher task failed");
            }
        }
        self.status.stop();
    }
}

impl ServiceWatcher for WatcherHandle {
    fn name(&self) -> &str {
        &self.service
    }

    fn backends(&self) -> Arc<Vec<Endpoint>> {
        self.backends.snapshot()
    }

    fn status(&self) -> WatcherStatus {
        self.status.get()
    }

    fn stop(&self) {
        self.task.abort();
        self.status.stop();
        tracing::info!(service = %self.service, "Killed serf watcher");
    }
}
