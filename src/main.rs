//! Serf membership discovery daemon.
//!
//! # Architecture Overview
//!
//! ```text
//!   gossip agent                ┌──────────────────────────────────────────────┐
//!   ────────────┐               │               SERF DISCOVERY                  │
//!               ▼               │                                              │
//!   /dev/shm/serf_members.json ─┼─▶ poll loop ─▶ parse ─▶ extract ─▶ changed? │
//!                               │   (1 per service, debounced)          │      │
//!                               │                                       ▼      │
//!                               │                   BackendSet swap + signal ──┼─▶ config writer
//!                               │                                              │
//!                               │  config · lifecycle · logging · metrics      │
//!                               └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use serf_discovery::config::load_config;
use serf_discovery::discovery::{ChannelNotifier, ServiceWatcher, WatcherHandle};
use serf_discovery::lifecycle::signals::wait_for_signal;
use serf_discovery::lifecycle::startup::start_watchers;
use serf_discovery::lifecycle::Shutdown;
use serf_discovery::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "serf-discovery")]
#[command(about = "Discover service backends from a serf membership snapshot", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "serf-discovery.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(
        config = %cli.config.display(),
        services = config.services.len(),
        "serf-discovery v0.1.0 starting"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr)?,
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let shutdown = Shutdown::new();
    let (notifier, mut changes) = ChannelNotifier::new();
    let watchers = start_watchers(&config, &shutdown, Arc::new(notifier))?;

    let signal = wait_for_signal();
    tokio::pin!(signal);
    loop {
        tokio::select! {
            Some(service) = changes.recv() => report_backends(&watchers, &service),
            _ = &mut signal => break,
        }
    }

    tracing::info!("Stopping watchers");
    shutdown.trigger();
    for watcher in watchers {
        watcher.join().await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Log the list the config writer will render for `service`.
fn report_backends(watchers: &[WatcherHandle], service: &str) {
    let Some(watcher) = watchers.iter().find(|w| w.name() == service) else {
        return;
    };
    let backends = watcher.backends();
    tracing::info!(service = %service, backends = backends.len(), "Backends changed");
    for backend in backends.iter() {
        tracing::info!(service = %service, backend = %backend, "Backend");
    }
}
