//! Reconfiguration signalling.
//!
//! The watcher only says "the backend set of this service changed"; the
//! collaborator reads the new list from the published [`BackendSet`].
//!
//! [`BackendSet`]: crate::backends::BackendSet

use tokio::sync::mpsc;

/// Receives "backends changed" signals.
pub trait Reconfigure: Send + Sync {
    fn reconfigure(&self, service: &str);
}

/// Forwards signals over an unbounded channel as service names.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its signals arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Reconfigure for ChannelNotifier {
    fn reconfigure(&self, service: &str) {
        if self.tx.send(service.to_string()).is_err() {
            tracing::warn!(service = %service, "Reconfiguration receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_notifier_forwards_service() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.reconfigure("mysql");
        assert_eq!(rx.try_recv().unwrap(), "mysql");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_is_ignored() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.reconfigure("mysql");
    }
}
