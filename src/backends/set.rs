//! Published backend list.
//!
//! # Responsibilities
//! - Hold the list of endpoints the proxy layer should route to
//! - Let the poll loop replace it while other threads read it

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::backends::endpoint::Endpoint;

/// Atomically swapped, immutable endpoint list.
#[derive(Debug)]
pub struct BackendSet {
    current: ArcSwap<Vec<Endpoint>>,
}

impl BackendSet {
    pub fn new(initial: Vec<Endpoint>) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Current list. The returned `Arc` stays valid across later swaps.
    pub fn snapshot(&self) -> Arc<Vec<Endpoint>> {
        self.current.load_full()
    }

    /// Replace the whole list.
    pub fn replace(&self, endpoints: Vec<Endpoint>) {
        self.current.store(Arc::new(endpoints));
    }

    /// Replace the whole list with an already shared one.
    pub fn replace_shared(&self, endpoints: Arc<Vec<Endpoint>>) {
        self.current.store(endpoints);
    }

    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }
}

impl Default for BackendSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_survives_replace() {
        let set = BackendSet::new(vec![Endpoint::new("a", "10.0.0.1", "80")]);
        let before = set.snapshot();

        set.replace(vec![
            Endpoint::new("b", "10.0.0.2", "80"),
            Endpoint::new("c", "10.0.0.3", "80"),
        ]);

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name, "a");
        assert_eq!(set.len(), 2);
        assert_eq!(set.snapshot()[0].name, "b");
    }

    #[test]
    fn test_concurrent_readers_see_whole_lists() {
        let set = Arc::new(BackendSet::default());
        let writer = {
            let set = set.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    let list = (0..=i % 5)
                        .map(|n| Endpoint::new(format!("m{}", n), "10.0.0.1", "80"))
                        .collect();
                    set.replace(list);
                }
            })
        };

        for _ in 0..200 {
            let snap = set.snapshot();
            // Every published list is m0..mN with no gaps.
            for (i, ep) in snap.iter().enumerate() {
                assert_eq!(ep.name, format!("m{}", i));
            }
        }
        writer.join().unwrap();
    }
}
