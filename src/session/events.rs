//! Structure-change notifications.
//!
//! Every committed tree is broadcast to subscribers. Delivery is per
//! subscriber over an unbounded channel; the hub never blocks the committing
//! thread, and a dropped receiver unsubscribes itself on the next broadcast.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::trace;

use crate::base::SourceChange;
use crate::syntax::SyntaxTree;

/// A committed tree, as seen by subscribers.
///
/// `change` carries the edit for an in-place patch; a confirmed full reparse
/// is broadcast with `change: None`.
#[derive(Debug, Clone)]
pub struct StructureChange {
    pub tree: Arc<SyntaxTree>,
    pub change: Option<SourceChange>,
}

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    channels: IndexMap<u64, Sender<StructureChange>>,
}

/// Broadcast hub. Subscribers receive events in subscription order.
#[derive(Default)]
pub struct EventHub {
    subscribers: Mutex<Subscribers>,
}

impl EventHub {
    pub fn new() -> EventHub {
        EventHub::default()
    }

    pub fn subscribe(&self) -> Receiver<StructureChange> {
        let (tx, rx) = unbounded();
        let mut subs = self.subscribers.lock();
        let id = subs.next_id;
        subs.next_id += 1;
        subs.channels.insert(id, tx);
        rx
    }

    pub fn broadcast(&self, event: StructureChange) {
        let mut subs = self.subscribers.lock();
        subs.channels
            .retain(|_, tx| tx.send(event.clone()).is_ok());
        trace!(
            version = %event.tree.version(),
            subscribers = subs.channels.len(),
            "structure change broadcast"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Snapshot;
    use crate::parser::parse_document;

    fn event(text: &str) -> StructureChange {
        let snapshot = Snapshot::initial(text);
        StructureChange {
            tree: Arc::new(SyntaxTree::new(parse_document(text), snapshot)),
            change: None,
        }
    }

    #[test]
    fn dropped_receiver_is_pruned() {
        let hub = EventHub::new();
        let kept = hub.subscribe();
        drop(hub.subscribe());
        hub.broadcast(event("a"));
        assert_eq!(kept.try_iter().count(), 1);
        hub.broadcast(event("b"));
        assert_eq!(kept.try_iter().count(), 1);
    }
}
