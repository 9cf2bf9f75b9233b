//! The published-tree cache.
//!
//! Exactly one tree is published at a time, and the published snapshot
//! version never decreases. Commit and publication happen inside one
//! critical section so subscribers observe commits in order.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::base::Snapshot;
use crate::syntax::SyntaxTree;

/// Holder of the current published tree.
pub struct TreeCache {
    inner: Mutex<Arc<SyntaxTree>>,
}

impl TreeCache {
    /// A cache seeded with the initial parse; the cache is never empty.
    pub fn new(seed: Arc<SyntaxTree>) -> TreeCache {
        TreeCache {
            inner: Mutex::new(seed),
        }
    }

    /// The currently published tree.
    pub fn get(&self) -> Arc<SyntaxTree> {
        self.inner.lock().clone()
    }

    /// Whether the published tree corresponds to `snapshot`.
    pub fn is_current(&self, snapshot: &Snapshot) -> bool {
        self.inner.lock().version() == snapshot.version()
    }

    /// Compare-and-replace: commit `tree` iff its snapshot version is not
    /// older than the published one, running `publish` inside the critical
    /// section on success. Returns whether the commit happened; a `false`
    /// means the result was stale and is discarded.
    pub fn commit_with(
        &self,
        tree: Arc<SyntaxTree>,
        publish: impl FnOnce(&Arc<SyntaxTree>),
    ) -> bool {
        let mut current = self.inner.lock();
        if tree.version() < current.version() {
            debug!(
                stale = %tree.version(),
                published = %current.version(),
                "discarding stale tree"
            );
            return false;
        }
        *current = tree;
        publish(&current);
        true
    }
}
