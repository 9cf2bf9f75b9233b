//! The parser session: the coordination layer between an editing host and
//! the grammar engine.
//!
//! One session per open document. The host calls [`ParserSession::on_edit`]
//! synchronously for every atomic buffer change; the session attempts an
//! in-place patch and, regardless of the outcome, (re-)arms a debounced full
//! reparse of the latest snapshot on a background worker. The published tree
//! only ever moves forward: stale reparse results are discarded, and an
//! engine failure keeps the last-known-good tree.

mod cache;
mod events;
mod options;
mod scheduler;

pub use cache::TreeCache;
pub use events::{EventHub, StructureChange};
pub use options::SessionOptions;
pub use scheduler::IdleScheduler;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_channel::Receiver;
use parking_lot::Mutex;
use tracing::{debug, error};

use crate::base::{Edit, Snapshot};
use crate::engine::{EngineError, GrammarEngine};
use crate::incremental::{
    Classification, IneligibleReason, PartialParseResult, PartialParser, classify,
};
use crate::syntax::SyntaxTree;

/// Counters exposed by [`ParserSession::stats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    pub edits: u64,
    pub partial_accepts: u64,
    pub partial_rejects: u64,
    pub full_reparses: u64,
    pub stale_discards: u64,
    pub engine_failures: u64,
}

#[derive(Default)]
struct StatCells {
    edits: AtomicU64,
    partial_accepts: AtomicU64,
    partial_rejects: AtomicU64,
    full_reparses: AtomicU64,
    stale_discards: AtomicU64,
    engine_failures: AtomicU64,
}

impl StatCells {
    fn snapshot(&self) -> Stats {
        Stats {
            edits: self.edits.load(Ordering::Relaxed),
            partial_accepts: self.partial_accepts.load(Ordering::Relaxed),
            partial_rejects: self.partial_rejects.load(Ordering::Relaxed),
            full_reparses: self.full_reparses.load(Ordering::Relaxed),
            stale_discards: self.stale_discards.load(Ordering::Relaxed),
            engine_failures: self.engine_failures.load(Ordering::Relaxed),
        }
    }
}

/// State shared between the edit thread and the reparse worker.
///
/// Lock order: the edit path takes `partial` then the cache; the worker
/// takes the cache (inside `commit_with`) and only then `partial`, never
/// both at once.
struct SessionCore {
    engine: Arc<dyn GrammarEngine>,
    cache: TreeCache,
    partial: Mutex<PartialParser>,
    events: EventHub,
    pending: Mutex<Option<Snapshot>>,
    stats: StatCells,
    last_error: Mutex<Option<EngineError>>,
}

impl SessionCore {
    /// Full reparse of the latest pending snapshot. Runs on the scheduler
    /// worker, or inline via [`ParserSession::reparse_now`].
    fn run_full_reparse(&self) {
        let Some(snapshot) = self.pending.lock().take() else {
            return;
        };
        self.stats.full_reparses.fetch_add(1, Ordering::Relaxed);
        match self.engine.parse(snapshot.text()) {
            Err(err) => {
                error!(%err, version = %snapshot.version(), "full reparse failed");
                self.stats.engine_failures.fetch_add(1, Ordering::Relaxed);
                *self.last_error.lock() = Some(err);
                // Keep the snapshot queued so a later attempt can retry it,
                // unless a newer edit already replaced it.
                let mut pending = self.pending.lock();
                if pending.is_none() {
                    *pending = Some(snapshot);
                }
            }
            Ok(parse) => {
                let tree = Arc::new(SyntaxTree::new(parse, snapshot));
                let committed = self.cache.commit_with(tree, |tree| {
                    self.events.broadcast(StructureChange {
                        tree: tree.clone(),
                        change: None,
                    });
                });
                if committed {
                    self.partial.lock().reset();
                    *self.last_error.lock() = None;
                } else {
                    self.stats.stale_discards.fetch_add(1, Ordering::Relaxed);
                }
            }
        }
    }
}

/// Per-document coordinator. See the module docs for the protocol.
pub struct ParserSession {
    core: Arc<SessionCore>,
    options: SessionOptions,
    scheduler: IdleScheduler,
}

impl ParserSession {
    /// Open a session over `text` with a synchronous seed parse.
    pub fn start(
        engine: Arc<dyn GrammarEngine>,
        text: &str,
        options: SessionOptions,
    ) -> Result<ParserSession, EngineError> {
        let snapshot = Snapshot::initial(text);
        let seed = Arc::new(SyntaxTree::new(engine.parse(text)?, snapshot));
        let core = Arc::new(SessionCore {
            cache: TreeCache::new(seed),
            partial: Mutex::new(PartialParser::new(engine.clone(), options.policy.clone())),
            engine,
            events: EventHub::new(),
            pending: Mutex::new(None),
            stats: StatCells::default(),
            last_error: Mutex::new(None),
        });
        let worker_core = core.clone();
        let scheduler = IdleScheduler::spawn(move || worker_core.run_full_reparse());
        Ok(ParserSession {
            core,
            options,
            scheduler,
        })
    }

    /// Handle one atomic edit. Attempts an in-place patch and always arms
    /// the confirming full reparse. Synchronous; safe to call from the
    /// host's edit thread.
    pub fn on_edit(&self, edit: &Edit) -> PartialParseResult {
        self.core.stats.edits.fetch_add(1, Ordering::Relaxed);

        let mut partial = self.core.partial.lock();
        let result = if partial.gate_blocks(edit) {
            PartialParseResult::REJECTED
        } else {
            let tree = self.core.cache.get();
            match classify(&tree, edit, partial.policy()) {
                Classification::NotEligible(reason) => {
                    debug!(?reason, "edit not eligible for partial parse");
                    match reason {
                        // A directive rewires how surrounding content is
                        // parsed, so consumers must not sit on stale context.
                        IneligibleReason::ReservedWord {
                            directive: true, ..
                        } => {
                            PartialParseResult::REJECTED
                                | PartialParseResult::SPAN_CONTEXT_CHANGED
                        }
                        _ => PartialParseResult::REJECTED,
                    }
                }
                Classification::Eligible(span) => {
                    let outcome = partial.parse(&tree, edit, &span);
                    if let Some(patched) = outcome.tree {
                        self.core.cache.commit_with(Arc::new(patched), |tree| {
                            self.core.events.broadcast(StructureChange {
                                tree: tree.clone(),
                                change: Some(edit.change().clone()),
                            });
                        });
                    }
                    outcome.result
                }
            }
        };
        drop(partial);

        if result.is_accepted() {
            self.core.stats.partial_accepts.fetch_add(1, Ordering::Relaxed);
        } else if result.is_rejected() {
            self.core.stats.partial_rejects.fetch_add(1, Ordering::Relaxed);
        }

        // Every edit owes a confirming reparse of the snapshot it produced;
        // speculative or context-changing patches get the accelerated window.
        *self.core.pending.lock() = Some(edit.new_snapshot().clone());
        let delay = if result
            .intersects(PartialParseResult::PROVISIONAL | PartialParseResult::SPAN_CONTEXT_CHANGED)
        {
            self.options.confirm_delay()
        } else {
            self.options.idle_delay
        };
        self.scheduler.arm(delay);

        result
    }

    /// The currently published tree.
    pub fn tree(&self) -> Arc<SyntaxTree> {
        self.core.cache.get()
    }

    /// Whether the published tree is for `snapshot`.
    pub fn is_current(&self, snapshot: &Snapshot) -> bool {
        self.core.cache.is_current(snapshot)
    }

    /// Whether the published tree is awaiting confirmation of a speculative
    /// patch.
    pub fn is_provisional(&self) -> bool {
        self.core.partial.lock().is_provisional()
    }

    /// Run any pending full reparse inline instead of waiting for idle.
    pub fn reparse_now(&self) {
        self.scheduler.cancel();
        self.core.run_full_reparse();
    }

    /// Subscribe to committed trees. Events arrive in commit order; dropping
    /// the receiver unsubscribes.
    pub fn subscribe(&self) -> Receiver<StructureChange> {
        self.core.events.subscribe()
    }

    /// The failure recorded by the most recent full reparse, if it did not
    /// produce a tree. Cleared by the next successful commit.
    pub fn last_engine_error(&self) -> Option<EngineError> {
        self.core.last_error.lock().clone()
    }

    pub fn stats(&self) -> Stats {
        self.core.stats.snapshot()
    }
}

impl Drop for ParserSession {
    fn drop(&mut self) {
        self.scheduler.cancel();
    }
}
