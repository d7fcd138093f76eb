//! Process-wide method cache (`spec.md` §4.12, C10).
//!
//! `spec.md` describes one process-wide dictionary keyed by id, guarded by
//! a coarse lock. A literal Rust `static` can't hold this crate's generic
//! entry type (whatever `ecmac_dispatch`/`ecmac_codegen` choose to cache),
//! so the "process-wide" part is realized as a single [`MethodCache`]
//! instance the driver (C12) constructs once per process and shares — by
//! cloning the `Arc` it is wrapped in — across every engine, rather than a
//! hidden global; this also keeps the cache reconstructible per test
//! rather than bleeding allocated ids across unrelated test cases.
//!
//! [`MethodCache::next_id`] allocates this cache's own id space. It is
//! deliberately *not* shared with `ecmac_dispatch::GeneratorRegistry`'s
//! per-engine counter: `spec.md` §5 holds engines' own state (including a
//! user function's generator id) per-engine and not usable concurrently,
//! and calls out the method cache as the one component shared *across*
//! engines — collapsing the two into one counter would tie a per-engine
//! identity to process-wide state it has no business depending on.

use ecmac_types::MethodId;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, Weak};

/// Allocations between each sweep for dead entries (`spec.md` §4.12
/// "periodically (every N allocations) prunes dead entries").
const PRUNE_INTERVAL: u64 = 64;

struct Inner<T> {
    next_id: u64,
    entries: FxHashMap<MethodId, Weak<T>>,
    invalidated: FxHashSet<MethodId>,
    allocations_since_prune: u64,
}

impl<T> Default for Inner<T> {
    fn default() -> Self {
        Inner { next_id: 0, entries: FxHashMap::default(), invalidated: FxHashSet::default(), allocations_since_prune: 0 }
    }
}

/// `SaveAs`/`LoadGenerator` plus `GetNextID` (`spec.md` §4.12), generic over
/// whatever a caller wants to keep alive under a `MethodId` — a
/// `FunctionGenerator`, a compiled specialization, or any other
/// process-shared artifact a `MethodId` might name.
pub struct MethodCache<T> {
    inner: Mutex<Inner<T>>,
}

impl<T> Default for MethodCache<T> {
    fn default() -> Self {
        MethodCache { inner: Mutex::new(Inner::default()) }
    }
}

impl<T> MethodCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `GetNextID()`: allocate a fresh id, pruning dead entries every
    /// [`PRUNE_INTERVAL`] allocations.
    pub fn next_id(&self) -> MethodId {
        let mut inner = self.inner.lock();
        inner.next_id += 1;
        let id = MethodId(inner.next_id);

        inner.allocations_since_prune += 1;
        if inner.allocations_since_prune >= PRUNE_INTERVAL {
            inner.allocations_since_prune = 0;
            inner.entries.retain(|_, weak| weak.strong_count() > 0);
        }

        id
    }

    /// `SaveAs(id, generator)`: the cache holds only a weak reference —
    /// per `spec.md`'s "weak-reference storage model", the caller's own
    /// `Arc` is what actually keeps an entry alive.
    pub fn save_as(&self, id: MethodId, value: &Arc<T>) {
        self.inner.lock().entries.insert(id, Arc::downgrade(value));
    }

    /// `LoadGenerator(id)`: the inverse of `save_as`, `None` once the last
    /// strong reference is gone.
    pub fn load_generator(&self, id: MethodId) -> Option<Arc<T>> {
        self.inner.lock().entries.get(&id).and_then(Weak::upgrade)
    }

    /// Mark `id` stale — a global's type collapsed and `id` is one of its
    /// recorded users, or an argument's widened `ChangesProperties` fact
    /// invalidated a cached specialization (`spec.md` §4.12
    /// "Recompilation triggers"). The old handle stays reachable (any
    /// frame already running it keeps running) but [`MethodCache::is_invalidated`]
    /// tells the dispatch resolver to re-enter `GetCompiled` next time.
    pub fn invalidate(&self, id: MethodId) {
        self.inner.lock().invalidated.insert(id);
    }

    pub fn is_invalidated(&self, id: MethodId) -> bool {
        self.inner.lock().invalidated.contains(&id)
    }
}
