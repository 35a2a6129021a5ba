//! Dependency Map
//!
//! Maps property keys to the ordered set of effects that read them. Every
//! observable target owns one `DepMap`; there is no global registry, so a
//! target's dependency state lives exactly as long as the target itself.
//!
//! # How Tracking Works
//!
//! 1. An effect runs and reads a property through the wrapper layer.
//!
//! 2. The read calls `track`, which records the active effect in the set
//!    for that key. The sets have set semantics with insertion order: an
//!    effect subscribes to a key at most once, and subscribers are visited
//!    in first-subscription order.
//!
//! 3. A write calls `trigger`, which snapshots the subscribers for the key
//!    and either re-runs each one or hands it to its configured scheduler.
//!
//! # Thread Safety
//!
//! The map is behind a RwLock, but the lock is never held while a
//! subscriber runs: effect bodies are user code and may themselves track or
//! trigger.

use std::fmt::Debug;
use std::sync::RwLock;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;

use crate::reactive::{Effect, ExecutionStack};

/// Per-target dependency state: property key -> subscribed effects.
#[derive(Default)]
pub struct DepMap {
    deps: RwLock<IndexMap<String, IndexSet<Effect>>>,
}

impl DepMap {
    pub fn new() -> Self {
        Self {
            deps: RwLock::new(IndexMap::new()),
        }
    }

    /// Record the active effect as a subscriber of `key`.
    ///
    /// A no-op when no effect is running: reads outside effects are
    /// untracked. Re-tracking an already subscribed effect is a no-op.
    pub fn track(&self, key: &str) {
        let Some(effect) = ExecutionStack::active() else {
            return;
        };

        let mut deps = self.deps.write().expect("deps lock poisoned");
        let dep = deps
            .entry(key.to_string())
            .or_insert_with(IndexSet::new);

        let effect_id = effect.id();
        if dep.insert(effect) {
            tracing::trace!("effect {} subscribed to key {:?}", effect_id, key);
        }
    }

    /// Notify every subscriber of `key` that its value changed.
    ///
    /// Unknown keys are a no-op, not an error. Disposed effects are pruned
    /// here. The subscriber set is snapshotted before anything runs, so
    /// effects that subscribe during the pass are not visited by it, and
    /// the lock is not held across user code.
    pub fn trigger(&self, key: &str) {
        let subscribers: SmallVec<[Effect; 4]> = {
            let mut deps = self.deps.write().expect("deps lock poisoned");
            let Some(dep) = deps.get_mut(key) else {
                return;
            };

            dep.retain(|effect| !effect.is_disposed());
            dep.iter().cloned().collect()
        };

        if subscribers.is_empty() {
            return;
        }

        tracing::trace!(
            "triggering {} subscriber(s) of key {:?}",
            subscribers.len(),
            key
        );

        for effect in subscribers {
            match effect.scheduler() {
                Some(scheduler) => scheduler(effect),
                None => {
                    effect.run();
                }
            }
        }
    }

    /// Number of effects subscribed to `key`.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.deps
            .read()
            .expect("deps lock poisoned")
            .get(key)
            .map(|dep| dep.len())
            .unwrap_or(0)
    }

    /// Number of keys that have ever been tracked.
    pub fn tracked_key_count(&self) -> usize {
        self.deps.read().expect("deps lock poisoned").len()
    }
}

impl Debug for DepMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DepMap")
            .field("tracked_keys", &self.tracked_key_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
