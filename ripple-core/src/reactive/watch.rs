//! Watchers
//!
//! A watcher observes a derived getter and invokes a callback with the
//! new and previous values whenever a tracked dependency changes.
//!
//! # How Watchers Work
//!
//! 1. Creation runs the getter once, synchronously, to seed the
//!    last-observed value and the subscriptions. The callback is not
//!    invoked for this initial run.
//!
//! 2. When a dependency is written, the watcher's handler is enqueued on
//!    the job queue. The handler is built once, so rapid changes coalesce
//!    into a single callback per flush.
//!
//! 3. At flush time the handler re-reads the getter directly (outside any
//!    effect, hence untracked), invokes the callback with the new and
//!    previous values, and stores the new value.
//!
//! # Stopping
//!
//! `stop` disposes the underlying effect: no further callbacks are
//! scheduled. A handler that was already queued still runs; there is no
//! cancellation primitive.

use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use super::effect::{Effect, EffectOptions};
use crate::graph::{queue_job, Job};
use crate::value::Value;

/// Handle to an active watcher.
pub struct Watcher {
    runner: Effect,
}

impl Watcher {
    /// Stop watching: no further callbacks will be scheduled.
    pub fn stop(&self) {
        self.runner.dispose();
    }

    /// Whether the watcher has been stopped.
    pub fn is_stopped(&self) -> bool {
        self.runner.is_disposed()
    }
}

impl Debug for Watcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Watcher")
            .field("effect", &self.runner.id())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

/// Watch `getter` and invoke `callback(new, previous)` after a tracked
/// dependency changes.
///
/// Callbacks are deferred to the next flush and coalesced: several writes
/// between flushes produce one callback carrying the final value and the
/// value observed before the first write.
pub fn watch<G, C>(getter: G, callback: C) -> Watcher
where
    G: Fn() -> Value + Send + Sync + 'static,
    C: Fn(Value, Value) + Send + Sync + 'static,
{
    let getter = Arc::new(getter);
    let old_value = Arc::new(RwLock::new(Value::Null));

    // Built once: every enqueue carries the same job identity, which is
    // what makes the queue coalesce bursts of changes.
    let handler = {
        let getter = Arc::clone(&getter);
        let old_value = Arc::clone(&old_value);
        Job::callback(move || {
            // Direct getter call, outside any effect: untracked
            let new_value = getter();
            let previous = old_value.read().expect("old value lock poisoned").clone();

            callback(new_value.clone(), previous);

            *old_value.write().expect("old value lock poisoned") = new_value;
        })
    };

    let runner = Effect::new(
        {
            let getter = Arc::clone(&getter);
            move || getter()
        },
        EffectOptions::new().lazy().scheduler(move |_effect| {
            queue_job(handler.clone());
        }),
    );

    // Seed the previous value and the subscriptions; no callback for the
    // initial run
    let initial = runner.run().unwrap_or(Value::Null);
    *old_value.write().expect("old value lock poisoned") = initial;

    Watcher { runner }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
