//! Computed Values
//!
//! A Computed is a cached derived value built on a lazy effect. Instead of
//! re-running eagerly when a dependency changes, its scheduler marks the
//! cache dirty; the next read recomputes.
//!
//! # How Computeds Work
//!
//! 1. Creation does nothing. The underlying effect is lazy and the cache
//!    starts dirty.
//!
//! 2. The first `value()` call runs the getter as the active effect, which
//!    subscribes it to whatever it reads, then caches the result.
//!
//! 3. When a dependency is written, the scheduler marks the cache dirty
//!    and notifies the computed's own subscribers, but only on the first
//!    clean-to-dirty transition. Further writes while dirty stay silent:
//!    subscribers were already told the cache is stale.
//!
//! 4. Reading `value()` inside another effect subscribes that effect to
//!    the computed, so invalidation propagates through chains of
//!    computeds.
//!
//! # Writes
//!
//! A computed built from a getter alone is read-only: writes are reported
//! on the warning channel and ignored. `with_setter` installs a custom
//! write handler instead.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use super::effect::{Effect, EffectOptions};
use crate::graph::DepMap;
use crate::value::Value;

/// Counter for generating unique computed IDs.
static COMPUTED_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique computed ID.
fn next_computed_id() -> u64 {
    COMPUTED_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// The key a computed's own subscribers are tracked under.
const VALUE_KEY: &str = "value";

/// A cached derived value that recomputes on read after a dependency
/// changed.
///
/// # Example
///
/// ```rust,ignore
/// let doubled = computed(move || {
///     Value::Int(state.get("num").as_int().unwrap_or(0) * 2)
/// });
///
/// doubled.value();  // runs the getter, caches the result
/// doubled.value();  // cache hit
/// ```
pub struct Computed {
    /// Unique identifier for this computed.
    id: u64,

    /// The lazy effect that runs the getter.
    runner: Effect,

    /// Whether the cache is stale. Starts dirty.
    dirty: Arc<AtomicBool>,

    /// The cached value. `Null` until the first recompute.
    value: Arc<RwLock<Value>>,

    /// Dependency state for this computed's own subscribers.
    deps: Arc<DepMap>,

    /// Custom write handler, if any.
    setter: Option<Arc<dyn Fn(Value) + Send + Sync>>,
}

impl Computed {
    /// Create a read-only computed from a getter.
    pub fn new<F>(getter: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::build(getter, None)
    }

    /// Create a computed with a custom write handler.
    pub fn with_setter<F, S>(getter: F, setter: S) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
        S: Fn(Value) + Send + Sync + 'static,
    {
        Self::build(getter, Some(Arc::new(setter)))
    }

    fn build<F>(getter: F, setter: Option<Arc<dyn Fn(Value) + Send + Sync>>) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        let deps = Arc::new(DepMap::new());
        let dirty = Arc::new(AtomicBool::new(true));

        // The scheduler captures only the dirty flag and the dependency
        // state, never the computed itself: the runner ends up stored in
        // upstream dependency sets and must not keep a cycle through them.
        let scheduler = {
            let deps = Arc::clone(&deps);
            let dirty = Arc::clone(&dirty);
            move |_effect: Effect| {
                if !dirty.swap(true, Ordering::SeqCst) {
                    deps.trigger(VALUE_KEY);
                }
            }
        };

        let runner = Effect::new(getter, EffectOptions::new().lazy().scheduler(scheduler));

        Self {
            id: next_computed_id(),
            runner,
            dirty,
            value: Arc::new(RwLock::new(Value::Null)),
            deps,
            setter,
        }
    }

    /// Get the computed's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Current value, recomputing first when the cache is dirty.
    ///
    /// Reading inside another effect subscribes that effect to this
    /// computed. A re-entrant recompute (the getter reading its own
    /// computed) is skipped: the previous cache is returned and the cache
    /// stays dirty.
    pub fn value(&self) -> Value {
        if self.dirty.load(Ordering::SeqCst) {
            if let Some(fresh) = self.runner.run() {
                *self.value.write().expect("value lock poisoned") = fresh;
                self.dirty.store(false, Ordering::SeqCst);
            }
        }

        self.deps.track(VALUE_KEY);

        self.value.read().expect("value lock poisoned").clone()
    }

    /// Write through the configured setter.
    ///
    /// Without a setter the computed is read-only: the write is reported
    /// on the warning channel and ignored.
    pub fn set_value(&self, value: Value) {
        match &self.setter {
            Some(setter) => setter(value),
            None => {
                tracing::warn!("computed {} is readonly, write ignored", self.id);
            }
        }
    }

    /// Whether the cache is stale.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Number of effects subscribed to this computed.
    pub fn subscriber_count(&self) -> usize {
        self.deps.subscriber_count(VALUE_KEY)
    }

    /// Number of completed getter runs.
    pub fn recompute_count(&self) -> u64 {
        self.runner.run_count()
    }
}

/// Create a read-only computed from a getter.
pub fn computed<F>(getter: F) -> Computed
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    Computed::new(getter)
}

impl Clone for Computed {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            runner: self.runner.clone(),
            dirty: Arc::clone(&self.dirty),
            value: Arc::clone(&self.value),
            deps: Arc::clone(&self.deps),
            setter: self.setter.clone(),
        }
    }
}

impl Debug for Computed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed")
            .field("id", &self.id)
            .field("dirty", &self.is_dirty())
            .field("recompute_count", &self.recompute_count())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::Obj;
    use crate::reactive::{effect, Reactive};
    use std::sync::atomic::{AtomicI32, Ordering};
    use std::sync::OnceLock;

    fn counter_state(n: i64) -> Reactive {
        let obj = Obj::new();
        obj.set_raw("n", n);
        Reactive::new(obj)
    }

    #[test]
    fn computed_is_lazy_until_first_read() {
        let state = counter_state(1);
        let compute_count = Arc::new(AtomicI32::new(0));

        let state_clone = state.clone();
        let compute_clone = Arc::clone(&compute_count);
        let doubled = computed(move || {
            compute_clone.fetch_add(1, Ordering::SeqCst);
            Value::Int(state_clone.get("n").as_int().unwrap_or(0) * 2)
        });

        // Nothing ran, nothing subscribed
        assert_eq!(compute_count.load(Ordering::SeqCst), 0);
        assert!(doubled.is_dirty());
        assert_eq!(state.subscriber_count("n"), 0);

        assert_eq!(doubled.value(), Value::Int(2));
        assert_eq!(compute_count.load(Ordering::SeqCst), 1);
        assert!(!doubled.is_dirty());
        assert_eq!(state.subscriber_count("n"), 1);
    }

    #[test]
    fn computed_caches_until_a_dependency_changes() {
        let state = counter_state(2);
        let compute_count = Arc::new(AtomicI32::new(0));

        let state_clone = state.clone();
        let compute_clone = Arc::clone(&compute_count);
        let doubled = computed(move || {
            compute_clone.fetch_add(1, Ordering::SeqCst);
            Value::Int(state_clone.get("n").as_int().unwrap_or(0) * 2)
        });

        assert_eq!(doubled.value(), Value::Int(4));
        assert_eq!(doubled.value(), Value::Int(4));
        assert_eq!(doubled.value(), Value::Int(4));
        assert_eq!(compute_count.load(Ordering::SeqCst), 1);

        state.set("n", 5);
        assert!(doubled.is_dirty());

        // Still stale until read
        assert_eq!(compute_count.load(Ordering::SeqCst), 1);

        assert_eq!(doubled.value(), Value::Int(10));
        assert_eq!(compute_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn subscribers_are_notified_once_per_dirty_transition() {
        let state = counter_state(1);

        let state_clone = state.clone();
        let doubled = computed(move || {
            Value::Int(state_clone.get("n").as_int().unwrap_or(0) * 2)
        });

        let notified = Arc::new(AtomicI32::new(0));

        let doubled_clone = doubled.clone();
        let notified_clone = Arc::clone(&notified);
        let _subscriber = effect(
            move || doubled_clone.value(),
            EffectOptions::new().scheduler(move |_effect| {
                notified_clone.fetch_add(1, Ordering::SeqCst);
            }),
        );

        assert_eq!(doubled.subscriber_count(), 1);
        assert_eq!(notified.load(Ordering::SeqCst), 0);

        // First write: clean -> dirty notifies subscribers
        state.set("n", 5);
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        // Writes while already dirty stay silent
        state.set("n", 9);
        state.set("n", 12);
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        // Reading cleans the cache; the next write notifies again
        assert_eq!(doubled.value(), Value::Int(24));
        state.set("n", 13);
        assert_eq!(notified.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn readonly_write_is_ignored() {
        let answer = computed(|| Value::Int(41));

        assert_eq!(answer.value(), Value::Int(41));

        answer.set_value(Value::Int(0));

        // State unchanged, cache untouched
        assert_eq!(answer.value(), Value::Int(41));
        assert!(!answer.is_dirty());
    }

    #[test]
    fn with_setter_routes_writes() {
        let state = counter_state(1);

        let getter_state = state.clone();
        let setter_state = state.clone();
        let doubled = Computed::with_setter(
            move || Value::Int(getter_state.get("n").as_int().unwrap_or(0) * 2),
            move |value| {
                let half = value.as_int().unwrap_or(0) / 2;
                setter_state.set("n", half);
            },
        );

        assert_eq!(doubled.value(), Value::Int(2));

        doubled.set_value(Value::Int(10));

        // The setter wrote through to the dependency
        assert_eq!(state.get_untracked("n"), Value::Int(5));
        assert!(doubled.is_dirty());
        assert_eq!(doubled.value(), Value::Int(10));
    }

    #[test]
    fn reentrant_recompute_returns_stale_cache() {
        let slot: Arc<OnceLock<Computed>> = Arc::new(OnceLock::new());
        let compute_count = Arc::new(AtomicI32::new(0));

        let slot_clone = Arc::clone(&slot);
        let compute_clone = Arc::clone(&compute_count);
        let tangled = computed(move || {
            compute_clone.fetch_add(1, Ordering::SeqCst);
            if let Some(me) = slot_clone.get() {
                // The nested read skips the recompute and sees the stale
                // cache while the outer run is still in progress
                assert!(me.value().is_null());
                assert!(me.is_dirty());
            }
            Value::Int(7)
        });

        slot.set(tangled.clone()).expect("slot already set");

        assert_eq!(tangled.value(), Value::Int(7));
        assert!(!tangled.is_dirty());
        assert_eq!(compute_count.load(Ordering::SeqCst), 1);

        // And the cache behaves normally afterwards
        assert_eq!(tangled.value(), Value::Int(7));
        assert_eq!(compute_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clone_shares_state() {
        let state = counter_state(3);

        let state_clone = state.clone();
        let first = computed(move || {
            Value::Int(state_clone.get("n").as_int().unwrap_or(0) * 2)
        });

        let second = first.clone();
        assert_eq!(first.id(), second.id());

        assert_eq!(first.value(), Value::Int(6));
        assert!(!second.is_dirty());
        assert_eq!(second.recompute_count(), 1);

        state.set("n", 4);
        assert!(second.is_dirty());
        assert_eq!(second.value(), Value::Int(8));
        assert_eq!(first.recompute_count(), 2);
    }
}
