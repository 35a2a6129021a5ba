//! Reactive Wrapping Layer
//!
//! A `Reactive` is an accessor wrapper over a plain object: reads go
//! through `get`, which records the active effect as a subscriber, and
//! writes go through `set`, which notifies subscribers. Raw access stays
//! available on the underlying `Obj`.
//!
//! # Deep Reactivity
//!
//! `get` passes its result through [`wrap`], so nested objects come back
//! wrapped. Deep reactivity is established on demand, one read at a time,
//! rather than eagerly at wrap time.
//!
//! # Identity
//!
//! Wrapper identity is target identity: two wrappers over the same target
//! are interchangeable and compare equal. Repeated reads of the same
//! nested object therefore yield a stable identity.

use std::fmt::Debug;

use crate::object::Obj;
use crate::value::Value;

/// Make a value observable.
///
/// Plain objects come back wrapped; primitives and already-wrapped values
/// pass through unchanged.
pub fn wrap(value: Value) -> Value {
    match value {
        Value::Object(target) => Value::Reactive(Reactive::new(target)),
        other => other,
    }
}

/// An accessor wrapper that tracks reads and triggers on writes.
///
/// # Example
///
/// ```rust,ignore
/// let state = Reactive::new(Obj::new());
///
/// let render = {
///     let state = state.clone();
///     effect(move || {
///         state.get("num")  // subscribes the effect to "num"
///     }, EffectOptions::default())
/// };
///
/// state.set("num", 5);  // re-runs the effect
/// ```
#[derive(Clone)]
pub struct Reactive {
    target: Obj,
}

impl Reactive {
    /// Wrap `target`. Wrapping is cheap and carries no state of its own.
    pub fn new(target: Obj) -> Self {
        Self { target }
    }

    /// Read a field, subscribing the active effect to it.
    ///
    /// Tracking happens even when the key is missing: an effect may
    /// subscribe to a key before it is first written. Object results come
    /// back wrapped.
    pub fn get(&self, key: &str) -> Value {
        self.target.deps().track(key);
        wrap(self.target.get_raw(key))
    }

    /// Read a field without subscribing. The result is not wrapped.
    pub fn get_untracked(&self, key: &str) -> Value {
        self.target.get_raw(key)
    }

    /// Write a field and notify its subscribers.
    pub fn set<V>(&self, key: &str, value: V)
    where
        V: Into<Value>,
    {
        self.target.set_raw(key, value);
        self.target.deps().trigger(key);
    }

    /// The wrapped target.
    pub fn target(&self) -> &Obj {
        &self.target
    }

    /// The target's unique ID.
    pub fn id(&self) -> u64 {
        self.target.id()
    }

    /// Number of effects subscribed to `key` on this target.
    pub fn subscriber_count(&self, key: &str) -> usize {
        self.target.deps().subscriber_count(key)
    }
}

impl PartialEq for Reactive {
    fn eq(&self, other: &Self) -> bool {
        self.target == other.target
    }
}

impl Eq for Reactive {}

impl Debug for Reactive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactive")
            .field("target", &self.target.id())
            .field("len", &self.target.len())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
