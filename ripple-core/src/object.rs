//! Plain Object Targets
//!
//! An `Obj` is the unit of observation: a shared, dynamically keyed record
//! identified by reference rather than by value. Reads and writes through
//! `Obj` itself are raw: they never touch the dependency graph. The
//! reactive wrapper layer adds tracking and triggering on top.
//!
//! # Identity
//!
//! Each object carries a unique ID from an atomic counter. Clones share
//! the same underlying storage and compare equal; two separately
//! constructed objects never do, even with identical fields.
//!
//! # Ownership
//!
//! The object's dependency map rides along with the object itself. There
//! is no global registry, so dropping the last handle drops the object's
//! dependency state with it.
//!
//! # Thread Safety
//!
//! Fields are protected by a RwLock and handles are Send + Sync, so an
//! object may be shared across threads. Tracking remains per-thread.

use std::fmt::Debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::graph::DepMap;
use crate::value::Value;

/// Counter for generating unique target IDs.
static TARGET_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a new unique target ID.
fn next_target_id() -> u64 {
    TARGET_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// A plain object: an insertion-ordered record of named fields.
///
/// # Example
///
/// ```rust,ignore
/// let state = Obj::new();
/// state.set_raw("num", 100);
///
/// // Raw reads bypass tracking; missing keys read as Null
/// assert_eq!(state.get_raw("num"), Value::Int(100));
/// assert!(state.get_raw("missing").is_null());
/// ```
pub struct Obj {
    /// Unique identifier for this target.
    id: u64,

    /// The fields, in insertion order.
    fields: Arc<RwLock<IndexMap<String, Value>>>,

    /// Dependency state for this target: key -> subscribed effects.
    deps: Arc<DepMap>,
}

impl Obj {
    /// Create a new, empty object.
    pub fn new() -> Self {
        Self {
            id: next_target_id(),
            fields: Arc::new(RwLock::new(IndexMap::new())),
            deps: Arc::new(DepMap::new()),
        }
    }

    /// Get the target's unique ID.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The dependency map owned by this target.
    pub fn deps(&self) -> &DepMap {
        &self.deps
    }

    /// Read a field without tracking.
    ///
    /// Missing keys read as `Null`.
    pub fn get_raw(&self, key: &str) -> Value {
        self.fields
            .read()
            .expect("fields lock poisoned")
            .get(key)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Write a field without notifying subscribers.
    pub fn set_raw<V>(&self, key: &str, value: V)
    where
        V: Into<Value>,
    {
        self.fields
            .write()
            .expect("fields lock poisoned")
            .insert(key.to_string(), value.into());
    }

    /// Check whether a field exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields
            .read()
            .expect("fields lock poisoned")
            .contains_key(key)
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.fields
            .read()
            .expect("fields lock poisoned")
            .keys()
            .cloned()
            .collect()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.read().expect("fields lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check whether two handles share the same underlying object.
    pub fn ptr_eq(&self, other: &Obj) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }
}

impl Default for Obj {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for Obj {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            fields: Arc::clone(&self.fields),
            deps: Arc::clone(&self.deps),
        }
    }
}

impl PartialEq for Obj {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Obj {}

impl<K, V> FromIterator<(K, V)> for Obj
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let obj = Obj::new();
        {
            let mut fields = obj.fields.write().expect("fields lock poisoned");
            for (key, value) in iter {
                fields.insert(key.into(), value.into());
            }
        }
        obj
    }
}

impl Debug for Obj {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Obj")
            .field("id", &self.id)
            .field("len", &self.len())
            .finish()
    }
}

impl Serialize for Obj {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let fields = self.fields.read().expect("fields lock poisoned");
        let mut map = serializer.serialize_map(Some(fields.len()))?;
        for (key, value) in fields.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
