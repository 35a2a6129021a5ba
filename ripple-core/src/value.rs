//! Dynamic Value Model
//!
//! The engine observes plain, dynamically keyed objects. `Value` is the
//! dynamic type their fields hold: primitives, nested objects, and reactive
//! wrapper handles.
//!
//! # Equality
//!
//! Primitives compare by value. `Object` and `Reactive` compare by target
//! identity: two handles are equal only when they share the same underlying
//! object. A raw `Object` never equals a `Reactive`, even over the same
//! target, because raw and wrapped handles sit on opposite sides of the
//! interception boundary. `Int` and `Float` never compare equal, even when
//! numerically identical.
//!
//! # Snapshots
//!
//! `to_json` and `from_json` convert between value trees and JSON text.
//! Serialization sees through reactive handles and writes the underlying
//! fields. JSON arrays are rejected: the data model is key-addressed
//! objects only. Cyclic object graphs are not supported by the snapshot.

use serde::ser::{Serialize, Serializer};
use thiserror::Error;

use crate::object::Obj;
use crate::reactive::Reactive;

/// Errors produced by dynamic value conversions.
#[derive(Debug, Error)]
pub enum ValueError {
    /// A typed extraction found a different variant than expected.
    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// The JSON input contained a construct the value model does not
    /// represent.
    #[error("unsupported JSON value: {0}")]
    Unsupported(&'static str),

    /// The JSON input could not be parsed or written.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A dynamically typed value held by an object field.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The absent value. Reading a missing key yields `Null`.
    #[default]
    Null,

    Bool(bool),

    Int(i64),

    Float(f64),

    Str(String),

    /// A plain (unwrapped) object handle. Reads and writes through it are
    /// raw and never touch the dependency graph.
    Object(Obj),

    /// A reactive wrapper handle. Reads track, writes trigger.
    Reactive(Reactive),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Name of the variant, for error messages and debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Object(_) => "object",
            Value::Reactive(_) => "reactive",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric reading: `Int` widens to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Obj> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    pub fn as_reactive(&self) -> Option<&Reactive> {
        match self {
            Value::Reactive(reactive) => Some(reactive),
            _ => None,
        }
    }

    /// Build a fresh value tree from JSON text.
    ///
    /// Every JSON object becomes a new `Obj`; identities are not preserved
    /// across snapshots. Arrays are rejected.
    pub fn from_json(text: &str) -> Result<Value, ValueError> {
        let parsed: serde_json::Value = serde_json::from_str(text)?;
        from_json_value(parsed)
    }

    /// Snapshot this value tree as JSON text.
    ///
    /// Reactive handles serialize as the fields of their target.
    pub fn to_json(&self) -> Result<String, ValueError> {
        Ok(serde_json::to_string(self)?)
    }
}

fn from_json_value(json: serde_json::Value) -> Result<Value, ValueError> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else {
                n.as_f64()
                    .map(Value::Float)
                    .ok_or(ValueError::Unsupported("number"))
            }
        }
        serde_json::Value::String(s) => Ok(Value::Str(s)),
        serde_json::Value::Array(_) => Err(ValueError::Unsupported("array")),
        serde_json::Value::Object(map) => {
            let obj = Obj::new();
            for (key, field) in map {
                obj.set_raw(&key, from_json_value(field)?);
            }
            Ok(Value::Object(obj))
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Reactive(a), Value::Reactive(b)) => a == b,
            _ => false,
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Object(obj) => obj.serialize(serializer),
            Value::Reactive(reactive) => reactive.target().serialize(serializer),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Obj> for Value {
    fn from(value: Obj) -> Self {
        Value::Object(value)
    }
}

impl From<Reactive> for Value {
    fn from(value: Reactive) -> Self {
        Value::Reactive(value)
    }
}

impl TryFrom<Value> for i64 {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => Ok(i),
            other => Err(ValueError::TypeMismatch {
                expected: "int",
                found: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for f64 {
    type Error = ValueError;

    /// Accepts both `Float` and `Int` (widened).
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Int(i) => Ok(i as f64),
            Value::Float(f) => Ok(f),
            other => Err(ValueError::TypeMismatch {
                expected: "float",
                found: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(ValueError::TypeMismatch {
                expected: "bool",
                found: other.type_name(),
            }),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = ValueError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(ValueError::TypeMismatch {
                expected: "string",
                found: other.type_name(),
            }),
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
