//! Store Keys and Values
//!
//! Keys and values held by a context node's store. Both are closed variants so
//! that typed reads are a `match` instead of a runtime type inspection.

use crate::keys::ReservedKey;
use std::any::Any;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Key of a context store entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Str(String),
    Int(i64),
    Reserved(ReservedKey),
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        match ReservedKey::from_name(s) {
            Some(reserved) => Key::Reserved(reserved),
            None => Key::Str(s.to_string()),
        }
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        match ReservedKey::from_name(&s) {
            Some(reserved) => Key::Reserved(reserved),
            None => Key::Str(s),
        }
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::from(s.as_str())
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Int(n)
    }
}

impl From<ReservedKey> for Key {
    fn from(k: ReservedKey) -> Self {
        Key::Reserved(k)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Str(s) => f.write_str(s),
            Key::Int(n) => write!(f, "{}", n),
            Key::Reserved(k) => write!(f, "{}", k),
        }
    }
}

/// Value stored in a context node.
///
/// `Error` and `Opaque` share their payload; cloning a value never deep-copies
/// it, and two such values compare equal only when they point at the same
/// allocation.
#[derive(Clone)]
pub enum Value {
    Str(String),
    Bool(bool),
    Int(i64),
    Float32(f32),
    Float64(f64),
    Json(serde_json::Value),
    Error(Arc<dyn StdError + Send + Sync>),
    Opaque(Arc<dyn Any + Send + Sync>),
}

impl Value {
    /// Wrap an error so it can be stored or attached to an error record.
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Value::Error(Arc::new(err))
    }

    /// Wrap an arbitrary value; read it back with [`Value::downcast_ref`].
    pub fn opaque<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Value::Opaque(Arc::new(value))
    }

    /// Type name used in conversion failure messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Str(_) => "string",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float32(_) => "float32",
            Value::Float64(_) => "float64",
            Value::Json(_) => "json",
            Value::Error(_) => "error",
            Value::Opaque(_) => "opaque",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
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
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::Float32(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_error(&self) -> Option<&(dyn StdError + Send + Sync + 'static)> {
        match self {
            Value::Error(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Opaque(v) => v.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// Type name of a possibly absent value.
pub(crate) fn describe(value: Option<&Value>) -> &'static str {
    value.map(Value::type_name).unwrap_or("nil")
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float32(x) => f.debug_tuple("Float32").field(x).finish(),
            Value::Float64(x) => f.debug_tuple("Float64").field(x).finish(),
            Value::Json(j) => f.debug_tuple("Json").field(j).finish(),
            Value::Error(e) => f.debug_tuple("Error").field(&e.to_string()).finish(),
            Value::Opaque(_) => f.write_str("Opaque(..)"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float32(x) => write!(f, "{}", x),
            Value::Float64(x) => write!(f, "{}", x),
            Value::Json(j) => write!(f, "{}", j),
            Value::Error(e) => write!(f, "{}", e),
            Value::Opaque(_) => f.write_str("<opaque>"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => a == b,
            (Value::Float64(a), Value::Float64(b)) => a == b,
            (Value::Json(a), Value::Json(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => Arc::ptr_eq(a, b),
            (Value::Opaque(a), Value::Opaque(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<f32> for Value {
    fn from(x: f32) -> Self {
        Value::Float32(x)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float64(x)
    }
}

impl From<serde_json::Value> for Value {
    fn from(j: serde_json::Value) -> Self {
        Value::Json(j)
    }
}
