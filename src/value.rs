use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::ser::{Serialize, Serializer};

/// Kind tags for `Value`. All "what kind is this" decisions are pattern
/// matches over these, never runtime reflection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Null,
    Bool,
    Int,
    Float,
    Time,
    Str,
    List,
    Map,
}

/// A context value. Scalars carry the kinds the type inferencer can
/// produce; the `Bools`/`Ints`/`Floats`/`Times`/`Strs` variants are
/// homogeneous lists, `List` is the heterogeneous fallback with boxed
/// generic elements.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Time(NaiveDateTime),
    Str(String),
    Bools(Vec<bool>),
    Ints(Vec<i64>),
    Floats(Vec<f64>),
    Times(Vec<NaiveDateTime>),
    Strs(Vec<String>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Time(_) => Kind::Time,
            Value::Str(_) => Kind::Str,
            Value::Bools(_)
            | Value::Ints(_)
            | Value::Floats(_)
            | Value::Times(_)
            | Value::Strs(_)
            | Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
        }
    }

    /// The kind of a scalar value; `None` for lists, maps and null.
    pub fn scalar_kind(&self) -> Option<Kind> {
        match self {
            Value::Bool(_) => Some(Kind::Bool),
            Value::Int(_) => Some(Kind::Int),
            Value::Float(_) => Some(Kind::Float),
            Value::Time(_) => Some(Kind::Time),
            Value::Str(_) => Some(Kind::Str),
            _ => None,
        }
    }

    pub fn is_list(&self) -> bool {
        self.kind() == Kind::List
    }

    /// The element kind of a homogeneous list; `None` for everything else,
    /// including the heterogeneous `List`.
    pub fn list_kind(&self) -> Option<Kind> {
        match self {
            Value::Bools(_) => Some(Kind::Bool),
            Value::Ints(_) => Some(Kind::Int),
            Value::Floats(_) => Some(Kind::Float),
            Value::Times(_) => Some(Kind::Time),
            Value::Strs(_) => Some(Kind::Str),
            _ => None,
        }
    }

    /// Elements of any list form, boxed generically. A non-list becomes a
    /// single-element vector, which is how a scalar degrades when its path
    /// turns heterogeneous.
    pub fn into_list_elements(self) -> Vec<Value> {
        match self {
            Value::Bools(xs) => xs.into_iter().map(Value::Bool).collect(),
            Value::Ints(xs) => xs.into_iter().map(Value::Int).collect(),
            Value::Floats(xs) => xs.into_iter().map(Value::Float).collect(),
            Value::Times(xs) => xs.into_iter().map(Value::Time).collect(),
            Value::Strs(xs) => xs.into_iter().map(Value::Str).collect(),
            Value::List(xs) => xs,
            other => vec![other],
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

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    pub fn into_str(self) -> Option<String> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
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

/// Hand-off surface: the template engine and the debug dump both consume
/// the context through serde. Timestamps serialize in chrono's ISO-8601
/// text form.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Time(t) => t.serialize(serializer),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Bools(xs) => xs.serialize(serializer),
            Value::Ints(xs) => xs.serialize(serializer),
            Value::Floats(xs) => xs.serialize(serializer),
            Value::Times(xs) => xs.serialize(serializer),
            Value::Strs(xs) => xs.serialize(serializer),
            Value::List(xs) => xs.serialize(serializer),
            Value::Map(m) => m.serialize(serializer),
        }
    }
}
