use std::collections::BTreeMap;

use tracing::debug;

use crate::value::Value;

/// The working variable context. Built incrementally from (path, value)
/// pairs; a repeated terminal path aggregates into a list instead of
/// overwriting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    root: BTreeMap<String, Value>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(root: BTreeMap<String, Value>) -> Self {
        Self { root }
    }

    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.root
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.root
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    /// Insert a (path, value) pair, creating intermediate map nodes for
    /// every segment except the last. A write whose path crosses an
    /// existing non-map value is dropped; the first writer decides the
    /// structure.
    pub fn set(&mut self, path: &[String], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut node = &mut self.root;
        for segment in parents {
            let entry = node
                .entry(segment.clone())
                .or_insert_with(|| Value::Map(BTreeMap::new()));
            match entry {
                Value::Map(child) => node = child,
                other => {
                    debug!(segment = %segment, kind = ?other.kind(), "dropping write under non-map key");
                    return;
                }
            }
        }
        match node.remove(last) {
            None => {
                node.insert(last.clone(), value);
            }
            Some(existing) => {
                node.insert(last.clone(), aggregate(existing, value));
            }
        }
    }
}

/// Aggregation on a repeated terminal path. Two scalars of one kind become
/// a two-element homogeneous list in encounter order; a matching scalar
/// appends to a homogeneous list; every other pairing degrades to the
/// heterogeneous form, and a heterogeneous path stays heterogeneous.
fn aggregate(existing: Value, new: Value) -> Value {
    use Value::*;
    match (existing, new) {
        (Bool(a), Bool(b)) => Bools(vec![a, b]),
        (Int(a), Int(b)) => Ints(vec![a, b]),
        (Float(a), Float(b)) => Floats(vec![a, b]),
        (Time(a), Time(b)) => Times(vec![a, b]),
        (Str(a), Str(b)) => Strs(vec![a, b]),
        (Bools(mut xs), Bool(b)) => {
            xs.push(b);
            Bools(xs)
        }
        (Ints(mut xs), Int(b)) => {
            xs.push(b);
            Ints(xs)
        }
        (Floats(mut xs), Float(b)) => {
            xs.push(b);
            Floats(xs)
        }
        (Times(mut xs), Time(b)) => {
            xs.push(b);
            Times(xs)
        }
        (Strs(mut xs), Str(b)) => {
            xs.push(b);
            Strs(xs)
        }
        (List(mut xs), other) => {
            xs.push(other);
            List(xs)
        }
        (mismatched, other) => {
            let mut xs = mismatched.into_list_elements();
            xs.push(other);
            List(xs)
        }
    }
}
