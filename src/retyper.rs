use std::collections::BTreeMap;

use itertools::Itertools;
use tracing::warn;

use crate::typer;
use crate::value::{Kind, Value};

/// Options for the retyping pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct RetypeOptions {
    /// Unwrap single-element lists into their one element.
    pub collapse_single: bool,
}

/// Recursively canonicalize a context map: bare strings go back through
/// the type inferencer, uniform generic lists specialize into homogeneous
/// typed lists, and (optionally) single-element lists collapse. Applying
/// the pass twice with the same options is stable.
pub fn retype_map(
    map: BTreeMap<String, Value>,
    opts: RetypeOptions,
    time_format: &str,
) -> BTreeMap<String, Value> {
    map.into_iter()
        .map(|(key, value)| (key, retype_value(value, opts, time_format)))
        .collect()
}

pub fn retype_value(value: Value, opts: RetypeOptions, time_format: &str) -> Value {
    match value {
        Value::Map(m) => Value::Map(retype_map(m, opts, time_format)),
        Value::List(items) => retype_list(items, opts, time_format),
        Value::Str(s) => typer::infer(&s, time_format),
        Value::Null => {
            // Non-fatal anomaly; the value passes through unchanged.
            warn!("unexpected null value during retyping");
            Value::Null
        }
        // Typed scalars and homogeneous lists are already canonical and
        // are never re-stringified, which is what makes the pass converge.
        other => other,
    }
}

fn retype_list(items: Vec<Value>, opts: RetypeOptions, time_format: &str) -> Value {
    if opts.collapse_single && items.len() == 1 {
        let single = items.into_iter().next();
        return match single {
            Some(value) => retype_value(value, opts, time_format),
            None => Value::List(Vec::new()),
        };
    }

    // The kinds recognized here are exactly the inferencer's output kinds.
    let kinds: Option<Vec<Kind>> = items.iter().map(Value::scalar_kind).collect();
    match kinds {
        Some(kinds) if items.len() >= 2 && kinds.iter().all_equal() => {
            specialize(kinds[0], items)
        }
        _ => Value::List(
            items
                .into_iter()
                .map(|element| match element {
                    Value::Map(_) | Value::List(_) => retype_value(element, opts, time_format),
                    other => other,
                })
                .collect(),
        ),
    }
}

fn specialize(kind: Kind, items: Vec<Value>) -> Value {
    match kind {
        Kind::Bool => Value::Bools(items.iter().filter_map(Value::as_bool).collect()),
        Kind::Int => Value::Ints(items.iter().filter_map(Value::as_int).collect()),
        Kind::Float => Value::Floats(items.iter().filter_map(Value::as_float).collect()),
        Kind::Time => Value::Times(items.iter().filter_map(Value::as_time).collect()),
        Kind::Str => Value::Strs(items.into_iter().filter_map(Value::into_str).collect()),
        _ => Value::List(items),
    }
}
