use std::collections::BTreeMap;

use crate::value::Value;

/// Non-destructive deep merge of loaded defaults into a context map.
/// Context keys always win: an absent key is inserted, lists on both
/// sides concatenate with the context's elements first, nested maps merge
/// per key, and any other double occupancy keeps the context's value.
pub fn merge_defaults(ctx: &mut BTreeMap<String, Value>, defaults: BTreeMap<String, Value>) {
    for (key, incoming) in defaults {
        match ctx.remove(&key) {
            None => {
                ctx.insert(key, incoming);
            }
            Some(existing) => {
                ctx.insert(key, merge_value(existing, incoming));
            }
        }
    }
}

fn merge_value(existing: Value, incoming: Value) -> Value {
    match (existing, incoming) {
        (Value::Map(mut a), Value::Map(b)) => {
            merge_defaults(&mut a, b);
            Value::Map(a)
        }
        (a, b) if a.is_list() && b.is_list() => concat_lists(a, b),
        (a, _) => a,
    }
}

// Same-kind homogeneous lists stay typed; any other pairing degrades to a
// heterogeneous list, still context-first.
fn concat_lists(a: Value, b: Value) -> Value {
    use Value::*;
    match (a, b) {
        (Bools(mut x), Bools(y)) => {
            x.extend(y);
            Bools(x)
        }
        (Ints(mut x), Ints(y)) => {
            x.extend(y);
            Ints(x)
        }
        (Floats(mut x), Floats(y)) => {
            x.extend(y);
            Floats(x)
        }
        (Times(mut x), Times(y)) => {
            x.extend(y);
            Times(x)
        }
        (Strs(mut x), Strs(y)) => {
            x.extend(y);
            Strs(x)
        }
        (a, b) => {
            let mut xs = a.into_list_elements();
            xs.extend(b.into_list_elements());
            List(xs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: Vec<(&str, Value)>) -> BTreeMap<String, Value> {
        entries.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn absent_keys_are_inserted() {
        let mut ctx = map(vec![("A", Value::Int(1))]);
        merge_defaults(&mut ctx, map(vec![("B", Value::Int(2))]));
        assert_eq!(ctx.get("B"), Some(&Value::Int(2)));
    }

    #[test]
    fn context_scalars_win_unconditionally() {
        let mut ctx = map(vec![("A", Value::Int(1))]);
        merge_defaults(&mut ctx, map(vec![("A", Value::Str("file".to_string()))]));
        assert_eq!(ctx.get("A"), Some(&Value::Int(1)));
    }

    #[test]
    fn lists_on_both_sides_concatenate_context_first() {
        let mut ctx = map(vec![("X", Value::Ints(vec![1, 2]))]);
        merge_defaults(&mut ctx, map(vec![("X", Value::Ints(vec![3, 4]))]));
        assert_eq!(ctx.get("X"), Some(&Value::Ints(vec![1, 2, 3, 4])));
    }

    #[test]
    fn mixed_kind_lists_concatenate_heterogeneously() {
        let mut ctx = map(vec![("X", Value::Ints(vec![1]))]);
        merge_defaults(&mut ctx, map(vec![("X", Value::Strs(vec!["a".to_string()]))]));
        assert_eq!(
            ctx.get("X"),
            Some(&Value::List(vec![Value::Int(1), "a".into()]))
        );
    }

    #[test]
    fn nested_maps_merge_per_key() {
        let mut ctx = map(vec![("Db", Value::Map(map(vec![("Host", "cli".into())])))]);
        merge_defaults(
            &mut ctx,
            map(vec![(
                "Db",
                Value::Map(map(vec![("Host", "file".into()), ("Port", Value::Int(5432))])),
            )]),
        );
        let Some(Value::Map(db)) = ctx.get("Db") else {
            panic!("expected a map under Db");
        };
        assert_eq!(db.get("Host"), Some(&"cli".into()));
        assert_eq!(db.get("Port"), Some(&Value::Int(5432)));
    }

    #[test]
    fn list_of_maps_keeps_elements_intact_and_ordered() {
        let first = Value::Map(map(vec![
            ("UBUNTU", Value::Float(16.04)),
            ("OSID", "ubu1604".into()),
        ]));
        let second = Value::Map(map(vec![
            ("UBUNTU", Value::Float(18.04)),
            ("OSID", "ubu1804".into()),
        ]));
        let mut ctx = map(vec![("OSLIST", Value::List(vec![first.clone()]))]);
        merge_defaults(
            &mut ctx,
            map(vec![("OSLIST", Value::List(vec![second.clone()]))]),
        );
        assert_eq!(ctx.get("OSLIST"), Some(&Value::List(vec![first, second])));
    }
}
