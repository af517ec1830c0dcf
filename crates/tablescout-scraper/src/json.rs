//! Lookups over untyped page-state JSON.

use serde_json::Value;
use tablescout_core::parse_compact_count;

/// String at a JSON pointer, trimmed; `None` when absent or blank.
pub(crate) fn str_at(value: &Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Count at a JSON pointer; accepts numbers and compact-count strings.
pub(crate) fn count_at(value: &Value, pointer: &str) -> u64 {
    value.pointer(pointer).map_or(0, as_count)
}

/// Interprets a JSON value as a non-negative count.
pub(crate) fn as_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let rounded = n
                .as_f64()
                .filter(|f| f.is_finite() && *f > 0.0)
                .map_or(0, |f| f.round() as u64);
            rounded
        }),
        Value::String(s) => parse_compact_count(s),
        _ => 0,
    }
}

/// Float at a JSON pointer; accepts numbers and numeric strings.
pub(crate) fn f64_at(value: &Value, pointer: &str) -> f64 {
    match value.pointer(pointer) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    }
    .max(0.0)
}

/// Joins the `text` of every run in a `{ "runs": [...] }` object, or returns
/// `simpleText`/`content`, whichever the node carries.
pub(crate) fn text_of(node: &Value) -> Option<String> {
    if let Some(s) = node.as_str() {
        return Some(s.trim().to_owned()).filter(|s| !s.is_empty());
    }
    for key in ["simpleText", "content"] {
        if let Some(s) = node.get(key).and_then(Value::as_str) {
            return Some(s.trim().to_owned()).filter(|s| !s.is_empty());
        }
    }
    let runs = node.get("runs")?.as_array()?;
    let joined: String = runs
        .iter()
        .filter_map(|r| r.get("text").and_then(Value::as_str))
        .collect();
    Some(joined.trim().to_owned()).filter(|s| !s.is_empty())
}

/// Depth-first search for the first object stored under `key`.
pub(crate) fn find_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_key(v, key)),
        _ => None,
    }
}

/// Collects every object stored under `key`, depth-first, up to `limit`.
pub(crate) fn collect_key<'a>(value: &'a Value, key: &str, limit: usize) -> Vec<&'a Value> {
    fn walk<'a>(value: &'a Value, key: &str, limit: usize, out: &mut Vec<&'a Value>) {
        if out.len() >= limit {
            return;
        }
        match value {
            Value::Object(map) => {
                for (k, v) in map {
                    if out.len() >= limit {
                        return;
                    }
                    if k == key {
                        out.push(v);
                    } else {
                        walk(v, key, limit, out);
                    }
                }
            }
            Value::Array(items) => {
                for v in items {
                    walk(v, key, limit, out);
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(value, key, limit, &mut out);
    out
}

/// Depth-first search for the first object satisfying `pred`.
pub(crate) fn find_object<'a>(value: &'a Value, pred: &dyn Fn(&Value) -> bool) -> Option<&'a Value> {
    if value.is_object() && pred(value) {
        return Some(value);
    }
    match value {
        Value::Object(map) => map.values().find_map(|v| find_object(v, pred)),
        Value::Array(items) => items.iter().find_map(|v| find_object(v, pred)),
        _ => None,
    }
}
