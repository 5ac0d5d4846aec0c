//! Extended URL-encoded form decoding
//!
//! Turns already percent-decoded `key=value` pairs into a JSON value using
//! bracket nesting:
//!
//! - `contact[name]=Alice` builds `{"contact": {"name": "Alice"}}`
//! - `tags[]=a&tags[]=b` and `tags[0]=a&tags[1]=b` build `{"tags": ["a", "b"]}`
//! - a repeated plain key collects its values into an array
//! - numeric top-level keys (`0[email]=...&1[name]=...`) build a top-level
//!   array, which is how a form client sends a `[filter, update]` pair
//!
//! Every scalar is a string.

use contactd_core::{ContactError, Document};
use serde_json::Value;

/// Objects with only index keys up to this bound become arrays
const ARRAY_LIMIT: usize = 20;

/// Nesting deeper than this is kept as a literal key remainder
const MAX_DEPTH: usize = 5;

/// Decode form pairs into a JSON value
pub fn decode_form<I>(pairs: I) -> Result<Value, ContactError>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut root = Document::new();
    for (key, value) in pairs {
        if key.is_empty() {
            continue;
        }
        let segments = split_key(&key);
        insert(&mut root, &segments, value)?;
    }
    Ok(compact(Value::Object(root)))
}

/// Split `a[b][c]` into `["a", "b", "c"]`
fn split_key(key: &str) -> Vec<String> {
    let Some(open) = key.find('[') else {
        return vec![key.to_string()];
    };
    if open == 0 || !key.ends_with(']') {
        return vec![key.to_string()];
    }

    let mut segments = vec![key[..open].to_string()];
    let inner = &key[open + 1..key.len() - 1];
    let mut parts = inner.split("][");
    for part in parts.by_ref().take(MAX_DEPTH) {
        segments.push(part.to_string());
    }
    let remainder: Vec<&str> = parts.collect();
    if !remainder.is_empty() {
        segments.push(format!("[{}]", remainder.join("][")));
    }
    segments
}

fn insert(map: &mut Document, segments: &[String], value: String) -> Result<(), ContactError> {
    let Some((first, rest)) = segments.split_first() else {
        return Ok(());
    };
    let key = if first.is_empty() {
        next_index(map).to_string()
    } else {
        first.clone()
    };

    if rest.is_empty() {
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(Value::String(value)),
            Some(existing @ Value::String(_)) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, Value::String(value)]);
            }
            Some(_) => return Err(conflict(&key)),
            None => {
                map.insert(key, Value::String(value));
            }
        }
        return Ok(());
    }

    match map
        .entry(key.clone())
        .or_insert_with(|| Value::Object(Document::new()))
    {
        Value::Object(child) => insert(child, rest, value),
        _ => Err(conflict(&key)),
    }
}

/// One past the largest index key already present
fn next_index(map: &Document) -> usize {
    map.keys()
        .filter_map(|k| k.parse::<usize>().ok())
        .max()
        .map_or(0, |max| max + 1)
}

fn conflict(key: &str) -> ContactError {
    ContactError::InvalidBody(format!("form field '{}' is both a value and a group", key))
}

/// Turn index-keyed objects into arrays, recursively
fn compact(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Document = map.into_iter().map(|(k, v)| (k, compact(v))).collect();
            let is_array = !map.is_empty()
                && map
                    .keys()
                    .all(|k| k.parse::<usize>().map(|i| i <= ARRAY_LIMIT).unwrap_or(false));
            if !is_array {
                return Value::Object(map);
            }
            let mut indexed: Vec<(usize, Value)> = map
                .into_iter()
                .filter_map(|(k, v)| k.parse::<usize>().ok().map(|i| (i, v)))
                .collect();
            indexed.sort_by_key(|(index, _)| *index);
            Value::Array(indexed.into_iter().map(|(_, v)| v).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(compact).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(pairs: &[(&str, &str)]) -> Value {
        decode_form(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string()))).unwrap()
    }

    #[test]
    fn test_flat_fields() {
        assert_eq!(
            decode(&[("name", "Alice"), ("email", "a@x.com")]),
            json!({ "name": "Alice", "email": "a@x.com" })
        );
    }

    #[test]
    fn test_empty_form_is_empty_object() {
        assert_eq!(decode(&[]), json!({}));
    }

    #[test]
    fn test_nested_objects() {
        assert_eq!(
            decode(&[("address[city]", "Oslo"), ("address[geo][lat]", "59.9")]),
            json!({ "address": { "city": "Oslo", "geo": { "lat": "59.9" } } })
        );
    }

    #[test]
    fn test_arrays() {
        assert_eq!(
            decode(&[("tags[]", "a"), ("tags[]", "b"), ("ids[1]", "y"), ("ids[0]", "x")]),
            json!({ "tags": ["a", "b"], "ids": ["x", "y"] })
        );
    }

    #[test]
    fn test_append_after_explicit_index() {
        assert_eq!(
            decode(&[("ids[1]", "y"), ("ids[]", "x")]),
            json!({ "ids": ["y", "x"] })
        );
        assert_eq!(
            decode(&[("ids[]", "a"), ("ids[5]", "b"), ("ids[]", "c")]),
            json!({ "ids": ["a", "b", "c"] })
        );
    }

    #[test]
    fn test_repeated_plain_key_collects_values() {
        assert_eq!(
            decode(&[("topic", "sales"), ("topic", "support"), ("topic", "billing")]),
            json!({ "topic": ["sales", "support", "billing"] })
        );
    }

    #[test]
    fn test_large_indices_stay_objects() {
        assert_eq!(decode(&[("n[100]", "x")]), json!({ "n": { "100": "x" } }));
    }

    #[test]
    fn test_top_level_pair() {
        assert_eq!(
            decode(&[("0[email]", "a@x.com"), ("1[name]", "Alicia")]),
            json!([{ "email": "a@x.com" }, { "name": "Alicia" }])
        );
    }

    #[test]
    fn test_malformed_brackets_are_literal() {
        assert_eq!(decode(&[("a[b", "1"), ("[c]", "2")]), json!({ "a[b": "1", "[c]": "2" }));
    }

    #[test]
    fn test_depth_limit_keeps_remainder() {
        assert_eq!(
            decode(&[("a[b][c][d][e][f][g]", "1")]),
            json!({ "a": { "b": { "c": { "d": { "e": { "f": { "[g]": "1" } } } } } } })
        );
    }

    #[test]
    fn test_value_and_group_conflict() {
        let result = decode_form(vec![
            ("name".to_string(), "Alice".to_string()),
            ("name[first]".to_string(), "A".to_string()),
        ]);
        assert!(matches!(result, Err(ContactError::InvalidBody(_))));
    }
}
