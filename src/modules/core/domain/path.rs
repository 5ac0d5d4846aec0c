//! Dotted field paths (`address.city`) over JSON documents

use serde_json::Value;

use super::Document;

/// Look up the value at a dotted path
pub(crate) fn get<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut segments = path.split('.');
    let mut current = doc.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set the value at a dotted path, creating intermediate objects.
///
/// Returns false if an intermediate segment holds a non-object value.
pub(crate) fn set(doc: &mut Document, path: &str, value: Value) -> bool {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
            true
        }
        Some((head, rest)) => {
            let child = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Document::new()));
            match child {
                Value::Object(map) => set(map, rest, value),
                _ => false,
            }
        }
    }
}

/// Remove the value at a dotted path
pub(crate) fn remove(doc: &mut Document, path: &str) -> Option<Value> {
    match path.split_once('.') {
        None => doc.remove(path),
        Some((head, rest)) => match doc.get_mut(head)? {
            Value::Object(map) => remove(map, rest),
            _ => None,
        },
    }
}
