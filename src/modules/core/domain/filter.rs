//! Partial-match filters used to select records for update and delete

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::contact::{is_object_id, json_type_name};
use super::{path, Document};
use crate::error::{ContactError, Result};

/// A filter document such as `{"email": "a@x.com"}`.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Filter(Document);

impl Filter {
    /// Filter matching every record
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter matching the record with the given id
    pub fn by_id(id: &str) -> Result<Self> {
        if !is_object_id(id) {
            return Err(ContactError::InvalidId(id.to_string()));
        }
        let mut doc = Document::new();
        doc.insert("_id".to_string(), Value::String(id.to_ascii_lowercase()));
        Ok(Self(doc))
    }

    /// Build a filter from a decoded request body.
    ///
    /// `null` (no body) is the empty filter. Well-formed ids under `_id`,
    /// bare or as `$eq`/`$ne`/`$in`/`$nin` operands, are normalised to
    /// lowercase hex so they compare equal to stored ids.
    pub fn from_body(body: Value) -> Result<Self> {
        let mut doc = match body {
            Value::Object(doc) => doc,
            Value::Null => return Ok(Self::all()),
            other => {
                return Err(ContactError::InvalidFilter(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };
        if let Some(id) = doc.get_mut("_id") {
            normalise_id(id);
        }
        Ok(Self(doc))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `_id` this filter pins, if it is a plain id match
    pub fn id(&self) -> Option<&str> {
        self.0.get("_id").and_then(Value::as_str)
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    /// Evaluate the filter against a stored document.
    ///
    /// Supports field equality (including membership in array fields) and
    /// the `$eq`, `$ne`, `$in`, `$nin` and `$exists` operators.
    pub fn matches(&self, doc: &Document) -> Result<bool> {
        for (key, expected) in &self.0 {
            if key.starts_with('$') {
                return Err(ContactError::InvalidFilter(format!(
                    "unsupported top-level operator: {}",
                    key
                )));
            }
            if !field_matches(path::get(doc, key), expected)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Lowercase a hex id, or the hex ids in the operands of an id operator object
fn normalise_id(value: &mut Value) {
    match value {
        Value::String(id) => {
            if is_object_id(id) {
                id.make_ascii_lowercase();
            }
        }
        Value::Object(operators) => {
            for (op, operand) in operators.iter_mut() {
                match (op.as_str(), operand) {
                    ("$eq" | "$ne", operand) => normalise_id(operand),
                    ("$in" | "$nin", Value::Array(ids)) => ids.iter_mut().for_each(normalise_id),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn is_operator_object(value: &Value) -> bool {
    match value {
        Value::Object(map) => !map.is_empty() && map.keys().all(|k| k.starts_with('$')),
        _ => false,
    }
}

fn equals(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        Some(Value::Array(items)) if !expected.is_array() => items.contains(expected),
        Some(actual) => actual == expected,
        // A missing field matches an explicit null
        None => expected.is_null(),
    }
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> Result<bool> {
    if !is_operator_object(expected) {
        return Ok(equals(actual, expected));
    }
    let Value::Object(operators) = expected else {
        return Ok(false);
    };
    for (op, operand) in operators {
        let ok = match op.as_str() {
            "$eq" => equals(actual, operand),
            "$ne" => !equals(actual, operand),
            "$in" => in_list(op, actual, operand)?,
            "$nin" => !in_list(op, actual, operand)?,
            "$exists" => actual.is_some() == truthy(operand),
            _ => {
                return Err(ContactError::InvalidFilter(format!(
                    "unsupported operator: {}",
                    op
                )))
            }
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn in_list(op: &str, actual: Option<&Value>, operand: &Value) -> Result<bool> {
    let Value::Array(candidates) = operand else {
        return Err(ContactError::InvalidFilter(format!("{} needs an array", op)));
    };
    Ok(candidates.iter().any(|c| equals(actual, c)))
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    fn alice() -> Document {
        doc(json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "name": "Alice",
            "email": "a@x.com",
            "tags": ["sales", "urgent"],
            "address": { "city": "Oslo" }
        }))
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(Filter::all().matches(&alice()).unwrap());
        assert!(Filter::from_body(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_field_equality() {
        let filter = Filter::from_body(json!({ "name": "Alice" })).unwrap();
        assert!(filter.matches(&alice()).unwrap());

        let filter = Filter::from_body(json!({ "name": "Alice", "email": "b@x.com" })).unwrap();
        assert!(!filter.matches(&alice()).unwrap());
    }

    #[test]
    fn test_dotted_path_and_array_membership() {
        let filter = Filter::from_body(json!({ "address.city": "Oslo", "tags": "urgent" })).unwrap();
        assert!(filter.matches(&alice()).unwrap());
    }

    #[test]
    fn test_operators() {
        let filter = Filter::from_body(json!({
            "name": { "$in": ["Alice", "Bob"] },
            "phone": { "$exists": false },
            "email": { "$ne": "b@x.com" }
        }))
        .unwrap();
        assert!(filter.matches(&alice()).unwrap());

        let filter = Filter::from_body(json!({ "name": { "$nin": ["Alice"] } })).unwrap();
        assert!(!filter.matches(&alice()).unwrap());
    }

    #[test]
    fn test_unsupported_operator_is_rejected() {
        let filter = Filter::from_body(json!({ "name": { "$regex": "^A" } })).unwrap();
        assert!(matches!(
            filter.matches(&alice()),
            Err(ContactError::InvalidFilter(_))
        ));

        let filter = Filter::from_body(json!({ "$or": [] })).unwrap();
        assert!(filter.matches(&alice()).is_err());
    }

    #[test]
    fn test_by_id_normalises_case() {
        let filter = Filter::by_id("65A1F0C2E4B0A1B2C3D4E5F6").unwrap();
        assert_eq!(filter.id(), Some("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert!(filter.matches(&alice()).unwrap());
    }

    #[test]
    fn test_from_body_normalises_id_operands() {
        let upper = "65A1F0C2E4B0A1B2C3D4E5F6";
        let filter = Filter::from_body(json!({
            "_id": { "$in": [upper, "custom"], "$ne": "000000000000000000000000" }
        }))
        .unwrap();
        assert_eq!(
            Value::Object(filter.as_document().clone()),
            json!({
                "_id": {
                    "$in": ["65a1f0c2e4b0a1b2c3d4e5f6", "custom"],
                    "$ne": "000000000000000000000000"
                }
            })
        );
        assert!(filter.matches(&alice()).unwrap());

        let filter = Filter::from_body(json!({ "_id": { "$eq": upper } })).unwrap();
        assert!(filter.matches(&alice()).unwrap());
    }

    #[test]
    fn test_by_id_rejects_malformed_id() {
        assert!(matches!(
            Filter::by_id("42"),
            Err(ContactError::InvalidId(id)) if id == "42"
        ));
    }

    #[test]
    fn test_from_body_rejects_non_objects() {
        assert!(matches!(
            Filter::from_body(json!("name")),
            Err(ContactError::InvalidFilter(_))
        ));
    }
}
