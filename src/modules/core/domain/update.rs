//! Update documents and the `[filter, update]` request pair

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use super::contact::json_type_name;
use super::{path, Document, Filter};
use crate::error::{ContactError, Result};

/// An update in operator form, e.g. `{"$set": {"name": "Alice"}}`.
///
/// Plain fields in the submitted body are gathered under `$set`, so
/// `{"name": "Alice"}` and `{"$set": {"name": "Alice"}}` are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Update(Document);

impl Update {
    /// Normalise a decoded request body into operator form
    pub fn from_body(body: Value) -> Result<Self> {
        let fields = match body {
            Value::Object(fields) => fields,
            Value::Null => return Ok(Self::default()),
            other => {
                return Err(ContactError::InvalidUpdate(format!(
                    "expected a JSON object, got {}",
                    json_type_name(&other)
                )))
            }
        };

        let mut operators = Document::new();
        let mut plain = Document::new();
        for (key, value) in fields {
            if !key.starts_with('$') {
                plain.insert(key, value);
                continue;
            }
            let Value::Object(args) = value else {
                return Err(ContactError::InvalidUpdate(format!(
                    "{} expects an object",
                    key
                )));
            };
            match operators.get_mut(&key) {
                Some(Value::Object(existing)) => existing.extend(args),
                _ => {
                    operators.insert(key, Value::Object(args));
                }
            }
        }
        if !plain.is_empty() {
            match operators.get_mut("$set") {
                Some(Value::Object(set)) => set.extend(plain),
                _ => {
                    operators.insert("$set".to_string(), Value::Object(plain));
                }
            }
        }

        operators.retain(|_, args| args.as_object().map(|a| !a.is_empty()).unwrap_or(true));
        for args in operators.values() {
            if let Some(args) = args.as_object() {
                if args.keys().any(|k| k == "_id" || k.starts_with("_id.")) {
                    return Err(ContactError::InvalidUpdate(
                        "the field '_id' is immutable".to_string(),
                    ));
                }
            }
        }

        Ok(Self(operators))
    }

    /// True when applying the update changes nothing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_document(&self) -> &Document {
        &self.0
    }

    pub fn into_document(self) -> Document {
        self.0
    }

    /// Apply the update to a document in place.
    ///
    /// Supports `$set`, `$unset` and `$inc`. The document is left untouched
    /// if any operator fails.
    pub fn apply(&self, doc: &mut Document) -> Result<()> {
        let mut updated = doc.clone();
        for (op, args) in &self.0 {
            let Value::Object(args) = args else {
                continue;
            };
            for (field, value) in args {
                match op.as_str() {
                    "$set" => {
                        if !path::set(&mut updated, field, value.clone()) {
                            return Err(ContactError::InvalidUpdate(format!(
                                "cannot create field '{}' inside a non-object",
                                field
                            )));
                        }
                    }
                    "$unset" => {
                        path::remove(&mut updated, field);
                    }
                    "$inc" => {
                        let current = path::get(&updated, field).cloned();
                        let sum = increment(field, current.as_ref(), value)?;
                        if !path::set(&mut updated, field, sum) {
                            return Err(ContactError::InvalidUpdate(format!(
                                "cannot create field '{}' inside a non-object",
                                field
                            )));
                        }
                    }
                    _ => {
                        return Err(ContactError::InvalidUpdate(format!(
                            "unsupported operator: {}",
                            op
                        )))
                    }
                }
            }
        }
        *doc = updated;
        Ok(())
    }
}

fn increment(field: &str, current: Option<&Value>, by: &Value) -> Result<Value> {
    let Value::Number(by) = by else {
        return Err(ContactError::InvalidUpdate(format!(
            "$inc on '{}' needs a number",
            field
        )));
    };
    let current = match current {
        None | Some(Value::Null) => return Ok(Value::Number(by.clone())),
        Some(Value::Number(n)) => n,
        Some(other) => {
            return Err(ContactError::InvalidUpdate(format!(
                "cannot $inc '{}' of type {}",
                field,
                json_type_name(other)
            )))
        }
    };
    if let (Some(a), Some(b)) = (current.as_i64(), by.as_i64()) {
        if let Some(sum) = a.checked_add(b) {
            return Ok(Value::Number(sum.into()));
        }
    }
    let sum = current.as_f64().unwrap_or(0.0) + by.as_f64().unwrap_or(0.0);
    Number::from_f64(sum)
        .map(Value::Number)
        .ok_or_else(|| ContactError::InvalidUpdate(format!("$inc on '{}' overflowed", field)))
}

/// The filter and update a patch route hands to storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateRequest {
    pub filter: Filter,
    pub update: Update,
}

impl UpdateRequest {
    /// Parse the `[filter, update]` body of `PATCH /contact/update`.
    ///
    /// Missing elements are treated as empty; extra elements are ignored.
    pub fn from_body(body: Value) -> Result<Self> {
        let items = match body {
            Value::Array(items) => items,
            other => {
                return Err(ContactError::InvalidBody(format!(
                    "expected a [filter, update] array, got {}",
                    json_type_name(&other)
                )))
            }
        };
        let mut items = items.into_iter();
        let filter = Filter::from_body(items.next().unwrap_or(Value::Null))?;
        let update = Update::from_body(items.next().unwrap_or(Value::Null))?;
        Ok(Self { filter, update })
    }

    /// Parse the body of `PATCH /contact/{id}/update`.
    ///
    /// Accepts the same `[filter, update]` pair (the filter element is
    /// ignored in favour of the path id) or a bare update object.
    pub fn for_id(id: &str, body: Value) -> Result<Self> {
        let filter = Filter::by_id(id)?;
        let update = match body {
            Value::Array(items) => items.into_iter().nth(1).unwrap_or(Value::Null),
            other => other,
        };
        Ok(Self {
            filter,
            update: Update::from_body(update)?,
        })
    }
}
