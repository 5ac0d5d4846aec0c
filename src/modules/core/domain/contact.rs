//! Contact request record

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ContactError, Result};

/// Schemaless JSON object, as stored and returned
pub type Document = serde_json::Map<String, Value>;

/// Returns true if `s` is a 24-character hex ObjectId
pub fn is_object_id(s: &str) -> bool {
    s.len() == 24 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// A stored contact inquiry: an assigned `_id` plus whatever fields were submitted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(flatten)]
    pub fields: Document,
}

impl ContactRequest {
    pub fn new(id: impl Into<String>, fields: Document) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Extract the fields of a new record from a create body.
    ///
    /// A client supplied `_id` is dropped; the store assigns identifiers.
    pub fn fields_from_body(body: Value) -> Result<Document> {
        match body {
            Value::Object(mut fields) => {
                fields.remove("_id");
                Ok(fields)
            }
            Value::Null => Ok(Document::new()),
            other => Err(ContactError::InvalidBody(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Split a stored document into id and fields
    pub fn from_document(mut doc: Document) -> Result<Self> {
        match doc.remove("_id") {
            Some(Value::String(id)) => Ok(Self::new(id, doc)),
            Some(other) => Err(ContactError::Internal(format!(
                "stored _id is not a string: {}",
                other
            ))),
            None => Err(ContactError::Internal(
                "stored document has no _id".to_string(),
            )),
        }
    }

    /// Rebuild the stored document with `_id` as the first key
    pub fn into_document(self) -> Document {
        let mut doc = Document::with_capacity(self.fields.len() + 1);
        doc.insert("_id".to_string(), Value::String(self.id));
        doc.extend(self.fields);
        doc
    }

    /// Location of this record on the HTTP API
    pub fn location(&self) -> String {
        format!("/contact/{}", self.id)
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_is_object_id() {
        assert!(is_object_id("65a1f0c2e4b0a1b2c3d4e5f6"));
        assert!(is_object_id("65A1F0C2E4B0A1B2C3D4E5F6"));
        assert!(!is_object_id("65a1f0c2e4b0a1b2c3d4e5f"));
        assert!(!is_object_id("zza1f0c2e4b0a1b2c3d4e5f6"));
        assert!(!is_object_id(""));
    }

    #[test]
    fn test_serializes_id_first() {
        let fields = json!({ "name": "Alice", "email": "a@x.com" });
        let record = ContactRequest::new(
            "65a1f0c2e4b0a1b2c3d4e5f6",
            fields.as_object().unwrap().clone(),
        );
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"_id":"65a1f0c2e4b0a1b2c3d4e5f6","name":"Alice","email":"a@x.com"}"#
        );
    }

    #[test]
    fn test_deserialize_collects_unknown_fields() {
        let record: ContactRequest = serde_json::from_value(json!({
            "_id": "65a1f0c2e4b0a1b2c3d4e5f6",
            "name": "Bob",
            "tags": ["sales"]
        }))
        .unwrap();
        assert_eq!(record.id, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(record.fields["tags"], json!(["sales"]));
        assert!(!record.fields.contains_key("_id"));
    }

    #[test]
    fn test_fields_from_body_drops_client_id() {
        let fields =
            ContactRequest::fields_from_body(json!({ "_id": "mine", "name": "Alice" })).unwrap();
        assert_eq!(Value::Object(fields), json!({ "name": "Alice" }));
    }

    #[test]
    fn test_fields_from_body_rejects_arrays() {
        let err = ContactRequest::fields_from_body(json!([1, 2])).unwrap_err();
        assert!(matches!(err, ContactError::InvalidBody(_)));
    }

    #[test]
    fn test_document_round_trip_through_store_shape() {
        let doc = json!({ "_id": "65a1f0c2e4b0a1b2c3d4e5f6", "name": "Alice" })
            .as_object()
            .unwrap()
            .clone();
        let record = ContactRequest::from_document(doc.clone()).unwrap();
        assert_eq!(record.location(), "/contact/65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(record.into_document(), doc);
    }

    #[test]
    fn test_from_document_without_id_is_internal_error() {
        let err = ContactRequest::from_document(Document::new()).unwrap_err();
        assert!(matches!(err, ContactError::Internal(_)));
    }
}
