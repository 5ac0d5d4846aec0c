//! Runtime type definitions for response bodies

use serde::{Deserialize, Serialize};

use crate::StoreKind;

/// Body sent with every failed request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Always false
    pub success: bool,
    /// Human readable error message
    pub error: String,
}

impl ErrorResponse {
    /// Create an error response
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: message.into(),
        }
    }
}

/// Body of `GET /health`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// "ok" or "unavailable"
    pub status: String,
    /// Connected backend, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store: Option<StoreKind>,
    /// Reason the store is unhealthy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthResponse {
    pub fn ok(store: StoreKind) -> Self {
        Self {
            status: "ok".to_string(),
            store: Some(store),
            error: None,
        }
    }

    pub fn unavailable(store: Option<StoreKind>, reason: impl Into<String>) -> Self {
        Self {
            status: "unavailable".to_string(),
            store,
            error: Some(reason.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_value(ErrorResponse::new("Invalid id: abc")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": false, "error": "Invalid id: abc" })
        );
    }

    #[test]
    fn test_health_response_ok_omits_error() {
        let json = serde_json::to_value(HealthResponse::ok(StoreKind::Mongodb)).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "ok", "store": "mongodb" }));
    }

    #[test]
    fn test_health_response_unavailable() {
        let health = HealthResponse::unavailable(None, "Storage is not connected");
        assert!(!health.is_ok());
        let json = serde_json::to_value(&health).unwrap();
        assert!(json.get("store").is_none());
        assert_eq!(json["error"], "Storage is not connected");
    }
}
