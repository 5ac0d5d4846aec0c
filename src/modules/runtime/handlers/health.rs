//! Health check handler

use axum::{extract::State, http::StatusCode, Json};
use contactd_types::HealthResponse;
use tracing::warn;

use crate::state::AppState;

/// Handler for `GET /health`
pub struct HealthHandler;

impl HealthHandler {
    /// 200 when the store answers a ping, 503 otherwise
    pub async fn check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
        let store = match state.store() {
            Ok(store) => store,
            Err(e) => {
                return (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthResponse::unavailable(None, e.sanitized_message())),
                )
            }
        };
        match store.health_check().await {
            Ok(()) => (StatusCode::OK, Json(HealthResponse::ok(store.kind()))),
            Err(e) => {
                warn!("Health check failed: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(HealthResponse::unavailable(
                        Some(store.kind()),
                        e.sanitized_message(),
                    )),
                )
            }
        }
    }
}
