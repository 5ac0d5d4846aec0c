//! HTTP request handlers for the contactd server
//!
//! Every contact route performs a single storage call. Failures of any kind
//! are logged and answered with an [`ErrorResponse`] and a matching status.

mod body;
mod contact;
mod health;

pub use body::RequestBody;
pub use contact::{ContactHandler, WELCOME_MESSAGE};
pub use health::HealthHandler;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contactd_core::ContactError;
use contactd_types::ErrorResponse;
use tracing::{error, warn};

/// Log a failed request and build its JSON error response
pub(crate) fn error_response(action: &str, e: ContactError) -> Response {
    if e.is_client_error() {
        warn!("Failed to {}: {}", action, e);
    } else {
        error!("Failed to {}: {}", action, e);
    }
    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::new(e.sanitized_message()))).into_response()
}

/// `302 Found` pointing at `location`
pub(crate) fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
