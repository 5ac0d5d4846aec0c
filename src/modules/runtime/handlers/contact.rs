//! Contact request CRUD handlers

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use contactd_core::{ContactError, ContactRequest, Filter, UpdateRequest};
use serde_json::Value;
use tracing::{debug, info};

use super::{error_response, redirect, RequestBody};
use crate::state::AppState;

/// Body of `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to the backend server!";

/// Where delete and unmatched updates redirect to
const LISTING: &str = "/contact";

/// Handler for the `/contact` routes
pub struct ContactHandler;

impl ContactHandler {
    /// Handle GET /
    pub async fn welcome() -> &'static str {
        WELCOME_MESSAGE
    }

    /// Handle POST /contact/new
    pub async fn create(State(state): State<AppState>, RequestBody(body): RequestBody) -> Response {
        match Self::insert(&state, body).await {
            Ok(record) => {
                info!("Created contact request {}", record.id);
                redirect(&record.location())
            }
            Err(e) => error_response("create contact request", e),
        }
    }

    async fn insert(state: &AppState, body: Value) -> Result<ContactRequest, ContactError> {
        let fields = ContactRequest::fields_from_body(body)?;
        debug!("New contact request fields: {:?}", fields);
        state.store()?.insert(fields).await
    }

    /// Handle GET /contact/{id}; answers `null` for an unknown id
    pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
        let result = match state.store() {
            Ok(store) => store.find_by_id(&id).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(record) => Json(record).into_response(),
            Err(e) => error_response("read contact request", e),
        }
    }

    /// Handle GET /contact
    pub async fn list(State(state): State<AppState>) -> Response {
        let result = match state.store() {
            Ok(store) => store.find_all().await,
            Err(e) => Err(e),
        };
        match result {
            Ok(records) => {
                debug!("Listing {} contact requests", records.len());
                Json(records).into_response()
            }
            Err(e) => error_response("list contact requests", e),
        }
    }

    /// Handle PATCH /contact/update with a `[filter, update]` body
    pub async fn update(State(state): State<AppState>, RequestBody(body): RequestBody) -> Response {
        let result = match UpdateRequest::from_body(body) {
            Ok(request) => Self::apply(&state, request).await,
            Err(e) => Err(e),
        };
        Self::after_update(result)
    }

    /// Handle PATCH /contact/{id}/update
    pub async fn update_by_id(
        State(state): State<AppState>,
        Path(id): Path<String>,
        RequestBody(body): RequestBody,
    ) -> Response {
        let result = match UpdateRequest::for_id(&id, body) {
            Ok(request) => Self::apply(&state, request).await,
            Err(e) => Err(e),
        };
        Self::after_update(result)
    }

    async fn apply(
        state: &AppState,
        request: UpdateRequest,
    ) -> Result<Option<ContactRequest>, ContactError> {
        state
            .store()?
            .find_one_and_update(&request.filter, &request.update)
            .await
    }

    /// Redirect to the matched record, using the id of its pre-update image
    fn after_update(result: Result<Option<ContactRequest>, ContactError>) -> Response {
        match result {
            Ok(Some(before)) => {
                info!("Updated contact request {}", before.id);
                redirect(&before.location())
            }
            Ok(None) => {
                info!("Update matched no contact request");
                redirect(LISTING)
            }
            Err(e) => error_response("update contact request", e),
        }
    }

    /// Handle DELETE /contact/delete with a filter body
    pub async fn delete(State(state): State<AppState>, RequestBody(body): RequestBody) -> Response {
        match Self::remove(&state, body).await {
            Ok(Some(deleted)) => {
                info!("Deleted contact request {}", deleted.id);
                redirect(LISTING)
            }
            Ok(None) => {
                info!("Delete matched no contact request");
                redirect(LISTING)
            }
            Err(e) => error_response("delete contact request", e),
        }
    }

    async fn remove(state: &AppState, body: Value) -> Result<Option<ContactRequest>, ContactError> {
        let filter = Filter::from_body(body)?;
        state.store()?.find_one_and_delete(&filter).await
    }
}
