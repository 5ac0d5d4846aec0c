//! HTTP server for contactd

use axum::{
    http::StatusCode,
    middleware,
    response::Response,
    routing::{delete, get, patch, post},
    Router,
};
use contactd_core::{ContactError, ServerConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

use crate::handlers::{error_response, ContactHandler, HealthHandler};
use crate::state::AppState;
use crate::store::StoreHandle;

/// Requests still waiting on storage after this long are answered with 408
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the Axum router for the given state
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(ContactHandler::welcome))
        // CRUD endpoints
        .route("/contact", get(ContactHandler::list))
        .route("/contact/new", post(ContactHandler::create))
        .route("/contact/update", patch(ContactHandler::update))
        .route("/contact/delete", delete(ContactHandler::delete))
        .route("/contact/:id", get(ContactHandler::get))
        .route("/contact/:id/update", patch(ContactHandler::update_by_id))
        // Health check
        .route("/health", get(HealthHandler::check))
        // State
        .with_state(state)
        // Middleware
        .layer(cors)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(middleware::map_response(timeout_body))
        .layer(TraceLayer::new_for_http())
}

/// Give the timeout layer's bare 408 the same JSON body as other failures
async fn timeout_body(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    error_response(
        "complete request",
        ContactError::Timeout(format!("no response within {:?}", REQUEST_TIMEOUT)),
    )
}

/// Runtime server for contactd
pub struct Runtime {
    config: Arc<ServerConfig>,
    store: Arc<StoreHandle>,
}

impl Runtime {
    /// Create a new runtime; storage is connected when [`Runtime::run`] starts
    pub fn new(config: ServerConfig) -> Self {
        Self::with_port_override(config, None)
    }

    /// Create a new runtime with an optional port override
    pub fn with_port_override(config: ServerConfig, port_override: Option<u16>) -> Self {
        Self {
            config: Arc::new(config.with_port_override(port_override)),
            store: Arc::new(StoreHandle::new()),
        }
    }

    /// Build the Axum router
    pub fn build_router(&self) -> Router {
        create_router(AppState::new(self.store.clone()))
    }

    /// Start the server.
    ///
    /// Storage is connected in the background, so the listener accepts
    /// requests before (and regardless of whether) the connection succeeds.
    pub async fn run(&self) -> Result<(), ContactError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.port()));
        let app = self.build_router();

        self.store.spawn_connect(self.config.as_ref().clone());

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ContactError::Server(format!("Failed to bind {}: {}", addr, e)))?;

        info!("Server running on port {}", self.config.port());

        axum::serve(listener, app)
            .with_graceful_shutdown(Self::shutdown_signal())
            .await
            .map_err(|e| ContactError::Server(format!("Server error: {}", e)))?;

        info!("Server stopped");
        self.shutdown().await?;

        Ok(())
    }

    /// Wait for shutdown signal
    async fn shutdown_signal() {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install CTRL+C signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sigterm) => {
                    sigterm.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM signal handler: {}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                debug!("Received CTRL+C, shutting down...");
            }
            _ = terminate => {
                debug!("Received SIGTERM, shutting down...");
            }
        }
    }

    /// Gracefully shutdown the runtime
    pub async fn shutdown(&self) -> Result<(), ContactError> {
        info!("Closing storage connection...");
        if let Err(e) = self.store.close().await {
            warn!("Error closing storage: {}", e);
        }
        info!("Shutdown complete");
        Ok(())
    }

    /// Get the effective configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Get the storage handle
    pub fn store(&self) -> &Arc<StoreHandle> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use contactd_types::ErrorResponse;

    #[test]
    fn test_runtime_default_port() {
        let runtime = Runtime::new(ServerConfig::default());
        assert_eq!(runtime.config().port(), 8080);
        assert!(!runtime.store().is_connected());
    }

    #[test]
    fn test_runtime_with_port_override() {
        let config = ServerConfig {
            port: Some(3000),
            ..Default::default()
        };
        let runtime = Runtime::with_port_override(config, Some(4000));
        assert_eq!(runtime.config().port(), 4000);
    }

    #[test]
    fn test_runtime_keeps_configured_port_without_override() {
        let config = ServerConfig {
            port: Some(3000),
            ..Default::default()
        };
        let runtime = Runtime::with_port_override(config, None);
        assert_eq!(runtime.config().port(), 3000);
    }

    #[tokio::test]
    async fn test_timeout_gets_json_error_body() {
        let timed_out = axum::http::Response::builder()
            .status(StatusCode::REQUEST_TIMEOUT)
            .body(Body::empty())
            .unwrap();

        let response = timeout_body(timed_out).await;
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: ErrorResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(!error.success);
        assert_eq!(error.error, "Request timed out");
    }

    #[tokio::test]
    async fn test_other_responses_pass_through() {
        let found = axum::http::Response::builder()
            .status(StatusCode::FOUND)
            .body(Body::empty())
            .unwrap();

        let response = timeout_body(found).await;
        assert_eq!(response.status(), StatusCode::FOUND);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_shutdown_before_connect() {
        let runtime = Runtime::new(ServerConfig::default());
        assert!(runtime.shutdown().await.is_ok());
    }
}
