//! Runtime server for contactd
//!
//! This crate provides the storage backends, the HTTP router and request
//! handlers, and the server lifecycle for the contact request backend.

pub mod handlers;
pub mod server;
pub mod state;
pub mod store;

pub use handlers::{ContactHandler, HealthHandler, RequestBody};
pub use server::{create_router, Runtime};
pub use state::AppState;
pub use store::{ContactStore, MemoryStore, MongoStore, StoreHandle};
