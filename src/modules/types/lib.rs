//! Type definitions for contactd
//!
//! Shared wire-level types: the storage backend kind and the JSON bodies the
//! server answers with outside of plain records.

pub mod runtime;
pub mod store;

pub use runtime::{ErrorResponse, HealthResponse};
pub use store::StoreKind;
