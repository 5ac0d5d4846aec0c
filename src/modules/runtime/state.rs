//! Shared runtime application state (HTTP handlers)

use contactd_core::ContactError;
use std::sync::Arc;

use crate::store::{ContactStore, StoreHandle};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<StoreHandle>,
}

impl AppState {
    pub fn new(store: Arc<StoreHandle>) -> Self {
        Self { store }
    }

    /// State backed by an already connected store
    pub fn with_store(store: Arc<dyn ContactStore>) -> Self {
        Self::new(Arc::new(StoreHandle::ready(store)))
    }

    /// The connected store, or `Unavailable`
    pub fn store(&self) -> Result<Arc<dyn ContactStore>, ContactError> {
        self.store.get()
    }
}
