//! Store handle: the single storage client, filled in once connected

use contactd_core::{ContactError, ServerConfig};
use contactd_types::StoreKind;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::memory::MemoryStore;
use super::mongo::MongoStore;
use super::traits::ContactStore;

/// Owns the process-wide storage client.
///
/// The HTTP listener starts before the connection is made, so the handle
/// starts empty and is filled once by [`StoreHandle::spawn_connect`].
/// Until then (or forever, if connecting failed) `get` reports
/// [`ContactError::Unavailable`].
pub struct StoreHandle {
    store: OnceCell<Arc<dyn ContactStore>>,
    failure: OnceCell<String>,
}

impl StoreHandle {
    /// Create an empty handle
    pub fn new() -> Self {
        Self {
            store: OnceCell::new(),
            failure: OnceCell::new(),
        }
    }

    /// Create a handle that is already connected
    pub fn ready(store: Arc<dyn ContactStore>) -> Self {
        Self {
            store: OnceCell::new_with(Some(store)),
            failure: OnceCell::new(),
        }
    }

    /// Open the store described by `config` and keep it
    pub async fn connect(&self, config: &ServerConfig) -> Result<StoreKind, ContactError> {
        let store = open_store(config).await?;
        let kind = store.kind();
        self.store
            .set(store)
            .map_err(|_| ContactError::Internal("store is already connected".to_string()))?;
        Ok(kind)
    }

    /// Connect in the background, logging the outcome.
    ///
    /// A failed connection is not retried.
    pub fn spawn_connect(self: &Arc<Self>, config: ServerConfig) -> JoinHandle<()> {
        let handle = Arc::clone(self);
        tokio::spawn(async move {
            match handle.connect(&config).await {
                Ok(kind) => {
                    info!("Connection to storage successful ({})", kind);
                    if !kind.is_persistent() {
                        warn!("Records are kept in memory and lost on exit");
                    }
                }
                Err(e) => {
                    error!("Connection to storage failed: {}", e);
                    let _ = handle.failure.set(e.to_string());
                }
            }
        })
    }

    /// The connected store
    pub fn get(&self) -> Result<Arc<dyn ContactStore>, ContactError> {
        if let Some(store) = self.store.get() {
            return Ok(Arc::clone(store));
        }
        match self.failure.get() {
            Some(reason) => Err(ContactError::Unavailable(reason.clone())),
            None => Err(ContactError::Unavailable(
                "storage is still connecting".to_string(),
            )),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.store.initialized()
    }

    /// Close the store if it was ever connected
    pub async fn close(&self) -> Result<(), ContactError> {
        match self.store.get() {
            Some(store) => store.close().await,
            None => Ok(()),
        }
    }
}

impl Default for StoreHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Open the backend named by the `DB_URL` scheme and check it answers
pub async fn open_store(config: &ServerConfig) -> Result<Arc<dyn ContactStore>, ContactError> {
    let url = config
        .db_url
        .as_deref()
        .ok_or_else(|| ContactError::Connection("DB_URL is not set".to_string()))?;

    match StoreKind::from_url(url).map_err(ContactError::Connection)? {
        StoreKind::Mongodb => {
            let store = MongoStore::new(url, &config.pool()).await?;
            store.health_check().await?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
