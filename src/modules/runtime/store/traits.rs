//! Storage trait definition

use async_trait::async_trait;
use contactd_core::{ContactError, ContactRequest, Document, Filter, Update};
use contactd_types::StoreKind;

/// Trait for contact request storage backends
///
/// Every HTTP route maps onto exactly one of these calls.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Store a new record and return it with its assigned `_id`
    async fn insert(&self, fields: Document) -> Result<ContactRequest, ContactError>;

    /// Fetch a record by id; `Ok(None)` if no record has that id
    ///
    /// # Errors
    /// `InvalidId` if `id` is not a 24-character hex ObjectId
    async fn find_by_id(&self, id: &str) -> Result<Option<ContactRequest>, ContactError>;

    /// Fetch every record in insertion order
    async fn find_all(&self) -> Result<Vec<ContactRequest>, ContactError>;

    /// Apply `update` to the first record matching `filter`
    ///
    /// # Returns
    /// The matched record as it was *before* the update, or `None` if nothing
    /// matched (which is not an error).
    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<ContactRequest>, ContactError>;

    /// Remove the first record matching `filter` and return it
    async fn find_one_and_delete(
        &self,
        filter: &Filter,
    ) -> Result<Option<ContactRequest>, ContactError>;

    /// Release resources
    async fn close(&self) -> Result<(), ContactError>;

    /// Check that the backend answers
    async fn health_check(&self) -> Result<(), ContactError>;

    /// Backend kind, for logs and the health endpoint
    fn kind(&self) -> StoreKind;
}
