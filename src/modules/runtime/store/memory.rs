//! In-process store (`DB_URL=memory://`)

use async_trait::async_trait;
use bson::oid::ObjectId;
use contactd_core::{is_object_id, ContactError, ContactRequest, Document, Filter, Update};
use contactd_types::StoreKind;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::traits::ContactStore;

/// Keeps records in insertion order in memory; nothing survives a restart
pub struct MemoryStore {
    records: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Index of the first document matching `filter`
fn position(records: &[Document], filter: &Filter) -> Result<Option<usize>, ContactError> {
    for (index, doc) in records.iter().enumerate() {
        if filter.matches(doc)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

#[async_trait]
impl ContactStore for MemoryStore {
    async fn insert(&self, fields: Document) -> Result<ContactRequest, ContactError> {
        let record = ContactRequest::new(ObjectId::new().to_hex(), fields);
        self.records
            .write()
            .await
            .push(record.clone().into_document());
        Ok(record)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ContactRequest>, ContactError> {
        if !is_object_id(id) {
            return Err(ContactError::InvalidId(id.to_string()));
        }
        let id = Value::String(id.to_ascii_lowercase());
        let records = self.records.read().await;
        records
            .iter()
            .find(|doc| doc.get("_id") == Some(&id))
            .cloned()
            .map(ContactRequest::from_document)
            .transpose()
    }

    async fn find_all(&self) -> Result<Vec<ContactRequest>, ContactError> {
        let records = self.records.read().await;
        records
            .iter()
            .cloned()
            .map(ContactRequest::from_document)
            .collect()
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<ContactRequest>, ContactError> {
        let mut records = self.records.write().await;
        let Some(index) = position(&records, filter)? else {
            debug!("No record matched update filter");
            return Ok(None);
        };
        let before = records[index].clone();
        update.apply(&mut records[index])?;
        ContactRequest::from_document(before).map(Some)
    }

    async fn find_one_and_delete(
        &self,
        filter: &Filter,
    ) -> Result<Option<ContactRequest>, ContactError> {
        let mut records = self.records.write().await;
        match position(&records, filter)? {
            Some(index) => ContactRequest::from_document(records.remove(index)).map(Some),
            None => Ok(None),
        }
    }

    async fn close(&self) -> Result<(), ContactError> {
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ContactError> {
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Document {
        value.as_object().unwrap().clone()
    }

    #[tokio::test]
    async fn test_insert_then_find_by_id() {
        let store = MemoryStore::new();
        let created = store
            .insert(fields(json!({ "name": "Alice", "email": "a@x.com" })))
            .await
            .unwrap();
        assert!(is_object_id(&created.id));

        let found = store.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(found, created);
        assert_eq!(
            serde_json::to_value(&found).unwrap(),
            json!({ "_id": created.id, "name": "Alice", "email": "a@x.com" })
        );
    }

    #[tokio::test]
    async fn test_find_by_id_missing_and_malformed() {
        let store = MemoryStore::new();
        assert!(store
            .find_by_id("65a1f0c2e4b0a1b2c3d4e5f6")
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            store.find_by_id("123").await,
            Err(ContactError::InvalidId(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_keeps_insertion_order() {
        let store = MemoryStore::new();
        for name in ["Alice", "Bob", "Carol"] {
            store.insert(fields(json!({ "name": name }))).await.unwrap();
        }
        let names: Vec<Value> = store
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.fields["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("Alice"), json!("Bob"), json!("Carol")]);
    }

    #[tokio::test]
    async fn test_update_returns_pre_image_and_applies() {
        let store = MemoryStore::new();
        let alice = store
            .insert(fields(json!({ "name": "Alice", "email": "a@x.com" })))
            .await
            .unwrap();

        let filter = Filter::from_body(json!({ "email": "a@x.com" })).unwrap();
        let update = Update::from_body(json!({ "name": "Alicia" })).unwrap();
        let before = store
            .find_one_and_update(&filter, &update)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(before.fields["name"], json!("Alice"));

        let after = store.find_by_id(&alice.id).await.unwrap().unwrap();
        assert_eq!(after.fields["name"], json!("Alicia"));
    }

    #[tokio::test]
    async fn test_update_without_match_changes_nothing() {
        let store = MemoryStore::new();
        store.insert(fields(json!({ "name": "Alice" }))).await.unwrap();
        let snapshot = store.find_all().await.unwrap();

        let filter = Filter::from_body(json!({ "name": "Nobody" })).unwrap();
        let update = Update::from_body(json!({ "name": "Changed" })).unwrap();
        let result = store.find_one_and_update(&filter, &update).await.unwrap();
        assert!(result.is_none());
        assert_eq!(store.find_all().await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_delete_first_match() {
        let store = MemoryStore::new();
        let alice = store.insert(fields(json!({ "team": "sales" }))).await.unwrap();
        let bob = store.insert(fields(json!({ "team": "sales" }))).await.unwrap();

        let filter = Filter::from_body(json!({ "team": "sales" })).unwrap();
        let deleted = store.find_one_and_delete(&filter).await.unwrap().unwrap();
        assert_eq!(deleted.id, alice.id);
        assert!(store.find_by_id(&alice.id).await.unwrap().is_none());
        assert!(store.find_by_id(&bob.id).await.unwrap().is_some());
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_without_match() {
        let store = MemoryStore::new();
        let filter = Filter::from_body(json!({ "team": "sales" })).unwrap();
        assert!(store.find_one_and_delete(&filter).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
