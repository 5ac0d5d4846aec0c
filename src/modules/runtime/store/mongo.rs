//! MongoDB store implementation

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{Bson, Document as BsonDocument};
use contactd_core::{ContactError, ContactRequest, Document, Filter, PoolConfig, Update};
use contactd_types::StoreKind;
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, UpdateModifications};
use mongodb::{Client, Collection};
use tracing::debug;

use super::traits::ContactStore;

/// Collection holding contact requests
pub const COLLECTION: &str = "contactrequests";

/// Database used when the connection string names none
pub const DEFAULT_DATABASE: &str = "test";

/// MongoDB store: one collection of schemaless documents
pub struct MongoStore {
    client: Client,
    collection: Collection<BsonDocument>,
}

impl MongoStore {
    /// Create a new MongoDB store.
    ///
    /// The driver connects lazily; call [`ContactStore::health_check`] to
    /// find out whether the server is reachable.
    pub async fn new(url: &str, pool: &PoolConfig) -> Result<Self, ContactError> {
        let mut options = ClientOptions::parse(url).await.map_err(|e| {
            ContactError::Connection(format!("MongoDB options parse failed: {}", e))
        })?;
        options.min_pool_size = options.min_pool_size.or(Some(pool.min_connections()));
        options.max_pool_size = options.max_pool_size.or(Some(pool.max_connections()));
        options.connect_timeout = options.connect_timeout.or(Some(pool.connect_timeout()));
        options.max_idle_time = options.max_idle_time.or(Some(pool.idle_timeout()));
        options.app_name = options.app_name.or(Some("contactd".to_string()));

        let client = Client::with_options(options).map_err(|e| {
            ContactError::Connection(format!("MongoDB client creation failed: {}", e))
        })?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
        debug!("Using MongoDB database '{}'", database.name());

        Ok(Self {
            collection: database.collection(COLLECTION),
            client,
        })
    }
}

fn storage_error(op: &str, e: mongodb::error::Error) -> ContactError {
    ContactError::Storage(format!("{} failed: {}", op, e))
}

/// Convert a JSON document to BSON, turning hex `_id` strings into ObjectIds
fn to_bson_document(doc: &Document) -> Result<BsonDocument, ContactError> {
    let mut converted = bson::to_document(doc)
        .map_err(|e| ContactError::InvalidBody(format!("JSON to BSON failed: {}", e)))?;
    if let Some(id) = converted.get_mut("_id") {
        cast_id(id);
    }
    Ok(converted)
}

/// Cast a bare hex id, or the hex operands of `$eq`/`$ne`/`$in`/`$nin`
fn cast_id(value: &mut Bson) {
    match value {
        Bson::String(_) => cast_hex(value),
        Bson::Document(operators) => {
            for (op, operand) in operators.iter_mut() {
                match (op.as_str(), operand) {
                    ("$eq" | "$ne", operand) => cast_hex(operand),
                    ("$in" | "$nin", Bson::Array(ids)) => ids.iter_mut().for_each(cast_hex),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

fn cast_hex(value: &mut Bson) {
    let oid = match value {
        Bson::String(id) => ObjectId::parse_str(id.as_str()).ok(),
        _ => None,
    };
    if let Some(oid) = oid {
        *value = Bson::ObjectId(oid);
    }
}

/// Convert a stored document to a record; an `_id` that is not an ObjectId
/// (written by another client) is rendered as a string
fn to_record(doc: BsonDocument) -> Result<ContactRequest, ContactError> {
    match bson_to_json(Bson::Document(doc)) {
        serde_json::Value::Object(mut map) => {
            if let Some(id) = map.get_mut("_id") {
                if !id.is_string() {
                    *id = serde_json::Value::String(id.to_string());
                }
            }
            ContactRequest::from_document(map)
        }
        _ => Err(ContactError::Internal(
            "MongoDB returned a non-document".to_string(),
        )),
    }
}

fn bson_to_json(bson: Bson) -> serde_json::Value {
    match bson {
        Bson::ObjectId(oid) => serde_json::Value::String(oid.to_hex()),
        Bson::DateTime(dt) => serde_json::Value::String(
            chrono::DateTime::from_timestamp_millis(dt.timestamp_millis())
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| dt.to_string()),
        ),
        Bson::Document(doc) => {
            let mut m = serde_json::Map::new();
            for (key, value) in doc {
                m.insert(key, bson_to_json(value));
            }
            serde_json::Value::Object(m)
        }
        Bson::Array(arr) => serde_json::Value::Array(arr.into_iter().map(bson_to_json).collect()),
        Bson::Decimal128(d) => serde_json::Value::String(d.to_string()),
        other => bson::from_bson(other).unwrap_or(serde_json::Value::Null),
    }
}

#[async_trait]
impl ContactStore for MongoStore {
    async fn insert(&self, fields: Document) -> Result<ContactRequest, ContactError> {
        let id = ObjectId::new();
        let mut doc = BsonDocument::new();
        doc.insert("_id", id);
        for (key, value) in to_bson_document(&fields)? {
            doc.insert(key, value);
        }

        self.collection
            .insert_one(doc, None)
            .await
            .map_err(|e| storage_error("insert", e))?;
        Ok(ContactRequest::new(id.to_hex(), fields))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<ContactRequest>, ContactError> {
        let filter = Filter::by_id(id)?;
        let found = self
            .collection
            .find_one(to_bson_document(filter.as_document())?, None)
            .await
            .map_err(|e| storage_error("findById", e))?;
        found.map(to_record).transpose()
    }

    async fn find_all(&self) -> Result<Vec<ContactRequest>, ContactError> {
        let cursor = self
            .collection
            .find(BsonDocument::new(), None)
            .await
            .map_err(|e| storage_error("find", e))?;
        let docs: Vec<BsonDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| storage_error("find", e))?;
        docs.into_iter().map(to_record).collect()
    }

    async fn find_one_and_update(
        &self,
        filter: &Filter,
        update: &Update,
    ) -> Result<Option<ContactRequest>, ContactError> {
        let filter = to_bson_document(filter.as_document())?;
        let result = if update.is_empty() {
            // MongoDB rejects an empty update document
            self.collection.find_one(filter, None).await
        } else {
            let update = bson::to_document(update.as_document())
                .map_err(|e| ContactError::InvalidUpdate(format!("JSON to BSON failed: {}", e)))?;
            self.collection
                .find_one_and_update(filter, UpdateModifications::Document(update), None)
                .await
        };
        let found = result.map_err(|e| storage_error("findOneAndUpdate", e))?;
        found.map(to_record).transpose()
    }

    async fn find_one_and_delete(
        &self,
        filter: &Filter,
    ) -> Result<Option<ContactRequest>, ContactError> {
        let deleted = self
            .collection
            .find_one_and_delete(to_bson_document(filter.as_document())?, None)
            .await
            .map_err(|e| storage_error("findOneAndDelete", e))?;
        deleted.map(to_record).transpose()
    }

    async fn close(&self) -> Result<(), ContactError> {
        // Dropping the last client handle closes the pool
        Ok(())
    }

    async fn health_check(&self) -> Result<(), ContactError> {
        self.client
            .database("admin")
            .run_command(bson::doc! { "ping": 1 }, None)
            .await
            .map_err(|e| ContactError::Connection(format!("MongoDB ping failed: {}", e)))?;
        Ok(())
    }

    fn kind(&self) -> StoreKind {
        StoreKind::Mongodb
    }
}
