//! In-memory storage implementation for document stores.
//!
//! Records are kept per collection in insertion order, behind an async-aware
//! read-write lock.

use async_trait::async_trait;
use bson::Bson;
use mea::rwlock::RwLock;
use std::{collections::HashMap, sync::Arc};
use uuid::Uuid;

use docroute_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    document::{ID_FIELD, Record, RecordExt},
    error::{DocumentStoreError, DocumentStoreResult},
};

type StoreMap = HashMap<String, Vec<Record>>;

/// Thread-safe in-memory document storage backend.
///
/// `InMemoryStore` is cloneable and uses an `Arc`-wrapped internal state, so
/// clones share the same data. Lookups by id scan the collection; this is a
/// development backend, not an index.
///
/// # Example
///
/// ```ignore
/// use docroute_memory::InMemoryStore;
/// use docroute::backend::StoreBackend;
/// use bson::doc;
///
/// let store = InMemoryStore::new();
/// let stored = store.add("posts", doc! { "title": "Hello" }).await?;
/// let id = stored.get_str("id")?;
/// assert!(store.get("posts", id).await?.is_some());
/// ```
#[derive(Default, Clone, Debug)]
pub struct InMemoryStore {
    /// collection name -> records in insertion order
    store: Arc<RwLock<StoreMap>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory document store.
    pub fn new() -> Self {
        Self { store: Arc::new(RwLock::new(StoreMap::new())) }
    }

    /// Creates a builder for constructing an `InMemoryStore` with initial collections.
    pub fn builder() -> InMemoryStoreBuilder {
        InMemoryStoreBuilder::default()
    }
}

fn position(records: &[Record], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|record| record.record_id().as_deref() == Some(id))
}

/// Puts `id` first and copies every other field after it.
fn with_id(id: String, record: Record) -> Record {
    let mut stored = Record::new();
    stored.insert(ID_FIELD, Bson::String(id));

    for (key, value) in record {
        if key != ID_FIELD {
            stored.insert(key, value);
        }
    }

    stored
}

#[async_trait]
impl StoreBackend for InMemoryStore {
    async fn add(&self, collection: &str, record: Record) -> DocumentStoreResult<Record> {
        let mut store = self.store.write().await;
        let records = store
            .entry(collection.to_string())
            .or_default();

        let record = match record.record_id() {
            Some(id) => {
                if position(records, &id).is_some() {
                    return Err(DocumentStoreError::DocumentAlreadyExists(id, collection.to_string()));
                }
                record
            }
            None => with_id(Uuid::new_v4().to_string(), record),
        };

        records.push(record.clone());

        Ok(record)
    }

    async fn get(&self, collection: &str, id: &str) -> DocumentStoreResult<Option<Record>> {
        let store = self.store.read().await;

        Ok(store
            .get(collection)
            .and_then(|records| position(records, id).map(|index| records[index].clone())))
    }

    async fn update(&self, collection: &str, record: Record) -> DocumentStoreResult<Record> {
        let Some(id) = record.record_id() else {
            return Err(DocumentStoreError::InvalidDocument(format!(
                "cannot update a record without an {ID_FIELD} in collection {collection}"
            )));
        };

        let mut store = self.store.write().await;
        let records = match store.get_mut(collection) {
            Some(col) => col,
            None => return Err(DocumentStoreError::CollectionNotFound(collection.to_string())),
        };

        match position(records, &id) {
            Some(index) => {
                records[index] = record.clone();
                Ok(record)
            }
            None => Err(DocumentStoreError::DocumentNotFound(id, collection.to_string())),
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> DocumentStoreResult<bool> {
        let mut store = self.store.write().await;

        let Some(records) = store.get_mut(collection) else {
            return Ok(false);
        };

        Ok(match position(records, id) {
            Some(index) => {
                records.remove(index);
                true
            }
            None => false,
        })
    }

    async fn scan(&self, collection: &str) -> DocumentStoreResult<Vec<Record>> {
        Ok(self
            .store
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()> {
        self.store
            .write()
            .await
            .entry(name.to_string())
            .or_default();

        Ok(())
    }

    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()> {
        let mut store = self.store.write().await;

        if store.remove(name).is_none() {
            return Err(DocumentStoreError::CollectionNotFound(name.to_string()));
        }

        Ok(())
    }

    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        let mut names = self
            .store
            .read()
            .await
            .keys()
            .cloned()
            .collect::<Vec<_>>();

        names.sort();

        Ok(names)
    }

    async fn clear(&self, collection: &str) -> DocumentStoreResult<()> {
        match self.store.write().await.get_mut(collection) {
            Some(records) => {
                records.clear();
                Ok(())
            }
            None => Err(DocumentStoreError::CollectionNotFound(collection.to_string())),
        }
    }
}

/// Builder for constructing [`InMemoryStore`] instances.
///
/// # Example
///
/// ```ignore
/// use docroute_memory::InMemoryStore;
/// use docroute::backend::StoreBackendBuilder;
///
/// let store = InMemoryStore::builder()
///     .with_collection("posts")
///     .build()
///     .await?;
/// ```
#[derive(Default)]
pub struct InMemoryStoreBuilder {
    collections: Vec<String>,
}

impl InMemoryStoreBuilder {
    /// Creates the named (empty) collection when the store is built.
    pub fn with_collection(mut self, name: impl Into<String>) -> Self {
        self.collections.push(name.into());
        self
    }
}

#[async_trait]
impl StoreBackendBuilder for InMemoryStoreBuilder {
    type Backend = InMemoryStore;

    async fn build(self) -> DocumentStoreResult<Self::Backend> {
        let store = InMemoryStore::new();

        for name in &self.collections {
            store.create_collection(name).await?;
        }

        Ok(store)
    }
}
