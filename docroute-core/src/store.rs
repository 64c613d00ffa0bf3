//! The store handle passed to every request handler.
//!
//! [`DocumentStore`] wraps a shared [`StoreBackend`] trait object. Cloning it is
//! cheap and every clone sees the same data.
//!
//! # Example
//!
//! ```ignore
//! use docroute::{store::DocumentStore, memory::InMemoryStore};
//!
//! let store = DocumentStore::new(InMemoryStore::new());
//! store.ensure_collections(["posts", "comments"]).await?;
//! let posts = store.collection("posts");
//! ```

use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

use crate::{
    backend::StoreBackend,
    collection::{Collection, TypedCollection},
    document::{Document, Record, RecordExt, record_from_json},
    error::{DocumentStoreError, DocumentStoreResult},
};

/// Collection name to records, the unit of bulk import and export.
pub type Snapshot = BTreeMap<String, Vec<Record>>;

/// Shared handle to a storage backend.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    backend: Arc<dyn StoreBackend>,
}

impl DocumentStore {
    /// Creates a new document store with the given backend.
    pub fn new<B: StoreBackend + 'static>(backend: B) -> Self {
        Self { backend: Arc::new(backend) }
    }

    pub fn from_arc(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &dyn StoreBackend {
        self.backend.as_ref()
    }

    /// Gets an untyped collection by name.
    pub fn collection(&self, name: impl Into<String>) -> Collection<'_> {
        Collection::new(name.into(), self.backend.as_ref())
    }

    /// Gets a typed collection named after `D::collection_name()`.
    pub fn typed_collection<D: Document>(&self) -> TypedCollection<'_, D> {
        TypedCollection::new(D::collection_name().to_string(), self.backend.as_ref())
    }

    pub async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
        self.backend.list_collections().await
    }

    /// Creates every listed collection that does not exist yet.
    pub async fn ensure_collections<I, S>(&self, names: I) -> DocumentStoreResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let existing = self.backend.list_collections().await?;

        for name in names {
            let name = name.as_ref();

            if !existing.iter().any(|e| e == name) {
                tracing::debug!(collection = %name, "Creating missing collection");
                self.backend.create_collection(name).await?;
            }
        }

        Ok(())
    }

    /// Adds every record of `snapshot`, creating collections as needed.
    ///
    /// Returns the number of records imported.
    ///
    /// # Errors
    ///
    /// Fails on the first record the backend rejects (e.g. a duplicate id).
    /// Records added before the failure stay in the store.
    pub async fn import(&self, snapshot: Snapshot) -> DocumentStoreResult<usize> {
        let mut imported = 0;

        for (collection, records) in snapshot {
            self.backend.create_collection(&collection).await?;

            for record in records {
                self.backend.add(&collection, record).await?;
                imported += 1;
            }

            tracing::debug!(collection = %collection, "Imported collection");
        }

        tracing::info!(records = imported, "Imported snapshot");

        Ok(imported)
    }

    /// Imports a JSON snapshot of the shape `{"collection": [{...}, ...]}`.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentStoreError::Initialization`] if the value has the wrong shape.
    pub async fn import_json(&self, value: Value) -> DocumentStoreResult<usize> {
        self.import(snapshot_from_json(value)?).await
    }

    /// Reads every collection into a snapshot.
    pub async fn export(&self) -> DocumentStoreResult<Snapshot> {
        let mut snapshot = Snapshot::new();

        for name in self.backend.list_collections().await? {
            let records = self.backend.scan(&name).await?;
            snapshot.insert(name, records);
        }

        Ok(snapshot)
    }

    /// Exports every collection as a JSON snapshot.
    pub async fn export_json(&self) -> DocumentStoreResult<Value> {
        let mut object = serde_json::Map::new();

        for (name, records) in self.export().await? {
            let records = records
                .iter()
                .map(RecordExt::to_json)
                .collect::<DocumentStoreResult<Vec<_>>>()?;

            object.insert(name, Value::Array(records));
        }

        Ok(Value::Object(object))
    }
}

/// Parses a JSON snapshot of the shape `{"collection": [{...}, ...]}`.
pub fn snapshot_from_json(value: Value) -> DocumentStoreResult<Snapshot> {
    let Value::Object(collections) = value else {
        return Err(DocumentStoreError::Initialization(
            "snapshot must be an object of collections".to_string(),
        ));
    };

    collections
        .into_iter()
        .map(|(name, records)| {
            let Value::Array(records) = records else {
                return Err(DocumentStoreError::Initialization(format!(
                    "collection {name} must be an array of records"
                )));
            };

            let records = records
                .into_iter()
                .map(record_from_json)
                .collect::<DocumentStoreResult<Vec<_>>>()?;

            Ok((name, records))
        })
        .collect()
}
