//! Storage backend abstraction for the document store.
//!
//! The request pipeline never talks to storage directly: handlers receive a
//! [`DocumentStore`](crate::store::DocumentStore) handle that wraps a
//! [`StoreBackend`] trait object. Backends only provide keyed CRUD and a full
//! collection scan; filtering, sorting and pagination are layered on top of
//! [`StoreBackend::scan`] by the [`QueryEngine`](crate::evaluator::QueryEngine).
//!
//! # Examples
//!
//! ```ignore
//! use docroute::backend::StoreBackend;
//! use bson::doc;
//!
//! let backend = MyBackendImpl::new();
//! let stored = backend.add("posts", doc! { "title": "Hello" }).await?;
//! assert!(stored.get("id").is_some());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use async_trait::async_trait;
use std::fmt::Debug;

use crate::{document::Record, error::DocumentStoreResult};

/// Abstract interface for document storage backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the dispatcher shares one backend
/// across every request through an `Arc`. Implementations are free to
/// serialize access internally.
///
/// # Identifiers
///
/// Records are addressed by the string form of their `id` field
/// (see [`id_string`](crate::document::id_string)).
#[async_trait]
pub trait StoreBackend: Send + Sync + Debug {
    /// Adds a record to a collection and returns the stored record.
    ///
    /// A fresh identifier is assigned when the record has no `id`. The
    /// collection is created automatically if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentAlreadyExists`](crate::error::DocumentStoreError::DocumentAlreadyExists)
    /// if a record with the same id is already stored.
    async fn add(&self, collection: &str, record: Record) -> DocumentStoreResult<Record>;

    /// Retrieves a record by id, or `None` if the record or collection is absent.
    async fn get(&self, collection: &str, id: &str) -> DocumentStoreResult<Option<Record>>;

    /// Replaces a stored record entirely and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidDocument`](crate::error::DocumentStoreError::InvalidDocument) if the
    /// record has no id, [`CollectionNotFound`](crate::error::DocumentStoreError::CollectionNotFound)
    /// or [`DocumentNotFound`](crate::error::DocumentStoreError::DocumentNotFound) otherwise.
    async fn update(&self, collection: &str, record: Record) -> DocumentStoreResult<Record>;

    /// Deletes a record by id. Returns whether a record was removed.
    async fn delete(&self, collection: &str, id: &str) -> DocumentStoreResult<bool>;

    /// Returns every record of a collection. Missing collections yield an empty list.
    async fn scan(&self, collection: &str) -> DocumentStoreResult<Vec<Record>>;

    /// Creates an empty collection if it does not exist yet.
    async fn create_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Drops a collection and all its records.
    async fn drop_collection(&self, name: &str) -> DocumentStoreResult<()>;

    /// Lists the names of all collections in the store.
    async fn list_collections(&self) -> DocumentStoreResult<Vec<String>>;

    /// Removes every record from a collection, keeping the collection itself.
    async fn clear(&self, collection: &str) -> DocumentStoreResult<()>;
}

/// Factory trait for creating backend instances.
#[async_trait]
pub trait StoreBackendBuilder {
    type Backend: StoreBackend;

    async fn build(self) -> DocumentStoreResult<Self::Backend>;
}
