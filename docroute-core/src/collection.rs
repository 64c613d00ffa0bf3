//! Collection handles for store operations.
//!
//! - [`Collection`] - untyped access with [`Record`] values
//! - [`TypedCollection`] - serde-typed access for a specific [`Document`] type
//!
//! Both borrow the store's backend and layer the
//! [`QueryEngine`](crate::evaluator::QueryEngine) over a collection scan for
//! filtered reads.
//!
//! # Example
//!
//! ```ignore
//! async fn list_drafts(store: &DocumentStore) -> DocumentStoreResult<Vec<Record>> {
//!     let query = Query::builder().filter("status", "draft").build();
//!     store.collection("posts").query(&query).await
//! }
//! ```

use std::marker::PhantomData;

use crate::{
    backend::StoreBackend,
    document::{Document, DocumentExt, Record},
    error::DocumentStoreResult,
    evaluator::QueryEngine,
    page::Page,
    query::Query,
};

/// An untyped collection with a reference to a storage backend.
#[derive(Debug)]
pub struct Collection<'a> {
    name: String,
    backend: &'a dyn StoreBackend,
}

impl<'a> Collection<'a> {
    pub(crate) fn new(name: String, backend: &'a dyn StoreBackend) -> Self {
        Self { name, backend }
    }

    /// Returns the name of this collection.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a record, assigning an id if it has none, and returns the stored record.
    ///
    /// # Errors
    ///
    /// Returns a [`DocumentStoreError`](crate::error::DocumentStoreError) if the id is taken
    /// or the backend fails.
    pub async fn add(&self, record: Record) -> DocumentStoreResult<Record> {
        self.backend.add(&self.name, record).await
    }

    /// Retrieves a record by id.
    pub async fn get(&self, id: &str) -> DocumentStoreResult<Option<Record>> {
        self.backend.get(&self.name, id).await
    }

    /// Replaces an existing record and returns it.
    pub async fn update(&self, record: Record) -> DocumentStoreResult<Record> {
        self.backend.update(&self.name, record).await
    }

    /// Deletes a record by id, returning whether it existed.
    pub async fn delete(&self, id: &str) -> DocumentStoreResult<bool> {
        self.backend.delete(&self.name, id).await
    }

    /// Returns every record in scan order.
    pub async fn scan(&self) -> DocumentStoreResult<Vec<Record>> {
        self.backend.scan(&self.name).await
    }

    /// Removes every record from the collection.
    pub async fn clear(&self) -> DocumentStoreResult<()> {
        self.backend.clear(&self.name).await
    }

    /// Returns the records matching `query` (filtered, sorted, paginated).
    pub async fn query(&self, query: &Query) -> DocumentStoreResult<Vec<Record>> {
        Ok(QueryEngine::execute(self.scan().await?, query))
    }

    /// Like [`Collection::query`], but also reports the total match count and page links.
    pub async fn query_page(&self, query: &Query) -> DocumentStoreResult<Page<Record>> {
        Ok(QueryEngine::execute_page(self.scan().await?, query))
    }
}

/// A type-safe collection for a specific document type.
#[derive(Debug)]
pub struct TypedCollection<'a, D: Document> {
    inner: Collection<'a>,
    _marker: PhantomData<D>,
}

impl<'a, D: Document> TypedCollection<'a, D> {
    pub(crate) fn new(name: String, backend: &'a dyn StoreBackend) -> Self {
        Self { inner: Collection::new(name, backend), _marker: PhantomData }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns the untyped view of this collection.
    pub fn untyped(&self) -> &Collection<'a> {
        &self.inner
    }

    pub async fn add(&self, document: D) -> DocumentStoreResult<D> {
        D::from_record(self.inner.add(document.to_record()?).await?)
    }

    pub async fn get(&self, id: &str) -> DocumentStoreResult<Option<D>> {
        self.inner
            .get(id)
            .await?
            .map(D::from_record)
            .transpose()
    }

    pub async fn update(&self, document: D) -> DocumentStoreResult<D> {
        D::from_record(self.inner.update(document.to_record()?).await?)
    }

    pub async fn delete(&self, id: &str) -> DocumentStoreResult<bool> {
        self.inner.delete(id).await
    }

    pub async fn scan(&self) -> DocumentStoreResult<Vec<D>> {
        self.inner
            .scan()
            .await?
            .into_iter()
            .map(D::from_record)
            .collect()
    }

    pub async fn query(&self, query: &Query) -> DocumentStoreResult<Vec<D>> {
        self.inner
            .query(query)
            .await?
            .into_iter()
            .map(D::from_record)
            .collect()
    }
}
