//! Error types and result types for store, routing and handler operations.
//!
//! Store operations return [`DocumentStoreResult<T>`]; request handlers return
//! [`HandlerResult`]. Neither ever reaches the caller of the dispatcher: every
//! failure is turned into a well-formed response there.

use bson::error::Error as BsonError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

use crate::response::Response;

/// Represents all possible errors that can occur when interacting with a document store.
///
/// This enum covers serialization errors, document lifecycle issues, collection management,
/// and backend-specific errors.
#[derive(Error, Debug)]
pub enum DocumentStoreError {
    /// Serialization/deserialization error when converting between record formats (BSON, JSON).
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// Error during store initialization, seeding or import.
    #[error("Initialization error: {0}")]
    Initialization(String),
    /// A record with the given ID already exists in the collection.
    /// The first argument is the record ID, the second is the collection name.
    #[error("Document {0} already exists in collection {1}")]
    DocumentAlreadyExists(String, String),
    /// The requested record was not found in the collection.
    /// The first argument is the record ID, the second is the collection name.
    #[error("Document not found {0} in collection {1}")]
    DocumentNotFound(String, String),
    /// The requested collection does not exist in the store.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),
    /// The record has an invalid structure (e.g. an update without an `id`).
    #[error("Invalid document: {0}")]
    InvalidDocument(String),
    /// An error occurred in the underlying storage backend.
    #[error("Backend error: {0}")]
    Backend(String),
    /// An unknown error occurred.
    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// A specialized `Result` type for document store operations.
pub type DocumentStoreResult<T> = Result<T, DocumentStoreError>;

impl From<BsonError> for DocumentStoreError {
    fn from(err: BsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

impl From<SerdeJsonError> for DocumentStoreError {
    fn from(err: SerdeJsonError) -> Self {
        DocumentStoreError::Serialization(err.to_string())
    }
}

/// Failure raised by a request handler.
///
/// The dispatcher converts every `HandlerError` into a generic 500 response and
/// logs the cause. Handlers that want a different status should build that
/// response themselves instead of returning an error.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] DocumentStoreError),
    /// A value could not be converted to or from JSON/BSON.
    #[error("Serialization error: {0}")]
    Serialization(String),
    /// The request could not be interpreted by the handler.
    #[error("Bad request: {0}")]
    BadRequest(String),
    /// Any other handler-defined failure.
    #[error("{0}")]
    Custom(String),
}

impl HandlerError {
    pub fn custom(message: impl Into<String>) -> Self {
        HandlerError::Custom(message.into())
    }
}

impl From<SerdeJsonError> for HandlerError {
    fn from(err: SerdeJsonError) -> Self {
        HandlerError::Serialization(err.to_string())
    }
}

impl From<BsonError> for HandlerError {
    fn from(err: BsonError) -> Self {
        HandlerError::Serialization(err.to_string())
    }
}

/// The result every request handler resolves to.
pub type HandlerResult = Result<Response, HandlerError>;

/// Errors raised while declaring routes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// The method name is not one of GET, POST, PUT, PATCH or DELETE.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),
}
