//! Convenient re-exports of commonly used types from docroute.
//!
//! ```ignore
//! use docroute::prelude::*;
//! ```
//!
//! This brings in routing, schemas, request and response types, the store
//! and its collections, and the mock API itself.

pub use docroute_core::{
    backend::{StoreBackend, StoreBackendBuilder},
    collection::{Collection, TypedCollection},
    dispatch::Dispatcher,
    document::{Document, DocumentExt, Record, RecordExt},
    error::{DocumentStoreError, DocumentStoreResult, HandlerError, HandlerResult},
    evaluator::QueryEngine,
    handler::Handler,
    page::{Page, PaginationParams},
    query::{Query, QueryBuilder, Sort, SortDirection},
    request::{Request, RequestContext},
    response::{Response, ResponseBuilder, status},
    router::{Method, Router},
    schema::{FieldRule, FieldType, Schema, SchemaValidator, ValidationResult},
    store::DocumentStore,
};

pub use crate::{
    config::{ConfigError, LatencyConfig, MockApiConfig},
    memory::InMemoryStore,
    mock::{MockApi, MockApiBuilder},
};
