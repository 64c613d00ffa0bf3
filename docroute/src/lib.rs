//! Main docroute crate: an in-process mock CRUD API over a document store.
//!
//! Register handlers against method and path patterns, optionally guard
//! request bodies with a schema, and dispatch requests without a network.
//! Handlers read and write a shared [`DocumentStore`](store::DocumentStore),
//! in-memory by default.
//!
//! # Features
//!
//! - **Path routing** - `/posts/:id` style patterns, first registration wins
//! - **Body validation** - Declarative per-field rules, 400 with every failure listed
//! - **Queries** - Equality filters, single-key sort and pagination from the query string
//! - **Fault isolation** - Handler errors and panics become a 500, never a crash
//! - **Configuration** - Base path, simulated latency and seed data from TOML
//!
//! # Quick Start
//!
//! ```ignore
//! use docroute::prelude::*;
//! use serde_json::json;
//!
//! async fn create_post(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
//!     let stored = store.collection("posts").add(ctx.record()?).await?;
//!     res.status(status::CREATED).json(&stored)
//! }
//!
//! async fn show_post(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
//!     match store.collection("posts").get(ctx.param("id").unwrap_or_default()).await? {
//!         Some(post) => res.json(&post),
//!         None => res.status(status::NOT_FOUND).json(&json!({ "error": "Post not found" })),
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     docroute::init_tracing();
//!
//!     let schema = Schema::new()
//!         .field("title", FieldRule::string().required().min_length(5))
//!         .field("content", FieldRule::string().required());
//!
//!     let router = Router::new()
//!         .post_with_schema("/posts", schema, create_post)
//!         .get("/posts/:id", show_post);
//!
//!     let api = MockApi::builder(router).collection("posts").build().await?;
//!     let response = api
//!         .handle(Request::post("/posts").with_json(&json!({ "title": "Hello world", "content": "..." })))
//!         .await;
//!
//!     assert_eq!(response.status, status::CREATED);
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! [`MockApiConfig`](config::MockApiConfig) loads from TOML:
//!
//! ```toml
//! base_path = "/api"
//! collections = ["posts"]
//! seed = "seed.json"
//!
//! [latency]
//! min_ms = 20
//! max_ms = 120
//! ```

pub mod config;
pub mod mock;
pub mod prelude;
pub mod telemetry;

pub use docroute_core::{
    backend, collection, dispatch, document, error, evaluator, handler, page, query, request,
    response, router, schema, store,
};

pub use mock::{MockApi, MockApiBuilder};
pub use telemetry::init_tracing;

// Re-export BSON types for convenience
pub use bson;

/// In-memory storage backend implementations.
pub mod memory {
    pub use docroute_memory::{InMemoryStore, InMemoryStoreBuilder};
}
