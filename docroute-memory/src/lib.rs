//! In-memory document storage backend for docroute.
//!
//! This crate provides a thread-safe, in-memory implementation of the
//! `StoreBackend` trait. It is the store a mock API runs against during
//! development and tests.
//!
//! # Features
//!
//! - **Thread-safe access** - Concurrent reads and writes using async-aware RwLock
//! - **Insertion-ordered collections** - Scans return records in the order they were added
//! - **Id assignment** - Records added without an `id` receive a UUID v4 string
//!
//! # Quick Start
//!
//! ```ignore
//! use docroute::{store::DocumentStore, memory::InMemoryStore};
//! use bson::doc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = DocumentStore::new(InMemoryStore::new());
//!     let post = store.collection("posts").add(doc! { "title": "Hello" }).await?;
//!
//!     println!("stored {post}");
//!     Ok(())
//! }
//! ```

#[allow(unused_extern_crates)]
extern crate self as docroute_memory;

pub mod store;

pub use store::{InMemoryStore, InMemoryStoreBuilder};
