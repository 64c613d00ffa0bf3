//! Core of the docroute project: an in-process mock CRUD API over a document store.
//!
//! This crate provides:
//!
//! - **Records** ([`document`]) - BSON-backed records and typed documents
//! - **Store backend abstraction** ([`backend`]) - Keyed CRUD and scans over collections
//! - **Collections and store handles** ([`collection`], [`store`]) - What handlers use to read and write
//! - **Queries** ([`query`], [`evaluator`], [`page`]) - Equality filters, single-key sort, page slicing
//! - **Schemas** ([`schema`]) - Declarative request-body validation
//! - **Routing** ([`router`], [`handler`]) - Method + path-pattern matching with named parameters
//! - **Dispatch** ([`dispatch`], [`request`], [`response`]) - One request in, one response out
//! - **Error handling** ([`error`]) - Error and result types
//!
//! # Example
//!
//! ```ignore
//! use docroute_core::{dispatch::Dispatcher, router::Router, request::Request};
//!
//! let router = Router::new().get("/posts/:id", show_post);
//! let dispatcher = Dispatcher::new(router, store);
//! let response = dispatcher.handle(Request::get("/posts/1")).await;
//! ```

#[allow(unused_extern_crates)]
extern crate self as docroute_core;

pub mod backend;
pub mod collection;
pub mod dispatch;
pub mod document;
pub mod error;
pub mod evaluator;
pub mod handler;
pub mod page;
pub mod query;
pub mod request;
pub mod response;
pub mod router;
pub mod schema;
pub mod store;
