//! The handler abstraction invoked for matched routes.
//!
//! Any `async fn(RequestContext, ResponseBuilder, DocumentStore) -> HandlerResult`
//! (or closure of that shape) is a [`Handler`]:
//!
//! ```ignore
//! async fn show_post(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
//!     let id = ctx.param("id").unwrap_or_default();
//!
//!     match store.collection("posts").get(id).await? {
//!         Some(post) => res.json(&post),
//!         None => Ok(res.status(status::NOT_FOUND).text("post not found")),
//!     }
//! }
//! ```

use async_trait::async_trait;
use std::{future::Future, sync::Arc};

use crate::{
    error::HandlerResult,
    request::RequestContext,
    response::ResponseBuilder,
    store::DocumentStore,
};

#[async_trait]
pub trait Handler: Send + Sync + 'static {
    async fn call(&self, ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult;
}

#[async_trait]
impl<F, Fut> Handler for F
where
    F: Fn(RequestContext, ResponseBuilder, DocumentStore) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn call(&self, ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
        (self)(ctx, res, store).await
    }
}

pub type SharedHandler = Arc<dyn Handler>;
