//! Request dispatch: route lookup, body validation and handler invocation.
//!
//! [`Dispatcher::handle`] always produces a response:
//!
//! | outcome | status |
//! |---|---|
//! | no route matches | 404 |
//! | schema rejects a POST/PUT/PATCH body | 400 with per-field errors |
//! | handler returns an error or panics | 500, cause logged only |
//! | handler succeeds | whatever the handler chose (200 by default) |

use futures::FutureExt;
use serde_json::json;
use std::{any::Any, collections::HashMap, panic::AssertUnwindSafe};

use crate::{
    request::{Request, RequestBody, RequestContext, parse_query_string},
    response::{Response, ResponseBuilder, status},
    router::Router,
    schema::SchemaValidator,
    store::DocumentStore,
};

/// Routes requests to handlers over a shared store.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    router: Router,
    store: DocumentStore,
}

impl Dispatcher {
    pub fn new(router: Router, store: DocumentStore) -> Self {
        Self { router, store }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// Runs one request to completion. Never fails and never panics past this call.
    pub async fn handle(&self, request: Request) -> Response {
        let Request { method, path, query, body, headers } = request;

        let (path, inline_query) = match path.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (path, None),
        };

        tracing::debug!(method = %method, path = %path, "Dispatching request");

        let Some(matched) = self.router.match_route(method, &path) else {
            tracing::warn!(method = %method, path = %path, "No route matched");
            return Response::not_found(method, &path);
        };

        let body = RequestBody::parse(body.as_deref());

        if let Some(schema) = matched.route.schema().filter(|_| method.carries_body()) {
            let result = SchemaValidator::validate(&body.to_value(), schema);

            if let Some(errors) = result.errors {
                tracing::warn!(
                    method = %method,
                    route = %matched.route.pattern().as_str(),
                    fields = errors.len(),
                    "Request body failed validation"
                );
                return Response::error(
                    status::BAD_REQUEST,
                    "Validation failed",
                    Some(("errors", json!(errors))),
                );
            }
        }

        let mut query_params = HashMap::new();
        if let Some(inline) = inline_query {
            query_params.extend(parse_query_string(&inline));
        }
        if let Some(explicit) = query {
            query_params.extend(parse_query_string(&explicit));
        }

        let ctx = RequestContext {
            params: matched.params,
            query: query_params,
            body,
            headers,
        };

        let route = matched.route;
        let outcome = AssertUnwindSafe(route.handler().call(ctx, ResponseBuilder::new(), self.store.clone()))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(response)) => {
                tracing::debug!(
                    method = %method,
                    route = %route.pattern().as_str(),
                    status = response.status,
                    "Handler completed"
                );
                response
            }
            Ok(Err(err)) => {
                tracing::error!(
                    method = %method,
                    route = %route.pattern().as_str(),
                    error = %err,
                    "Handler failed"
                );
                internal_error()
            }
            Err(panic) => {
                tracing::error!(
                    method = %method,
                    route = %route.pattern().as_str(),
                    panic = %panic_message(panic.as_ref()),
                    "Handler panicked"
                );
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    Response::error(status::INTERNAL_SERVER_ERROR, "Internal Server Error", None)
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::Value;

    use crate::{
        backend::StoreBackend,
        document::Record,
        error::{DocumentStoreError, DocumentStoreResult, HandlerError, HandlerResult},
        router::Method,
        schema::{FieldRule, Schema},
    };

    /// Backend with no collections; every read is empty and writes are refused.
    #[derive(Debug)]
    struct EmptyBackend;

    #[async_trait]
    impl StoreBackend for EmptyBackend {
        async fn add(&self, collection: &str, _: Record) -> DocumentStoreResult<Record> {
            Err(DocumentStoreError::Backend(format!("read-only: {collection}")))
        }
        async fn get(&self, _: &str, _: &str) -> DocumentStoreResult<Option<Record>> {
            Ok(None)
        }
        async fn update(&self, collection: &str, _: Record) -> DocumentStoreResult<Record> {
            Err(DocumentStoreError::CollectionNotFound(collection.to_string()))
        }
        async fn delete(&self, _: &str, _: &str) -> DocumentStoreResult<bool> {
            Ok(false)
        }
        async fn scan(&self, _: &str) -> DocumentStoreResult<Vec<Record>> {
            Ok(Vec::new())
        }
        async fn create_collection(&self, _: &str) -> DocumentStoreResult<()> {
            Ok(())
        }
        async fn drop_collection(&self, _: &str) -> DocumentStoreResult<()> {
            Ok(())
        }
        async fn list_collections(&self) -> DocumentStoreResult<Vec<String>> {
            Ok(Vec::new())
        }
        async fn clear(&self, _: &str) -> DocumentStoreResult<()> {
            Ok(())
        }
    }

    async fn echo(ctx: RequestContext, res: ResponseBuilder, _: DocumentStore) -> HandlerResult {
        res.json(&json!({
            "params": ctx.params,
            "query": ctx.query,
            "body": ctx.body.to_value(),
            "malformed": ctx.body.is_malformed(),
        }))
    }

    async fn fails(_: RequestContext, _: ResponseBuilder, _: DocumentStore) -> HandlerResult {
        Err(HandlerError::custom("secret database detail"))
    }

    async fn panics(_: RequestContext, _: ResponseBuilder, _: DocumentStore) -> HandlerResult {
        panic!("boom")
    }

    async fn writes(ctx: RequestContext, res: ResponseBuilder, store: DocumentStore) -> HandlerResult {
        let stored = store.collection("posts").add(ctx.record()?).await?;
        res.status(status::CREATED).json(&stored)
    }

    fn dispatcher() -> Dispatcher {
        let schema = Schema::new().field("title", FieldRule::string().required().min_length(5));
        let router = Router::new()
            .get("/echo/:id", echo)
            .post_with_schema("/echo", schema.clone(), echo)
            .route_with_schema(Method::Get, "/validated", schema, echo)
            .get("/fails", fails)
            .get("/panics", panics)
            .post("/posts", writes);

        Dispatcher::new(router, DocumentStore::new(EmptyBackend))
    }

    fn body(response: &Response) -> &Value {
        response.json().expect("json body")
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let response = dispatcher().handle(Request::get("/nothing/here")).await;

        assert_eq!(response.status, 404);
        assert_eq!(body(&response)["error"], "Not Found");
        assert_eq!(body(&response)["message"], "No route for GET /nothing/here");
    }

    #[tokio::test]
    async fn params_and_query_reach_handler() {
        let response = dispatcher()
            .handle(Request::get("/echo/a%2Fb?x=1&y=2").with_query("y=3"))
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(body(&response)["params"]["id"], "a/b");
        assert_eq!(body(&response)["query"]["x"], "1");
        assert_eq!(body(&response)["query"]["y"], "3");
    }

    #[tokio::test]
    async fn invalid_body_is_400_and_skips_handler() {
        let response = dispatcher()
            .handle(Request::post("/echo").with_json(&json!({ "title": "ok" })))
            .await;

        assert_eq!(response.status, 400);
        assert_eq!(body(&response)["error"], "Validation failed");
        assert_eq!(
            body(&response)["errors"]["title"],
            json!(["must be at least 5 characters long"])
        );
    }

    #[tokio::test]
    async fn malformed_body_fails_schema_under_root() {
        let response = dispatcher()
            .handle(Request::post("/echo").with_body("{not json"))
            .await;

        assert_eq!(response.status, 400);
        assert_eq!(body(&response)["errors"]["$root"], json!(["must be an object"]));
    }

    #[tokio::test]
    async fn schema_is_ignored_for_get() {
        let response = dispatcher().handle(Request::get("/validated")).await;

        assert_eq!(response.status, 200);
    }

    #[tokio::test]
    async fn malformed_body_passes_through_without_schema() {
        let response = dispatcher()
            .handle(Request::get("/echo/1").with_body("plain text"))
            .await;

        assert_eq!(response.status, 200);
        assert_eq!(body(&response)["body"], "plain text");
        assert_eq!(body(&response)["malformed"], true);
    }

    #[tokio::test]
    async fn handler_error_is_generic_500() {
        let response = dispatcher().handle(Request::get("/fails")).await;

        assert_eq!(response.status, 500);
        assert_eq!(body(&response), &json!({ "error": "Internal Server Error" }));
    }

    #[tokio::test]
    async fn handler_panic_is_500() {
        let response = dispatcher().handle(Request::get("/panics")).await;

        assert_eq!(response.status, 500);
    }

    #[tokio::test]
    async fn store_failure_in_handler_is_500() {
        let response = dispatcher()
            .handle(Request::post("/posts").with_json(&json!({ "title": "Hello" })))
            .await;

        assert_eq!(response.status, 500);
    }
}
