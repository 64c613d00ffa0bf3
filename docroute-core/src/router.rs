//! Route registration and matching.
//!
//! Patterns are split into segments once, at registration. A segment that
//! starts with [`PARAM_MARKER`] captures the request segment at that position;
//! every other segment must match byte for byte. Leading, trailing and doubled
//! slashes are insignificant on both sides.
//!
//! Matching scans routes in registration order and the first full match wins.
//! There is no specificity scoring: register `/posts/latest` before
//! `/posts/:id` if both should be reachable.
//!
//! ```ignore
//! use docroute::router::Router;
//!
//! let router = Router::new()
//!     .get("/posts", list_posts)
//!     .post_with_schema("/posts", post_schema(), create_post)
//!     .get("/posts/:id", show_post);
//! ```

use percent_encoding::percent_decode_str;
use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use crate::{
    error::RouteError,
    handler::{Handler, SharedHandler},
    schema::Schema,
};

/// Marks a path segment as a named parameter (`/posts/:id`).
pub const PARAM_MARKER: char = ':';

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Methods whose body is validated against a route schema.
    pub fn carries_body(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RouteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PUT" => Ok(Method::Put),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(RouteError::UnsupportedMethod(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Literal(String),
    Param(String),
}

/// Splits a path into its non-empty `/`-delimited segments.
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

/// A parsed route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = split_path(pattern)
            .into_iter()
            .map(|segment| match segment.strip_prefix(PARAM_MARKER) {
                Some(name) => Segment::Param(name.to_string()),
                None => Segment::Literal(segment.to_string()),
            })
            .collect();

        Self { raw: pattern.to_string(), segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Matches already-split request segments, returning the decoded captures.
    pub fn captures(&self, request: &[&str]) -> Option<HashMap<String, String>> {
        if request.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();

        for (segment, actual) in self.segments.iter().zip(request) {
            match segment {
                Segment::Literal(literal) if literal == actual => {}
                Segment::Literal(_) => return None,
                Segment::Param(name) => {
                    let decoded = percent_decode_str(actual).decode_utf8_lossy().into_owned();
                    params.insert(name.clone(), decoded);
                }
            }
        }

        Some(params)
    }
}

/// A registered route. Immutable once registered.
#[derive(Clone)]
pub struct Route {
    method: Method,
    pattern: PathPattern,
    schema: Option<Schema>,
    handler: SharedHandler,
}

impl Route {
    pub fn method(&self) -> Method {
        self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    pub fn handler(&self) -> &dyn Handler {
        self.handler.as_ref()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.raw)
            .field("schema", &self.schema.is_some())
            .finish_non_exhaustive()
    }
}

/// A successful match: the route and its captured parameters.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// Ordered, append-only route table.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Router::default()
    }

    /// Appends a route. Routes are matched in the order they were registered.
    pub fn register<H: Handler>(
        &mut self,
        method: Method,
        pattern: &str,
        schema: Option<Schema>,
        handler: H,
    ) -> &mut Self {
        self.routes.push(Route {
            method,
            pattern: PathPattern::parse(pattern),
            schema,
            handler: Arc::new(handler),
        });
        self
    }

    pub fn route<H: Handler>(mut self, method: Method, pattern: &str, handler: H) -> Self {
        self.register(method, pattern, None, handler);
        self
    }

    pub fn route_with_schema<H: Handler>(
        mut self,
        method: Method,
        pattern: &str,
        schema: Schema,
        handler: H,
    ) -> Self {
        self.register(method, pattern, Some(schema), handler);
        self
    }

    pub fn get<H: Handler>(self, pattern: &str, handler: H) -> Self {
        self.route(Method::Get, pattern, handler)
    }

    pub fn post<H: Handler>(self, pattern: &str, handler: H) -> Self {
        self.route(Method::Post, pattern, handler)
    }

    pub fn put<H: Handler>(self, pattern: &str, handler: H) -> Self {
        self.route(Method::Put, pattern, handler)
    }

    pub fn patch<H: Handler>(self, pattern: &str, handler: H) -> Self {
        self.route(Method::Patch, pattern, handler)
    }

    pub fn delete<H: Handler>(self, pattern: &str, handler: H) -> Self {
        self.route(Method::Delete, pattern, handler)
    }

    pub fn post_with_schema<H: Handler>(self, pattern: &str, schema: Schema, handler: H) -> Self {
        self.route_with_schema(Method::Post, pattern, schema, handler)
    }

    pub fn put_with_schema<H: Handler>(self, pattern: &str, schema: Schema, handler: H) -> Self {
        self.route_with_schema(Method::Put, pattern, schema, handler)
    }

    pub fn patch_with_schema<H: Handler>(self, pattern: &str, schema: Schema, handler: H) -> Self {
        self.route_with_schema(Method::Patch, pattern, schema, handler)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Finds the first route registered for `method` whose pattern matches `path`.
    ///
    /// `path` must not include a query string.
    pub fn match_route(&self, method: Method, path: &str) -> Option<RouteMatch<'_>> {
        let segments = split_path(path);

        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                route
                    .pattern
                    .captures(&segments)
                    .map(|params| RouteMatch { route, params })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::HandlerResult,
        request::RequestContext,
        response::ResponseBuilder,
        store::DocumentStore,
    };

    async fn noop(_: RequestContext, res: ResponseBuilder, _: DocumentStore) -> HandlerResult {
        Ok(res.empty())
    }

    #[test]
    fn first_registered_route_wins() {
        let router = Router::new().get("/a/:x", noop).get("/a/b", noop);
        let matched = router.match_route(Method::Get, "/a/b").unwrap();

        assert_eq!(matched.route.pattern().as_str(), "/a/:x");
        assert_eq!(matched.params.get("x").map(String::as_str), Some("b"));
    }

    #[test]
    fn slashes_are_insignificant() {
        let router = Router::new().get("/posts/:id/", noop);
        let matched = router.match_route(Method::Get, "//posts/42").unwrap();

        assert_eq!(matched.params.get("id").map(String::as_str), Some("42"));
    }

    #[test]
    fn method_and_segment_count_must_agree() {
        let router = Router::new().get("/posts/:id", noop);

        assert!(router.match_route(Method::Delete, "/posts/1").is_none());
        assert!(router.match_route(Method::Get, "/posts").is_none());
        assert!(router.match_route(Method::Get, "/posts/1/comments").is_none());
    }

    #[test]
    fn params_are_decoded_but_literals_are_raw() {
        let router = Router::new()
            .get("/files/:name", noop)
            .get("/hello world", noop);

        let matched = router.match_route(Method::Get, "/files/caf%C3%A9%20menu").unwrap();
        assert_eq!(matched.params.get("name").map(String::as_str), Some("café menu"));

        assert!(router.match_route(Method::Get, "/hello%20world").is_none());
        assert!(router.match_route(Method::Get, "/hello world").is_some());
    }

    #[test]
    fn root_pattern_matches_root_path() {
        let router = Router::new().get("/", noop);

        assert!(router.match_route(Method::Get, "").is_some());
        assert!(router.match_route(Method::Get, "/").is_some());
    }

    #[test]
    fn pattern_parsing() {
        let pattern = PathPattern::parse("/users/:user_id/posts/:post_id");

        assert_eq!(pattern.param_names().collect::<Vec<_>>(), vec!["user_id", "post_id"]);
        assert_eq!(pattern.segments()[0], Segment::Literal("users".to_string()));
    }

    #[test]
    fn method_from_str() {
        assert_eq!("patch".parse::<Method>(), Ok(Method::Patch));
        assert_eq!(
            "OPTIONS".parse::<Method>(),
            Err(RouteError::UnsupportedMethod("OPTIONS".to_string()))
        );
    }
}
