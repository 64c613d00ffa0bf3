//! Response values and the builder handed to request handlers.
//!
//! A handler receives a [`ResponseBuilder`], may set a status and headers, and
//! finalizes it with [`json`](ResponseBuilder::json), [`text`](ResponseBuilder::text)
//! or [`empty`](ResponseBuilder::empty). Finalizing consumes the builder, so a
//! response can only be finalized once.

use serde::Serialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;

use crate::error::HandlerResult;

/// Status codes produced by the dispatcher and commonly used by handlers.
pub mod status {
    pub const OK: u16 = 200;
    pub const CREATED: u16 = 201;
    pub const NO_CONTENT: u16 = 204;
    pub const BAD_REQUEST: u16 = 400;
    pub const NOT_FOUND: u16 = 404;
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

pub const CONTENT_TYPE: &str = "content-type";
pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Json(Value),
    Text(String),
}

/// A finalized response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: ResponseBody,
    pub headers: BTreeMap<String, String>,
}

impl Response {
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// Builds a JSON error response of the shape `{"error": ..., ...extra}`.
    pub(crate) fn error(status: u16, error: &str, extra: Option<(&str, Value)>) -> Self {
        let mut body = json!({ "error": error });

        if let (Some((key, value)), Some(object)) = (extra, body.as_object_mut()) {
            object.insert(key.to_string(), value);
        }

        ResponseBuilder::new().status(status).finish(ResponseBody::Json(body), JSON_CONTENT_TYPE)
    }

    /// The 404 sent when no route accepts `method` and `path`.
    pub fn not_found(method: impl std::fmt::Display, path: &str) -> Self {
        Self::error(
            status::NOT_FOUND,
            "Not Found",
            Some(("message", json!(format!("No route for {method} {path}")))),
        )
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Incremental response under construction. Defaults to status 200.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    status: u16,
    headers: BTreeMap<String, String>,
}

impl Default for ResponseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseBuilder {
    pub fn new() -> Self {
        Self { status: status::OK, headers: BTreeMap::new() }
    }

    pub fn status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Sets a header. Names are stored lowercase.
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Finalizes the response with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::Serialization`](crate::error::HandlerError::Serialization)
    /// if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> HandlerResult {
        let value = serde_json::to_value(body)?;

        Ok(self.finish(ResponseBody::Json(value), JSON_CONTENT_TYPE))
    }

    /// Finalizes the response with a plain-text body.
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ResponseBody::Text(body.into()), TEXT_CONTENT_TYPE)
    }

    /// Finalizes the response without a body.
    pub fn empty(self) -> Response {
        Response { status: self.status, body: ResponseBody::Empty, headers: self.headers }
    }

    fn finish(mut self, body: ResponseBody, content_type: &str) -> Response {
        self.headers
            .entry(CONTENT_TYPE.to_string())
            .or_insert_with(|| content_type.to_string());

        Response { status: self.status, body, headers: self.headers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_sets_content_type_and_status() {
        let response = ResponseBuilder::new()
            .status(status::CREATED)
            .json(&json!({ "id": "1" }))
            .unwrap();

        assert_eq!(response.status, 201);
        assert_eq!(response.header("Content-Type"), Some(JSON_CONTENT_TYPE));
        assert_eq!(response.json(), Some(&json!({ "id": "1" })));
    }

    #[test]
    fn explicit_content_type_is_kept() {
        let response = ResponseBuilder::new()
            .header("Content-Type", "text/csv")
            .text("a,b");

        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("text/csv"));
        assert_eq!(response.text(), Some("a,b"));
    }

    #[test]
    fn error_body_shape() {
        let response = Response::error(status::NOT_FOUND, "Not Found", Some(("message", json!("nope"))));

        assert_eq!(response.json(), Some(&json!({ "error": "Not Found", "message": "nope" })));
        assert!(!response.is_success());
    }
}
