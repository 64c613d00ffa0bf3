//! Incoming requests and the read-only context passed to handlers.

use serde_json::Value;
use std::collections::HashMap;

use crate::{
    document::{Record, record_from_json},
    error::HandlerError,
    query::Query,
    router::Method,
};

/// A request as received from the embedding application.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path, optionally followed by `?` and a query string.
    pub path: String,
    /// Query string without the leading `?`.
    pub query: Option<String>,
    /// Raw body text.
    pub body: Option<String>,
    pub headers: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            body: None,
            headers: HashMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_json(self, body: &Value) -> Self {
        self.with_body(body.to_string())
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// Parsed request body.
///
/// A body that is present but not valid JSON is kept as [`RequestBody::Malformed`]
/// so handlers can still read or reject it.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(Value),
    Malformed(String),
}

impl RequestBody {
    /// Parses raw body text. Blank bodies are empty.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => RequestBody::Empty,
            Some(text) if text.trim().is_empty() => RequestBody::Empty,
            Some(text) => match serde_json::from_str(text) {
                Ok(value) => RequestBody::Json(value),
                Err(_) => RequestBody::Malformed(text.to_string()),
            },
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            RequestBody::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, RequestBody::Malformed(_))
    }

    /// The body as a JSON value: null when empty, a JSON string when malformed.
    pub fn to_value(&self) -> Value {
        match self {
            RequestBody::Empty => Value::Null,
            RequestBody::Json(value) => value.clone(),
            RequestBody::Malformed(raw) => Value::String(raw.clone()),
        }
    }
}

/// Decodes an `application/x-www-form-urlencoded` query string. Later keys win.
pub fn parse_query_string(query: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
        .into_owned()
        .collect()
}

/// Everything a handler knows about the request it serves.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestContext {
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: RequestBody,
    pub headers: HashMap<String, String>,
}

impl RequestContext {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> Option<&Value> {
        self.body.as_json()
    }

    /// Converts a JSON object body into a record.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::BadRequest`] when the body is empty, malformed or
    /// not an object.
    pub fn record(&self) -> Result<Record, HandlerError> {
        match &self.body {
            RequestBody::Json(value @ Value::Object(_)) => record_from_json(value.clone())
                .map_err(|err| HandlerError::BadRequest(err.to_string())),
            RequestBody::Json(_) => Err(HandlerError::BadRequest("body must be a JSON object".into())),
            RequestBody::Malformed(_) => Err(HandlerError::BadRequest("body is not valid JSON".into())),
            RequestBody::Empty => Err(HandlerError::BadRequest("body is empty".into())),
        }
    }

    /// Builds a [`Query`] from the query string (`_sort`, `_order`, `_page`, `_limit`, filters).
    pub fn to_query(&self) -> Query {
        Query::from_params(&self.query)
    }
}
