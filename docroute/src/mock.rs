//! The assembled mock API: dispatcher, store, base path and simulated latency.

use serde_json::Value;
use std::{collections::HashMap, fs};

use docroute_core::{
    dispatch::Dispatcher,
    request::Request,
    response::Response,
    router::{Method, Router},
    store::DocumentStore,
};
use docroute_memory::InMemoryStore;

use crate::config::{ConfigError, LatencyConfig, MockApiConfig};

/// A ready-to-use mock API.
///
/// Each request is delayed by the configured latency, has the base path
/// stripped, and is then handed to the [`Dispatcher`].
#[derive(Debug, Clone)]
pub struct MockApi {
    dispatcher: Dispatcher,
    base_path: Option<String>,
    latency: LatencyConfig,
}

impl MockApi {
    pub fn builder(router: Router) -> MockApiBuilder {
        MockApiBuilder::new(router)
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn store(&self) -> &DocumentStore {
        self.dispatcher.store()
    }

    /// Handles one request. Always yields a response.
    pub async fn handle(&self, mut request: Request) -> Response {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency.sample()).await;
        }

        if let Some(stripped) = self.strip_base_path(&request.path) {
            request.path = stripped;
        }

        self.dispatcher.handle(request).await
    }

    /// Handles a request given as raw parts. Unknown methods get a 404.
    pub async fn call(
        &self,
        method: &str,
        path: &str,
        query: Option<&str>,
        body: Option<&str>,
        headers: HashMap<String, String>,
    ) -> Response {
        let Ok(method) = method.parse::<Method>() else {
            tracing::warn!(method = %method, path = %path, "Unsupported method");
            return Response::not_found(method, path);
        };

        let request = Request {
            method,
            path: path.to_string(),
            query: query.map(str::to_string),
            body: body.map(str::to_string),
            headers,
        };

        self.handle(request).await
    }

    /// Returns `path` without the base path, or `None` if it does not start with it.
    fn strip_base_path(&self, path: &str) -> Option<String> {
        let base = self.base_path.as_deref()?.trim_end_matches('/');
        let rest = path.strip_prefix(base)?;

        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('?') {
            Some(format!("/{}", rest.trim_start_matches('/')))
        } else {
            None
        }
    }
}

pub struct MockApiBuilder {
    router: Router,
    store: Option<DocumentStore>,
    config: MockApiConfig,
    seed: Option<Value>,
}

impl MockApiBuilder {
    pub fn new(router: Router) -> Self {
        Self {
            router,
            store: None,
            config: MockApiConfig::default(),
            seed: None,
        }
    }

    /// Uses `store` instead of a fresh [`InMemoryStore`].
    pub fn store(mut self, store: DocumentStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(mut self, config: MockApiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn latency(mut self, latency: LatencyConfig) -> Self {
        self.config.latency = latency;
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = Some(base_path.into());
        self
    }

    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collections.push(name.into());
        self
    }

    /// Imports a JSON snapshot (`{"collection": [...]}`) when built.
    pub fn seed_json(mut self, seed: Value) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Creates the configured collections, imports seed data and assembles the API.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid, the seed file cannot be read or
    /// parsed, or the store rejects the seed records.
    pub async fn build(self) -> Result<MockApi, ConfigError> {
        let MockApiBuilder { router, store, config, seed } = self;
        config.validate()?;

        let store = store.unwrap_or_else(|| DocumentStore::new(InMemoryStore::new()));
        store.ensure_collections(&config.collections).await?;

        if let Some(path) = &config.seed {
            tracing::info!(path = %path.display(), "Loading seed file");
            let value: Value = serde_json::from_str(&fs::read_to_string(path)?)?;
            store.import_json(value).await?;
        }

        if let Some(value) = seed {
            store.import_json(value).await?;
        }

        tracing::info!(
            routes = router.len(),
            base_path = config.base_path.as_deref().unwrap_or("/"),
            latency_ms = ?(config.latency.min_ms, config.latency.max_ms),
            "Mock API ready"
        );

        Ok(MockApi {
            dispatcher: Dispatcher::new(router, store),
            base_path: config.base_path,
            latency: config.latency,
        })
    }
}
