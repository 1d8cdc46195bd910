//! TM3 API client.
//!
//! One `TmClient` owns the HTTP transport, the endpoint configuration, the
//! account credentials, the call counters and the reference cache, so
//! multiple independently configured clients can coexist in one process.
//! Every operation resolves an endpoint URL, signs the request and hands it
//! to the executor; listing and query operations paginate to completion
//! before returning.

use std::path::Path;
use std::sync::Arc;

use serde_json::{Value, json};
use tokio::sync::Semaphore;

use crate::auth::{self, Credentials};
use crate::cache::ReferenceCache;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::export;
use crate::pagination::{self, ListPolicy, PageCursor, QUERY_LIMIT, QueryPolicy};
use crate::params::filter_params;
use crate::request::{self, RequestBody, RequestOptions};
use crate::stats::{ApiStats, StatsSnapshot};
use crate::url::{OperationKind, RecordId, resolve_url};

/// Maximum in-flight HTTP requests per client. Anything beyond this queues
/// until a slot frees up.
const MAX_CONNECTIONS: usize = 5;

pub struct TmClient {
    http: reqwest::Client,
    config: ApiConfig,
    credentials: Credentials,
    stats: ApiStats,
    cache: ReferenceCache,
    connections: Semaphore,
}

impl TmClient {
    /// Client with the built-in endpoint table.
    pub fn new(credentials: Credentials) -> Result<Self, ApiError> {
        Self::with_config(credentials, ApiConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ApiConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(ApiError::Transport)?;

        Ok(Self {
            http,
            config,
            credentials,
            stats: ApiStats::default(),
            cache: ReferenceCache::new(),
            connections: Semaphore::new(MAX_CONNECTIONS),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Mutable access for the explicit setters (`set_host`, `set_schema`,
    /// `set_debug`). Requires exclusive access, so configuration cannot
    /// shift under a request already in flight.
    pub fn config_mut(&mut self) -> &mut ApiConfig {
        &mut self.config
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Fetch a single record.
    pub async fn get_one(
        &self,
        endpoint: &str,
        id: impl Into<RecordId>,
        payload: Option<Value>,
    ) -> Result<Value, ApiError> {
        let id = id.into();
        let mut options = self.signed_request(OperationKind::Get, endpoint, Some(&id))?;
        options.params = filter_params(&self.config, payload.as_ref());

        self.stats.record_get();
        self.send(options).await
    }

    /// Fetch one page of a listing, returning the raw response envelope.
    pub async fn list_page(
        &self,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.stats.record_get();
        self.fetch_list_page(endpoint, payload.as_ref(), None).await
    }

    /// Fetch a listing to completion, walking offsets of 100.
    ///
    /// Counts as one logical call in the statistics regardless of how many
    /// pages it takes.
    pub async fn list_all(
        &self,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Vec<Value>, ApiError> {
        self.stats.record_get();
        self.collect_list(endpoint, payload.as_ref()).await
    }

    /// Cache-aware `list_all` for reference data.
    ///
    /// Whitelisted lookup types (see [`crate::LOOKUP_TYPES`]) resolve
    /// through the per-process cache: the first call fetches and paginates,
    /// concurrent callers share that in-flight fetch, later callers get the
    /// resolved list without touching the network. Other endpoints paginate
    /// directly every time. The cached value is whatever the first
    /// successful call fetched, payload included.
    pub async fn lookup_list(
        &self,
        endpoint: &str,
        payload: Option<Value>,
    ) -> Result<Arc<Vec<Value>>, ApiError> {
        self.stats.record_get();
        if !self.cache.is_cached_type(endpoint) {
            return Ok(Arc::new(self.collect_list(endpoint, payload.as_ref()).await?));
        }
        self.cache
            .get_or_fetch(endpoint, || self.collect_list(endpoint, payload.as_ref()))
            .await
    }

    /// Create a record (`POST`).
    pub async fn create(
        &self,
        endpoint: &str,
        id: Option<RecordId>,
        payload: Value,
    ) -> Result<Value, ApiError> {
        self.stats.record_post();
        self.post_raw(endpoint, id, payload).await
    }

    /// Update a record (`PUT`).
    ///
    /// An empty object is a no-op success and the API is never called; a
    /// null payload is a caller error.
    pub async fn update(
        &self,
        endpoint: &str,
        id: impl Into<RecordId>,
        payload: Value,
    ) -> Result<Value, ApiError> {
        if payload.is_null() {
            return Err(ApiError::EmptyPayload {
                operation: "put",
                endpoint: endpoint.to_string(),
            });
        }
        if payload.as_object().is_some_and(|fields| fields.is_empty()) {
            return Ok(Value::Null);
        }

        let id = id.into();
        let mut options = self.signed_request(OperationKind::Put, endpoint, Some(&id))?;
        options.body = Some(RequestBody::Json(payload));

        self.stats.record_put();
        self.send(options).await
    }

    /// Delete a record.
    pub async fn delete(
        &self,
        endpoint: &str,
        id: impl Into<RecordId>,
        payload: Option<Value>,
    ) -> Result<Value, ApiError> {
        let id = id.into();
        let mut options = self.signed_request(OperationKind::Delete, endpoint, Some(&id))?;
        options.body = payload.map(RequestBody::Json);

        self.stats.record_delete();
        self.send(options).await
    }

    /// Run a bulk query, returning at most `limit` rows.
    pub async fn run_query(&self, sql: &str, limit: Option<u64>) -> Result<Vec<Value>, ApiError> {
        self.stats.record_query();

        let mut payload = json!({ "query": sql });
        if let Some(limit) = limit {
            payload["limit"] = json!(limit);
        }

        let body = self.post_raw("queries", None, payload).await?;
        Ok(body
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default())
    }

    /// Run a bulk query to completion, walking offsets of 1000.
    ///
    /// Counts as one logical call in the statistics regardless of page
    /// count.
    pub async fn run_query_all(&self, sql: &str) -> Result<Vec<Value>, ApiError> {
        self.stats.record_query();
        pagination::paginate(QueryPolicy, |cursor| self.fetch_query_page(sql, cursor)).await
    }

    /// Stream a query export, decoding newline-delimited JSON records in
    /// arrival order. A mid-stream failure discards the partial result.
    pub async fn export_query(&self, sql: &str) -> Result<Vec<Value>, ApiError> {
        let mut options = self.signed_request(OperationKind::Post, "export", None)?;
        options.body = Some(RequestBody::Json(json!({ "query": sql })));

        self.stats.record_export();
        let _permit = self.acquire_connection().await;
        export::execute_streaming(&self.http, options).await
    }

    /// Upload a local image file for a record.
    pub async fn save_image(
        &self,
        id: impl Into<RecordId>,
        path: impl AsRef<Path>,
    ) -> Result<Value, ApiError> {
        let id = id.into();
        let mut options = self.signed_request(OperationKind::Post, "saveimage", Some(&id))?;

        let bytes = tokio::fs::read(path.as_ref()).await?;
        options.body = Some(RequestBody::Raw(bytes));

        self.stats.record_post();
        self.send(options).await
    }

    /// Current snapshot of the call counters.
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.stats.reset();
    }

    async fn collect_list(
        &self,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> Result<Vec<Value>, ApiError> {
        pagination::paginate(ListPolicy, |cursor| {
            self.fetch_list_page(endpoint, payload, cursor)
        })
        .await
    }

    async fn fetch_list_page(
        &self,
        endpoint: &str,
        payload: Option<&Value>,
        cursor: Option<PageCursor>,
    ) -> Result<Value, ApiError> {
        let mut options = self.signed_request(OperationKind::List, endpoint, None)?;

        let mut params = filter_params(&self.config, payload);
        if let Some(cursor) = cursor {
            params.insert("offset".to_string(), json!(cursor.offset));
            params.insert("limit".to_string(), json!(cursor.limit));
        }
        options.params = params;

        self.send(options).await
    }

    async fn fetch_query_page(
        &self,
        sql: &str,
        cursor: Option<PageCursor>,
    ) -> Result<Value, ApiError> {
        let mut payload = json!({ "query": sql, "limit": QUERY_LIMIT });
        if let Some(cursor) = cursor {
            payload["offset"] = json!(cursor.offset);
            payload["limit"] = json!(cursor.limit);
        }
        self.post_raw("queries", None, payload).await
    }

    async fn post_raw(
        &self,
        endpoint: &str,
        id: Option<RecordId>,
        payload: Value,
    ) -> Result<Value, ApiError> {
        if payload.is_null() {
            return Err(ApiError::EmptyPayload {
                operation: "post",
                endpoint: endpoint.to_string(),
            });
        }

        let mut options = self.signed_request(OperationKind::Post, endpoint, id.as_ref())?;
        options.body = Some(RequestBody::Json(payload));
        self.send(options).await
    }

    /// Resolve the endpoint and attach a freshly computed authorization
    /// header.
    fn signed_request(
        &self,
        kind: OperationKind,
        endpoint: &str,
        id: Option<&RecordId>,
    ) -> Result<RequestOptions, ApiError> {
        let url = resolve_url(&self.config, &self.credentials, kind, endpoint, id)?;
        let mut options = RequestOptions::new(kind.http_method(), url);
        options.authorization = Some(auth::authorization_header(&self.credentials));
        Ok(options)
    }

    async fn send(&self, options: RequestOptions) -> Result<Value, ApiError> {
        let _permit = self.acquire_connection().await;
        request::execute(&self.http, options, self.config.debug).await
    }

    async fn acquire_connection(&self) -> tokio::sync::SemaphorePermit<'_> {
        // The semaphore is never closed, so acquire cannot fail.
        self.connections
            .acquire()
            .await
            .expect("connection semaphore is never closed")
    }
}
