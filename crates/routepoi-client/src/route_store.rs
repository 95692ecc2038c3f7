//! Remote route store access.

use crate::http::{apply_request_id, build_client, failure_detail};
use async_trait::async_trait;
use dashmap::DashMap;
use reqwest::Client;
use routepoi_core::{PoiError, Result, RouteSnapshot, WriteBackStage};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Source of truth for a route's POI list.
///
/// Fetch failures are [`WriteBackStage::Fetch`] errors and write failures are
/// [`WriteBackStage::Write`] errors.
#[async_trait]
pub trait RouteStore: Send + Sync {
    /// One fresh read of the route; never served from a cache.
    async fn fetch_route(&self, route_id: &str) -> Result<RouteSnapshot>;

    /// Replace the whole POI array of the route.
    async fn replace_pois(&self, route_id: &str, pois: Vec<Value>) -> Result<()>;
}

/// HTTP client for a route store exposing `GET`/`PUT {base}/routes/{id}.json`.
pub struct RouteStoreClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    request_id: Option<String>,
}

impl RouteStoreClient {
    pub fn new(
        base_url: impl Into<String>,
        auth_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = build_client(timeout).map_err(|err| {
            PoiError::write_back(
                WriteBackStage::Fetch,
                format!("cannot build HTTP client: {}", err),
            )
        })?;
        let mut store = Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_token: None,
            request_id: None,
        };
        store.set_auth_token(auth_token);
        Ok(store)
    }

    pub fn set_auth_token(&mut self, token: Option<String>) {
        self.auth_token = token
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    pub fn set_request_id(&mut self, request_id: Option<String>) {
        self.request_id = request_id
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty());
    }

    fn route_url(&self, route_id: &str) -> String {
        format!("{}/routes/{}.json", self.base_url, route_id)
    }

    fn prepare(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match self.auth_token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        apply_request_id(request, self.request_id.as_deref())
    }
}

fn check_route_id(route_id: &str, stage: WriteBackStage) -> Result<()> {
    let valid = !route_id.is_empty()
        && route_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(PoiError::write_back(
            stage,
            format!("invalid route id '{}'", route_id),
        ))
    }
}

#[async_trait]
impl RouteStore for RouteStoreClient {
    async fn fetch_route(&self, route_id: &str) -> Result<RouteSnapshot> {
        check_route_id(route_id, WriteBackStage::Fetch)?;
        let response = self
            .prepare(self.client.get(self.route_url(route_id)))
            .send()
            .await
            .map_err(|err| PoiError::write_back(WriteBackStage::Fetch, err.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = failure_detail(response).await;
            return Err(PoiError::write_back_status(
                WriteBackStage::Fetch,
                status,
                message,
            ));
        }

        let document: Value = response.json().await.map_err(|err| {
            PoiError::write_back(
                WriteBackStage::Fetch,
                format!("invalid route document: {}", err),
            )
        })?;
        RouteSnapshot::from_json(route_id, &document)
            .map_err(|err| PoiError::write_back(WriteBackStage::Fetch, err.to_string()))
    }

    async fn replace_pois(&self, route_id: &str, pois: Vec<Value>) -> Result<()> {
        check_route_id(route_id, WriteBackStage::Write)?;
        let body = json!({ "route": { "points_of_interest": pois } });
        let response = self
            .prepare(self.client.put(self.route_url(route_id)).json(&body))
            .send()
            .await
            .map_err(|err| PoiError::write_back(WriteBackStage::Write, err.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = failure_detail(response).await;
            return Err(PoiError::write_back_status(
                WriteBackStage::Write,
                status,
                message,
            ));
        }
        Ok(())
    }
}

/// Route store held in memory, for tests and offline demos.
///
/// Documents use the same shape the HTTP store returns. Tests can edit the
/// remote list between calls to simulate concurrent writers.
#[derive(Debug, Default)]
pub struct InMemoryRouteStore {
    routes: DashMap<String, Value>,
    writes: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_write: AtomicBool,
}

impl InMemoryRouteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_route(&self, route_id: impl Into<String>, document: Value) {
        self.routes.insert(route_id.into(), document);
    }

    /// Current remote POI list of a route.
    pub fn pois(&self, route_id: &str) -> Vec<Value> {
        self.routes
            .get(route_id)
            .and_then(|doc| RouteSnapshot::from_json(route_id, doc.value()).ok())
            .map(|snapshot| snapshot.pois)
            .unwrap_or_default()
    }

    /// Append a POI as another writer would.
    pub fn push_poi(&self, route_id: &str, poi: Value) {
        let mut pois = self.pois(route_id);
        pois.push(poi);
        self.set_pois(route_id, pois);
    }

    fn set_pois(&self, route_id: &str, pois: Vec<Value>) {
        let mut entry = self
            .routes
            .entry(route_id.to_string())
            .or_insert_with(|| json!({ "route": {} }));
        let document = entry.value_mut();
        if !document.get("route").is_some_and(Value::is_object) {
            *document = json!({ "route": {} });
        }
        document["route"]["points_of_interest"] = Value::Array(pois);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_write(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RouteStore for InMemoryRouteStore {
    async fn fetch_route(&self, route_id: &str) -> Result<RouteSnapshot> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(PoiError::write_back_status(
                WriteBackStage::Fetch,
                503,
                "route store unavailable",
            ));
        }
        let document = self
            .routes
            .get(route_id)
            .map(|doc| doc.value().clone())
            .ok_or_else(|| {
                PoiError::write_back_status(
                    WriteBackStage::Fetch,
                    404,
                    format!("route '{}' not found", route_id),
                )
            })?;
        RouteSnapshot::from_json(route_id, &document)
    }

    async fn replace_pois(&self, route_id: &str, pois: Vec<Value>) -> Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(PoiError::write_back_status(
                WriteBackStage::Write,
                503,
                "route store unavailable",
            ));
        }
        if !self.routes.contains_key(route_id) {
            return Err(PoiError::write_back_status(
                WriteBackStage::Write,
                404,
                format!("route '{}' not found", route_id),
            ));
        }
        self.set_pois(route_id, pois);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
