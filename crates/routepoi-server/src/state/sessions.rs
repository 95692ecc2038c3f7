//! Provider registry and per-route editing sessions.

use crate::cache::{prune_idle, IdleEntry};
use crate::config::Config;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use dashmap::mapref::one::RefMut;
use dashmap::DashMap;
use routepoi_client::{
    GooglePlacesProvider, InMemoryRouteStore, MockProvider, OverpassProvider, PoiProvider,
    ReconciliationWriter, RouteStore, RouteStoreClient,
};
use routepoi_core::{MarkerCounts, MarkerStateStore, ProviderContext, RouteSnapshot};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Slot name guarding commits, alongside one slot per provider id.
pub const COMMIT_SLOT: &str = "commit";

/// One user's editing session over a remote route.
pub struct Session {
    pub id: String,
    pub route_id: String,
    pub route_name: Option<String>,
    /// Route polyline, derived from track points when the store has none.
    pub encoded_polyline: Option<String>,
    pub markers: MarkerStateStore,
    pub created_at: DateTime<Utc>,
    last_used: Instant,
    slots: HashMap<String, Arc<Mutex<()>>>,
}

impl Session {
    pub fn from_snapshot(mut snapshot: RouteSnapshot) -> Self {
        let encoded_polyline = snapshot.geometry.ensure_polyline().map(str::to_string);
        let mut markers = MarkerStateStore::new();
        markers.ingest_existing(snapshot.canonical_pois());
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            route_id: snapshot.route_id,
            route_name: snapshot.name,
            encoded_polyline,
            markers,
            created_at: Utc::now(),
            last_used: Instant::now(),
            slots: HashMap::new(),
        }
    }

    pub fn touch(&mut self) {
        self.last_used = Instant::now();
    }

    pub fn has_route(&self) -> bool {
        self.encoded_polyline.is_some()
    }

    /// Serialization point for one provider (or [`COMMIT_SLOT`]).
    pub fn slot(&mut self, name: &str) -> Arc<Mutex<()>> {
        self.slots
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id.clone(),
            route_id: self.route_id.clone(),
            route_name: self.route_name.clone(),
            encoded_polyline: self.encoded_polyline.clone(),
            created_at: self.created_at,
            counts: self.markers.counts(),
        }
    }
}

impl IdleEntry for Session {
    fn last_used(&self) -> Instant {
        self.last_used
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub route_id: String,
    pub route_name: Option<String>,
    pub encoded_polyline: Option<String>,
    pub created_at: DateTime<Utc>,
    pub counts: MarkerCounts,
}

/// Application state shared by all handlers.
pub struct AppState {
    config: Config,
    providers: Vec<Arc<dyn PoiProvider>>,
    writer: ReconciliationWriter,
    sessions: DashMap<String, Session>,
}

impl AppState {
    pub fn new(
        config: Config,
        providers: Vec<Arc<dyn PoiProvider>>,
        route_store: Arc<dyn RouteStore>,
    ) -> Self {
        Self {
            config,
            providers,
            writer: ReconciliationWriter::new(route_store),
            sessions: DashMap::new(),
        }
    }

    /// Build providers and the route store from configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let mut providers: Vec<Arc<dyn PoiProvider>> = Vec::new();
        providers.push(Arc::new(
            GooglePlacesProvider::new(
                config.google_places_url.clone(),
                config.google_api_key.clone(),
                Duration::from_secs(config.google_timeout_s),
            )
            .context("Failed to create Google Places client")?,
        ));
        providers.push(Arc::new(
            OverpassProvider::new(
                config.overpass_url.clone(),
                config.sampler(),
                Duration::from_secs(config.overpass_timeout_s),
            )
            .context("Failed to create Overpass client")?,
        ));
        if config.mock_provider_enabled {
            providers.push(Arc::new(MockProvider::new()));
        }

        let route_store: Arc<dyn RouteStore> = match &config.route_store_url {
            Some(url) => Arc::new(
                RouteStoreClient::new(
                    url.clone(),
                    config.route_store_token.clone(),
                    Duration::from_secs(config.route_store_timeout_s),
                )
                .context("Failed to create route store client")?,
            ),
            None => {
                tracing::warn!("ROUTE_STORE_URL not set, using an empty in-memory route store");
                Arc::new(InMemoryRouteStore::new())
            }
        };

        if !config.google_api_key_configured() {
            tracing::info!("GOOGLE_PLACES_API_KEY not set, Google provider disabled");
        }
        Ok(Self::new(config, providers, route_store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn providers(&self) -> &[Arc<dyn PoiProvider>] {
        &self.providers
    }

    pub fn provider(&self, id: &str) -> Option<Arc<dyn PoiProvider>> {
        self.providers.iter().find(|p| p.id() == id).cloned()
    }

    pub fn writer(&self) -> &ReconciliationWriter {
        &self.writer
    }

    pub fn provider_context(&self, has_route: bool) -> ProviderContext {
        ProviderContext {
            has_route,
            google_api_key_configured: self.config.google_api_key_configured(),
        }
    }

    /// Register a session, pruning idle ones first.
    pub fn insert_session(&self, session: Session) -> SessionSummary {
        let pruned = prune_idle(
            &self.sessions,
            self.config.session_max.saturating_sub(1),
            self.config.session_ttl(),
        );
        if pruned > 0 {
            tracing::debug!("Pruned {} idle sessions", pruned);
        }
        let summary = session.summary();
        self.sessions.insert(session.id.clone(), session);
        summary
    }

    /// Mutable access to a live session. The guard must not be held across an `.await`.
    pub fn session_mut(&self, id: &str) -> Option<RefMut<'_, String, Session>> {
        let mut session = self.sessions.get_mut(id)?;
        if session.last_used.elapsed() > self.config.session_ttl() {
            drop(session);
            self.sessions.remove(id);
            return None;
        }
        session.touch();
        Some(session)
    }

    pub fn remove_session(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_ids(state: &AppState) -> Vec<&'static str> {
        state.providers().iter().map(|p| p.id()).collect()
    }

    #[test]
    fn test_mock_provider_is_registered_and_enabled() {
        let state = AppState::from_config(Config::default()).unwrap();
        assert_eq!(provider_ids(&state), vec!["google", "osm", "mock"]);
        let mock = state.provider("mock").unwrap();
        assert!(mock.is_enabled(&ProviderContext::default()));
    }

    #[test]
    fn test_mock_provider_can_be_left_out() {
        let config = Config {
            mock_provider_enabled: false,
            ..Config::default()
        };
        let state = AppState::from_config(config).unwrap();
        assert_eq!(provider_ids(&state), vec!["google", "osm"]);
        assert!(state.provider("mock").is_none());
    }
}
