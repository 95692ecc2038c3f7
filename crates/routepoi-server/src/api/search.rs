//! Provider searches within a session.

use axum::{
    extract::{Path, State},
    Json,
};
use routepoi_client::{search_all, ProviderOutcome, ProviderReport};
use routepoi_core::{CanonicalPoi, MapBounds, PoiError, RoutingOrigin, SearchParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub provider: String,
    pub text_query: String,
    #[serde(default)]
    pub map_bounds: Option<MapBounds>,
    #[serde(default)]
    pub routing_origin: Option<RoutingOrigin>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAllRequest {
    pub text_query: String,
    #[serde(default)]
    pub map_bounds: Option<MapBounds>,
    #[serde(default)]
    pub routing_origin: Option<RoutingOrigin>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub provider: &'static str,
    pub status: &'static str,
    pub pois: Vec<CanonicalPoi>,
    /// Results that were new to the session.
    pub inserted: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchAllResponse {
    pub reports: Vec<ProviderReport>,
    pub inserted: usize,
}

fn search_params(
    text_query: String,
    encoded_polyline: Option<String>,
    map_bounds: Option<MapBounds>,
    routing_origin: Option<RoutingOrigin>,
) -> SearchParams {
    SearchParams {
        text_query,
        encoded_polyline,
        map_bounds,
        routing_origin,
    }
}

fn busy(slot: &str) -> ApiError {
    ApiError::Conflict(format!("a {} search is already running for this session", slot))
}

/// Run one provider against the session's route and ingest results as `suggested`.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let provider = state
        .provider(&req.provider)
        .ok_or_else(|| ApiError::NotFound(format!("provider '{}' not found", req.provider)))?;

    let (encoded_polyline, slot) = {
        let mut session = state
            .session_mut(&id)
            .ok_or_else(|| ApiError::session_not_found(&id))?;
        (session.encoded_polyline.clone(), session.slot(provider.id()))
    };
    let _guard = slot.try_lock_owned().map_err(|_| busy(provider.id()))?;

    let context = state.provider_context(encoded_polyline.is_some());
    if !provider.is_enabled(&context) {
        return Err(PoiError::invalid(format!(
            "provider '{}' is not enabled for this session",
            provider.id()
        ))
        .into());
    }

    let params = search_params(
        req.text_query,
        encoded_polyline,
        req.map_bounds,
        req.routing_origin,
    );
    let outcome = ProviderOutcome::from_result(provider.search(&params).await);
    if let ProviderOutcome::Failed(err) = outcome {
        return Err(err.into());
    }
    let pois = outcome.pois().to_vec();

    let inserted = {
        let mut session = state
            .session_mut(&id)
            .ok_or_else(|| ApiError::session_not_found(&id))?;
        session.markers.ingest(pois.iter().cloned())
    };
    tracing::info!(
        "Session {}: {} returned {} POIs ({} new)",
        id,
        provider.id(),
        pois.len(),
        inserted
    );

    Ok(Json(SearchResponse {
        provider: provider.id(),
        status: outcome.status(),
        pois,
        inserted,
    }))
}

/// Run every enabled provider concurrently; one failure never hides the others.
pub async fn search_all_providers(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SearchAllRequest>,
) -> Result<Json<SearchAllResponse>, ApiError> {
    let (encoded_polyline, slots) = {
        let mut session = state
            .session_mut(&id)
            .ok_or_else(|| ApiError::session_not_found(&id))?;
        let context = state.provider_context(session.has_route());
        let slots: Vec<_> = state
            .providers()
            .iter()
            .filter(|provider| provider.is_enabled(&context))
            .map(|provider| (provider.id(), session.slot(provider.id())))
            .collect();
        (session.encoded_polyline.clone(), slots)
    };

    let mut guards: Vec<OwnedMutexGuard<()>> = Vec::with_capacity(slots.len());
    for (provider_id, slot) in slots {
        guards.push(slot.try_lock_owned().map_err(|_| busy(provider_id))?);
    }

    let context = state.provider_context(encoded_polyline.is_some());
    let params = search_params(
        req.text_query,
        encoded_polyline,
        req.map_bounds,
        req.routing_origin,
    );
    params.validate()?;
    let reports = search_all(state.providers(), &params, &context).await;
    drop(guards);

    let inserted = {
        let mut session = state
            .session_mut(&id)
            .ok_or_else(|| ApiError::session_not_found(&id))?;
        reports
            .iter()
            .map(|report| session.markers.ingest(report.outcome.pois().iter().cloned()))
            .sum()
    };

    Ok(Json(SearchAllResponse { reports, inserted }))
}
