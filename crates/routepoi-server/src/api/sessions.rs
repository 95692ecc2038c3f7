//! Session lifecycle and provider listing.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use routepoi_core::{CanonicalPoi, MarkerState};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::state::{AppState, Session, SessionSummary};

#[derive(Debug, Serialize)]
pub struct ProviderInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub enabled: bool,
}

/// Configured providers, evaluated without a route.
pub async fn list_providers(State(state): State<Arc<AppState>>) -> Json<Vec<ProviderInfo>> {
    let context = state.provider_context(false);
    let providers = state
        .providers()
        .iter()
        .map(|provider| ProviderInfo {
            id: provider.id(),
            name: provider.name(),
            enabled: provider.is_enabled(&context),
        })
        .collect();
    Json(providers)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub route_id: String,
}

/// Load the route and seed its POIs as `existing` markers.
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<SessionSummary>), ApiError> {
    let route_id = req.route_id.trim();
    if route_id.is_empty() {
        return Err(routepoi_core::PoiError::invalid("routeId is required").into());
    }

    let snapshot = state.writer().store().fetch_route(route_id).await?;
    let session = Session::from_snapshot(snapshot);
    let summary = state.insert_session(session);
    tracing::info!(
        "Opened session {} for route {} ({} existing POIs)",
        summary.session_id,
        summary.route_id,
        summary.counts.existing
    );
    Ok((StatusCode::CREATED, Json(summary)))
}

#[derive(Debug, Serialize)]
pub struct MarkerView {
    pub key: String,
    pub state: MarkerState,
    pub poi: CanonicalPoi,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub markers: Vec<MarkerView>,
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let session = state
        .session_mut(&id)
        .ok_or_else(|| ApiError::session_not_found(&id))?;
    let markers = session
        .markers
        .all()
        .map(|(key, record)| MarkerView {
            key: key.to_string(),
            state: record.state,
            poi: record.poi.clone(),
        })
        .collect();
    Ok(Json(SessionView {
        summary: session.summary(),
        markers,
    }))
}

/// Discard the session; unwritten selections are lost.
pub async fn delete_session(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    if state.remove_session(&id) {
        tracing::info!("Closed session {}", id);
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
