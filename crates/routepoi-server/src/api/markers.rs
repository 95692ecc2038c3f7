//! Marker edits within a session.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use routepoi_core::{CanonicalPoi, MarkerRecord, MarkerState, PoiEdit, PoiError, TransitionOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AddMarkerRequest {
    pub poi: CanonicalPoi,
}

#[derive(Debug, Serialize)]
pub struct AddMarkerResponse {
    pub key: String,
    pub inserted: bool,
}

/// Add a user-typed POI as `suggested`.
pub async fn add_marker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddMarkerRequest>,
) -> Result<(StatusCode, Json<AddMarkerResponse>), ApiError> {
    let mut poi = req.poi;
    poi.name = poi.name.trim().to_string();
    if poi.name.is_empty() {
        return Err(PoiError::invalid("marker name is required").into());
    }
    if !(poi.lat.is_finite() && (-90.0..=90.0).contains(&poi.lat))
        || !(poi.lng.is_finite() && (-180.0..=180.0).contains(&poi.lng))
    {
        return Err(PoiError::invalid("marker coordinates are out of range").into());
    }
    if poi.provider.trim().is_empty() {
        poi.provider = "user".to_string();
    }

    let key = poi.identity_key();
    let mut session = state
        .session_mut(&id)
        .ok_or_else(|| ApiError::session_not_found(&id))?;
    let inserted = session.markers.add_custom(poi);
    let status = if inserted {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(AddMarkerResponse { key, inserted })))
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub key: String,
    pub state: MarkerState,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub outcome: TransitionOutcome,
    pub state: MarkerState,
}

pub async fn transition_marker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> Result<Json<TransitionResponse>, ApiError> {
    let mut session = state
        .session_mut(&id)
        .ok_or_else(|| ApiError::session_not_found(&id))?;
    let outcome = session.markers.transition(&req.key, req.state);
    let current = session
        .markers
        .state(&req.key)
        .ok_or_else(|| ApiError::NotFound(format!("marker '{}' not found", req.key)))?;
    Ok(Json(TransitionResponse {
        outcome,
        state: current,
    }))
}

#[derive(Debug, Deserialize)]
pub struct EditMarkerRequest {
    pub key: String,
    pub edit: PoiEdit,
}

#[derive(Debug, Serialize)]
pub struct EditMarkerResponse {
    pub key: String,
    pub marker: MarkerRecord,
}

pub async fn edit_marker(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<EditMarkerRequest>,
) -> Result<Json<EditMarkerResponse>, ApiError> {
    let mut session = state
        .session_mut(&id)
        .ok_or_else(|| ApiError::session_not_found(&id))?;
    if session.markers.get(&req.key).is_none() {
        return Err(ApiError::NotFound(format!("marker '{}' not found", req.key)));
    }
    let key = session.markers.edit(&req.key, req.edit)?;
    let marker = session
        .markers
        .get(&key)
        .cloned()
        .ok_or_else(|| ApiError::NotFound(format!("marker '{}' not found", key)))?;
    Ok(Json(EditMarkerResponse { key, marker }))
}

#[derive(Debug, Serialize)]
pub struct ClearSuggestedResponse {
    pub removed: usize,
}

pub async fn clear_suggested(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ClearSuggestedResponse>, ApiError> {
    let mut session = state
        .session_mut(&id)
        .ok_or_else(|| ApiError::session_not_found(&id))?;
    let removed = session.markers.clear_suggested();
    Ok(Json(ClearSuggestedResponse { removed }))
}
