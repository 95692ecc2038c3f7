//! Write accepted markers back to the remote route.

use axum::{
    extract::{Path, State},
    Json,
};
use routepoi_core::{CanonicalPoi, CommitResponse};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::state::{AppState, COMMIT_SLOT};

/// Reconcile `selected` markers into the remote route, then mark them `existing`
/// and pick up remote POIs the session has not seen. Markers added while the
/// write was in flight are kept.
pub async fn commit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CommitResponse>, ApiError> {
    let (route_id, accepted, slot) = {
        let mut session = state
            .session_mut(&id)
            .ok_or_else(|| ApiError::session_not_found(&id))?;
        (
            session.route_id.clone(),
            session.markers.selected(),
            session.slot(COMMIT_SLOT),
        )
    };
    let _guard = slot
        .try_lock_owned()
        .map_err(|_| ApiError::Conflict("a commit is already running for this session".into()))?;

    let result = state.writer().commit(&route_id, &accepted).await?;

    if let Some(mut session) = state.session_mut(&id) {
        if result.added_count > 0 {
            let written = result.pois.iter().filter_map(CanonicalPoi::from_remote);
            session.markers.mark_committed(&accepted, written);
        }
    }
    tracing::info!(
        "Session {}: committed {} POIs to route {} ({} total)",
        id,
        result.added_count,
        route_id,
        result.total_count
    );
    Ok(Json(result.response()))
}
