//! Fetch-merge-write of accepted POIs into the remote route.

use crate::route_store::RouteStore;
use routepoi_core::reconcile::merge_for_write;
use routepoi_core::{CanonicalPoi, CommitResult, PoiError, Result, WriteBackStage};
use std::sync::Arc;

/// Commits accepted POIs to a [`RouteStore`].
///
/// The remote list is re-read immediately before each write and kept verbatim.
/// No lock is held on the remote list, so a writer landing between the fetch and
/// the write is overwritten.
#[derive(Clone)]
pub struct ReconciliationWriter {
    store: Arc<dyn RouteStore>,
}

impl ReconciliationWriter {
    pub fn new(store: Arc<dyn RouteStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RouteStore> {
        &self.store
    }

    pub async fn commit(&self, route_id: &str, accepted: &[CanonicalPoi]) -> Result<CommitResult> {
        let snapshot = self
            .store
            .fetch_route(route_id)
            .await
            .map_err(|err| into_write_back(err, WriteBackStage::Fetch))?;
        let existing_count = snapshot.pois.len();

        if accepted.is_empty() {
            tracing::debug!("Nothing to commit for route {}", route_id);
            return Ok(CommitResult {
                added_count: 0,
                total_count: existing_count,
                pois: snapshot.pois,
            });
        }

        let merged = merge_for_write(snapshot.pois, accepted, snapshot.owner_id.as_ref())?;
        self.store
            .replace_pois(route_id, merged.clone())
            .await
            .map_err(|err| into_write_back(err, WriteBackStage::Write))?;

        tracing::info!(
            "Committed {} POIs to route {} ({} total)",
            accepted.len(),
            route_id,
            merged.len()
        );
        Ok(CommitResult {
            added_count: accepted.len(),
            total_count: merged.len(),
            pois: merged,
        })
    }
}

fn into_write_back(err: PoiError, stage: WriteBackStage) -> PoiError {
    match err {
        PoiError::WriteBack { .. } => err,
        other => PoiError::write_back(stage, other.to_string()),
    }
}
