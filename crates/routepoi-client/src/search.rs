//! Fan-out search across every enabled provider.

use crate::provider::PoiProvider;
use futures::future::join_all;
use routepoi_core::{CanonicalPoi, PoiError, ProviderContext, SearchParams};
use serde::Serialize;
use std::sync::Arc;

/// Result of one provider within a fan-out search.
#[derive(Debug, Clone)]
pub enum ProviderOutcome {
    Found(Vec<CanonicalPoi>),
    NoResults,
    Failed(PoiError),
    /// Disabled for this context; no call was made.
    Skipped,
}

impl ProviderOutcome {
    pub fn from_result(result: routepoi_core::Result<Vec<CanonicalPoi>>) -> Self {
        match result {
            Ok(pois) if pois.is_empty() => ProviderOutcome::NoResults,
            Ok(pois) => ProviderOutcome::Found(pois),
            Err(err) if err.is_no_results() => ProviderOutcome::NoResults,
            Err(err) => ProviderOutcome::Failed(err),
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            ProviderOutcome::Found(_) => "found",
            ProviderOutcome::NoResults => "no_results",
            ProviderOutcome::Failed(_) => "failed",
            ProviderOutcome::Skipped => "skipped",
        }
    }

    pub fn pois(&self) -> &[CanonicalPoi] {
        match self {
            ProviderOutcome::Found(pois) => pois,
            _ => &[],
        }
    }
}

/// Per-provider outcome, serialized as `{provider, status, pois, error?}`.
#[derive(Debug, Clone)]
pub struct ProviderReport {
    pub provider: &'static str,
    pub outcome: ProviderOutcome,
}

#[derive(Serialize)]
struct ProviderReportBody<'a> {
    provider: &'a str,
    status: &'a str,
    pois: &'a [CanonicalPoi],
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl Serialize for ProviderReport {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let error = match &self.outcome {
            ProviderOutcome::Failed(err) => Some(err.to_string()),
            _ => None,
        };
        ProviderReportBody {
            provider: self.provider,
            status: self.outcome.status(),
            pois: self.outcome.pois(),
            error,
        }
        .serialize(serializer)
    }
}

/// Search every enabled provider concurrently. A failing provider never aborts
/// the others; reports come back in provider order.
pub async fn search_all(
    providers: &[Arc<dyn PoiProvider>],
    params: &SearchParams,
    context: &ProviderContext,
) -> Vec<ProviderReport> {
    let searches = providers.iter().map(|provider| async move {
        let outcome = if provider.is_enabled(context) {
            ProviderOutcome::from_result(provider.search(params).await)
        } else {
            ProviderOutcome::Skipped
        };
        if let ProviderOutcome::Failed(err) = &outcome {
            tracing::warn!("Provider {} failed: {}", provider.id(), err);
        }
        ProviderReport {
            provider: provider.id(),
            outcome,
        }
    });
    join_all(searches).await
}
