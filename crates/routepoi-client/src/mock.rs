//! Offline provider returning one synthetic POI.

use crate::provider::PoiProvider;
use async_trait::async_trait;
use routepoi_core::normalize::mock_result;
use routepoi_core::{CanonicalPoi, ProviderContext, Result, SearchParams, MOCK_PROVIDER_ID};

/// Always enabled; servers that do not want it leave it out of their provider list.
#[derive(Debug, Clone, Default)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PoiProvider for MockProvider {
    fn id(&self) -> &'static str {
        MOCK_PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn is_enabled(&self, _context: &ProviderContext) -> bool {
        true
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<CanonicalPoi>> {
        mock_result(params)
    }
}
