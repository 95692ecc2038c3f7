//! Provider capability shared by every POI source.

use async_trait::async_trait;
use routepoi_core::{CanonicalPoi, ProviderContext, Result, SearchParams};

/// A POI source.
///
/// `search` validates its input before any external call; invalid input is
/// [`PoiError::InvalidInput`](routepoi_core::PoiError::InvalidInput). A provider
/// may report an empty result set as [`PoiError::NoResults`](routepoi_core::PoiError::NoResults).
#[async_trait]
pub trait PoiProvider: Send + Sync {
    /// Stable identifier, e.g. `"osm"`.
    fn id(&self) -> &'static str;

    /// Human-readable name.
    fn name(&self) -> &'static str;

    fn is_enabled(&self, context: &ProviderContext) -> bool;

    async fn search(&self, params: &SearchParams) -> Result<Vec<CanonicalPoi>>;
}
