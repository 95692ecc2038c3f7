//! routepoi client - provider and route store I/O
//!
//! Wraps the pure normalizers from `routepoi-core` in HTTP-backed
//! [`PoiProvider`] implementations and talks to the remote route store.

pub mod google;
pub mod http;
pub mod mock;
pub mod overpass;
pub mod provider;
pub mod reconcile;
pub mod route_store;
pub mod search;

#[cfg(test)]
pub(crate) mod test_support;

pub use google::GooglePlacesProvider;
pub use mock::MockProvider;
pub use overpass::OverpassProvider;
pub use provider::PoiProvider;
pub use reconcile::ReconciliationWriter;
pub use route_store::{InMemoryRouteStore, RouteStore, RouteStoreClient};
pub use search::{search_all, ProviderOutcome, ProviderReport};
