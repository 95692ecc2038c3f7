//! Route POI aggregation engine.
//!
//! Pure logic shared by the client, server and CLI crates: polyline coding,
//! route sampling, type mapping, provider payload normalization, per-session
//! marker state and the merge step of write-back. Nothing here performs I/O.

pub mod accessor;
pub mod error;
pub mod markers;
pub mod models;
pub mod normalize;
pub mod polyline;
pub mod reconcile;
pub mod sampler;
pub mod type_map;

pub use error::{PoiError, Result, WriteBackStage};
pub use markers::{MarkerCounts, MarkerRecord, MarkerState, MarkerStateStore, TransitionOutcome};
pub use models::{
    identity_key, CanonicalPoi, LatLng, MapBounds, PoiEdit, ProviderContext, RouteGeometry,
    RouteSnapshot, RoutingOrigin, SearchParams, TrackPoint,
};
pub use normalize::{
    google_request_body, mock_result, normalize_google, normalize_overpass, parse_amenities,
    OverpassQuery, QueryArea, GOOGLE_PROVIDER_ID, MOCK_PROVIDER_ID, OSM_PROVIDER_ID,
};
pub use reconcile::{merge_for_write, to_remote_record, CommitResponse, CommitResult, RemotePoiRecord};
pub use sampler::SamplerConfig;
pub use type_map::{
    canonical_type_to_external_id, external_id_to_canonical, map_google_type, map_osm_tag,
    CanonicalType,
};
