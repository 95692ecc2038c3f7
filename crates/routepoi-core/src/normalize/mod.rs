//! Translation of raw provider payloads into [`CanonicalPoi`] records.
//!
//! Each provider has its own module. Malformed individual results are dropped;
//! only a malformed top-level payload is an error.

pub mod google;
pub mod mock;
pub mod overpass;

use crate::models::CanonicalPoi;
use std::collections::HashSet;

pub use google::{google_request_body, normalize_google, GOOGLE_FIELD_MASK};
pub use mock::{mock_result, DEFAULT_MOCK_CENTER};
pub use overpass::{normalize_overpass, parse_amenities, OverpassQuery, QueryArea};

pub const GOOGLE_PROVIDER_ID: &str = "google";
pub const OSM_PROVIDER_ID: &str = "osm";
pub const MOCK_PROVIDER_ID: &str = "mock";

/// Keep the first POI for each identity key, preserving order.
pub fn dedupe_by_key(pois: Vec<CanonicalPoi>) -> Vec<CanonicalPoi> {
    let mut seen = HashSet::new();
    pois.into_iter()
        .filter(|poi| seen.insert(poi.identity_key()))
        .collect()
}

/// `"drinking_water"` → `"Drinking water"`.
pub fn humanize(value: &str) -> String {
    let spaced = value.trim().replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
