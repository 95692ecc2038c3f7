//! OpenStreetMap Overpass: query text and response normalization.

use super::{dedupe_by_key, humanize, OSM_PROVIDER_ID};
use crate::accessor::{first_coordinate, string_at, CoordinatePath};
use crate::error::{PoiError, Result};
use crate::models::{CanonicalPoi, LatLng, MapBounds, SearchParams};
use crate::sampler::{self, SamplerConfig};
use crate::type_map::map_osm_tag;
use serde_json::Value;
use std::fmt;

/// Server-side timeout embedded in the query header.
pub const QUERY_TIMEOUT_S: u32 = 25;
/// Search radius around each sampled route point.
pub const AROUND_RADIUS_M: u32 = 500;

const ELEMENT_TYPES: [&str; 3] = ["node", "way", "relation"];

const COORDINATE_PATHS: &[CoordinatePath] = &[
    CoordinatePath::new(&["lat"], &["lon"]),
    CoordinatePath::new(&["center", "lat"], &["center", "lon"]),
];

/// Where an Overpass query looks for amenities.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryArea {
    /// Within [`AROUND_RADIUS_M`] of each sampled route point.
    Around(Vec<LatLng>),
    /// Inside the visible map area.
    Bounds(MapBounds),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OverpassQuery {
    amenities: Vec<String>,
    area: QueryArea,
}

impl OverpassQuery {
    pub fn new(amenities: Vec<String>, area: QueryArea) -> Result<Self> {
        if amenities.is_empty() {
            return Err(PoiError::invalid("at least one amenity value is required"));
        }
        match &area {
            QueryArea::Around(points) if points.is_empty() => {
                return Err(PoiError::invalid("route has no points to search around"));
            }
            QueryArea::Bounds(bounds) => bounds.validate()?,
            _ => {}
        }
        Ok(Self { amenities, area })
    }

    /// Build from search input: sampled route points when a polyline is present,
    /// otherwise the map bounds.
    pub fn from_params(params: &SearchParams, config: &SamplerConfig) -> Result<Self> {
        params.validate()?;
        config.validate()?;
        let amenities = parse_amenities(&params.text_query)?;

        if let Some(encoded) = params.route_polyline() {
            let points = sampler::sample_encoded(encoded, config)?;
            if !points.is_empty() {
                return Self::new(amenities, QueryArea::Around(points));
            }
        }
        match params.map_bounds {
            Some(bounds) => Self::new(amenities, QueryArea::Bounds(bounds)),
            None => Err(PoiError::invalid(
                "OSM search requires a route polyline or map bounds",
            )),
        }
    }

    pub fn amenities(&self) -> &[String] {
        &self.amenities
    }

    pub fn area(&self) -> &QueryArea {
        &self.area
    }

    fn filter(&self) -> String {
        format!("[\"amenity\"~\"^({})$\"]", self.amenities.join("|"))
    }

    fn spatial_clauses(&self) -> Vec<String> {
        match &self.area {
            QueryArea::Around(points) => points
                .iter()
                .map(|p| format!("(around:{},{:.6},{:.6})", AROUND_RADIUS_M, p.lat, p.lng))
                .collect(),
            QueryArea::Bounds(b) => vec![format!(
                "({:.6},{:.6},{:.6},{:.6})",
                b.south, b.west, b.north, b.east
            )],
        }
    }

    pub fn to_query_string(&self) -> String {
        let filter = self.filter();
        let mut query = format!("[out:json][timeout:{}];\n(\n", QUERY_TIMEOUT_S);
        for clause in self.spatial_clauses() {
            for element in ELEMENT_TYPES {
                query.push_str(&format!("  {}{}{};\n", element, filter, clause));
            }
        }
        query.push_str(");\nout center;");
        query
    }
}

impl fmt::Display for OverpassQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Parse the requested amenity values from free text such as
/// `"amenity=fuel, cafe drinking_water"`.
pub fn parse_amenities(text: &str) -> Result<Vec<String>> {
    let mut amenities: Vec<String> = Vec::new();
    for token in text.split(|c: char| c == ',' || c.is_whitespace()) {
        let token = token.trim().to_ascii_lowercase();
        let value = token.strip_prefix("amenity=").unwrap_or(&token);
        if value.is_empty() {
            continue;
        }
        let valid = value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid {
            return Err(PoiError::invalid(format!(
                "'{}' is not a valid amenity value",
                value
            )));
        }
        if !amenities.iter().any(|a| a == value) {
            amenities.push(value.to_string());
        }
    }
    if amenities.is_empty() {
        return Err(PoiError::invalid("at least one amenity value is required"));
    }
    Ok(amenities)
}

/// Normalize an Overpass JSON response. An empty result set, including one where
/// every element was malformed, is [`PoiError::NoResults`].
pub fn normalize_overpass(payload: &Value) -> Result<Vec<CanonicalPoi>> {
    let elements = payload
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| PoiError::provider(OSM_PROVIDER_ID, "response has no `elements` array"))?;

    let pois: Vec<CanonicalPoi> = elements.iter().filter_map(element_to_poi).collect();
    if pois.is_empty() {
        return Err(PoiError::no_results(OSM_PROVIDER_ID));
    }
    Ok(dedupe_by_key(pois))
}

fn element_to_poi(element: &Value) -> Option<CanonicalPoi> {
    let (lat, lng) = first_coordinate(element, COORDINATE_PATHS)?;
    let element_type = string_at(element, &["type"]).unwrap_or("node");
    let id = element.get("id").and_then(Value::as_i64);
    let tag = |key: &str| {
        string_at(element, &["tags", key])
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let amenity = tag("amenity");
    let name = match tag("name") {
        Some(name) => name.to_string(),
        None => humanize(amenity?),
    };
    let poi_type = amenity
        .map(|value| map_osm_tag(&format!("amenity={}", value)))
        .unwrap_or_default();

    let mut poi = CanonicalPoi::new(name, lat, lng, OSM_PROVIDER_ID).with_type(poi_type);
    let url = tag("website").map(str::to_string).or_else(|| {
        id.map(|id| format!("https://www.openstreetmap.org/{}/{}", element_type, id))
    });
    if let Some(url) = url {
        poi = poi.with_url(url);
    }
    let description = tag("description")
        .map(str::to_string)
        .or_else(|| tag("opening_hours").map(|hours| format!("Opening hours: {}", hours)));
    if let Some(description) = description {
        poi = poi.with_description(description);
    }
    if let Some(id) = id {
        poi = poi.with_source_id(format!("{}/{}", element_type, id));
    }
    Some(poi)
}
