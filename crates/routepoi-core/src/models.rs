//! Core data models for the routepoi engine.

use crate::accessor::{first_array, number_at, string_at};
use crate::error::{PoiError, Result};
use crate::polyline;
use crate::type_map::{self, CanonicalType};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A `(lat, lng)` coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

/// Visible map area supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
}

impl MapBounds {
    /// Bounding box of a point list. `None` when no finite point exists.
    pub fn from_points(points: &[LatLng]) -> Option<Self> {
        let mut finite = points.iter().filter(|p| p.is_finite());
        let first = finite.next()?;
        let mut bounds = MapBounds {
            north: first.lat,
            south: first.lat,
            east: first.lng,
            west: first.lng,
        };
        for p in finite {
            bounds.north = bounds.north.max(p.lat);
            bounds.south = bounds.south.min(p.lat);
            bounds.east = bounds.east.max(p.lng);
            bounds.west = bounds.west.min(p.lng);
        }
        Some(bounds)
    }

    /// Centre of the box. Boxes with `east < west` wrap the antimeridian.
    pub fn center(&self) -> LatLng {
        let lat = (self.north + self.south) / 2.0;
        let lng = if self.east >= self.west {
            (self.east + self.west) / 2.0
        } else {
            let mid = (self.west + self.east + 360.0) / 2.0;
            if mid > 180.0 {
                mid - 360.0
            } else {
                mid
            }
        };
        LatLng::new(lat, lng)
    }

    pub fn contains(&self, point: LatLng) -> bool {
        let lat_ok = point.lat >= self.south && point.lat <= self.north;
        let lng_ok = if self.east >= self.west {
            point.lng >= self.west && point.lng <= self.east
        } else {
            point.lng >= self.west || point.lng <= self.east
        };
        lat_ok && lng_ok
    }

    pub fn validate(&self) -> Result<()> {
        let values = [self.north, self.south, self.east, self.west];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(PoiError::invalid("map bounds must be finite"));
        }
        if !(-90.0..=90.0).contains(&self.north) || !(-90.0..=90.0).contains(&self.south) {
            return Err(PoiError::invalid("map bounds latitude out of range"));
        }
        if !(-180.0..=180.0).contains(&self.east) || !(-180.0..=180.0).contains(&self.west) {
            return Err(PoiError::invalid("map bounds longitude out of range"));
        }
        if self.north < self.south {
            return Err(PoiError::invalid("map bounds north is below south"));
        }
        Ok(())
    }
}

/// Origin used by Google to rank results along a route.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutingOrigin {
    pub latitude: f64,
    pub longitude: f64,
}

/// One track point as stored by the route store (`x` = lon, `y` = lat).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    /// Distance along the route in metres.
    #[serde(default)]
    pub d: f64,
    /// Elevation in metres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteGeometry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_polyline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_points: Option<Vec<TrackPoint>>,
}

impl RouteGeometry {
    pub fn from_polyline(encoded: impl Into<String>) -> Self {
        Self {
            encoded_polyline: Some(encoded.into()),
            track_points: None,
        }
    }

    pub fn from_track_points(points: Vec<TrackPoint>) -> Self {
        Self {
            encoded_polyline: None,
            track_points: Some(points),
        }
    }

    fn stored_polyline(&self) -> Option<&str> {
        self.encoded_polyline
            .as_deref()
            .filter(|encoded| !encoded.is_empty())
    }

    fn finite_track(&self) -> Vec<LatLng> {
        self.track_points
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|p| LatLng::new(p.y, p.x))
            .filter(LatLng::is_finite)
            .collect()
    }

    /// Encoded polyline for this route, derived from track points when absent.
    pub fn resolved_polyline(&self) -> Option<String> {
        if let Some(encoded) = self.stored_polyline() {
            return Some(encoded.to_string());
        }
        let track = self.finite_track();
        if track.is_empty() {
            return None;
        }
        Some(polyline::encode(&track))
    }

    /// Derive and store the encoded polyline so later consumers see one value.
    pub fn ensure_polyline(&mut self) -> Option<&str> {
        if self.stored_polyline().is_none() {
            self.encoded_polyline = self.resolved_polyline();
        }
        self.stored_polyline()
    }

    pub fn has_route(&self) -> bool {
        self.stored_polyline().is_some() || !self.finite_track().is_empty()
    }

    /// Route coordinates, preferring track points over the encoded polyline.
    pub fn coordinates(&self) -> Result<Vec<LatLng>> {
        let track = self.finite_track();
        if !track.is_empty() {
            return Ok(track);
        }
        match self.stored_polyline() {
            Some(encoded) => polyline::decode(encoded),
            None => Ok(Vec::new()),
        }
    }

    pub fn bounds(&self) -> Option<MapBounds> {
        let coords = self.coordinates().ok()?;
        MapBounds::from_points(&coords)
    }
}

/// Unified point of interest, independent of the provider it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalPoi {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "type", default)]
    pub poi_type: CanonicalType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_source_id: Option<String>,
}

impl CanonicalPoi {
    pub fn new(name: impl Into<String>, lat: f64, lng: f64, provider: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            lat,
            lng,
            poi_type: CanonicalType::Generic,
            description: None,
            url: None,
            provider: provider.into(),
            raw_source_id: None,
        }
    }

    pub fn with_type(mut self, poi_type: CanonicalType) -> Self {
        self.poi_type = poi_type;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_source_id(mut self, id: impl Into<String>) -> Self {
        self.raw_source_id = Some(id.into());
        self
    }

    /// Identity key: name, latitude and longitude, exact values.
    ///
    /// Two distinct POIs with the same name and coordinates share a key.
    pub fn identity_key(&self) -> String {
        identity_key(&self.name, self.lat, self.lng)
    }

    /// Build from a remote route store POI record. `None` when the record lacks
    /// a name or finite coordinates.
    pub fn from_remote(record: &Value) -> Option<Self> {
        let lat = number_at(record, &["lat"]).or_else(|| number_at(record, &["latitude"]))?;
        let lng = number_at(record, &["lng"])
            .or_else(|| number_at(record, &["lon"]))
            .or_else(|| number_at(record, &["longitude"]))?;
        if !lat.is_finite() || !lng.is_finite() {
            return None;
        }
        let name = string_at(record, &["name"]).filter(|n| !n.trim().is_empty())?;

        // An unrecognised typeName parses as generic; prefer the typeId then.
        let by_name = string_at(record, &["typeName"])
            .map(|type_name| type_name.parse::<CanonicalType>().unwrap_or_default())
            .filter(|t| *t != CanonicalType::Generic);
        let by_id = number_at(record, &["typeId"])
            .map(|id| type_map::external_id_to_canonical(id as i64));
        let poi_type = by_name.or(by_id).unwrap_or_default();

        Some(Self {
            name: name.to_string(),
            lat,
            lng,
            poi_type,
            description: string_at(record, &["description"])
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            url: string_at(record, &["url"])
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            provider: "route".to_string(),
            raw_source_id: record.get("id").map(|id| match id {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
        })
    }
}

pub fn identity_key(name: &str, lat: f64, lng: f64) -> String {
    format!("{}|{}|{}", name, lat, lng)
}

/// User edit applied to a POI before acceptance. `None` leaves a field unchanged;
/// an empty description or url clears it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiEdit {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub poi_type: Option<CanonicalType>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Provider search input shared by every provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub text_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoded_polyline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_bounds: Option<MapBounds>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routing_origin: Option<RoutingOrigin>,
}

impl SearchParams {
    pub fn new(text_query: impl Into<String>) -> Self {
        Self {
            text_query: text_query.into(),
            ..Default::default()
        }
    }

    pub fn with_polyline(mut self, encoded: impl Into<String>) -> Self {
        self.encoded_polyline = Some(encoded.into());
        self
    }

    pub fn with_bounds(mut self, bounds: MapBounds) -> Self {
        self.map_bounds = Some(bounds);
        self
    }

    pub fn with_origin(mut self, origin: RoutingOrigin) -> Self {
        self.routing_origin = Some(origin);
        self
    }

    /// Non-empty route polyline, if any.
    pub fn route_polyline(&self) -> Option<&str> {
        self.encoded_polyline
            .as_deref()
            .map(str::trim)
            .filter(|encoded| !encoded.is_empty())
    }

    /// Checks shared by all providers, run before any external call.
    pub fn validate(&self) -> Result<()> {
        if self.text_query.trim().is_empty() {
            return Err(PoiError::invalid("search query text is required"));
        }
        if let Some(bounds) = &self.map_bounds {
            bounds.validate()?;
        }
        if let Some(origin) = &self.routing_origin {
            if !origin.latitude.is_finite() || !origin.longitude.is_finite() {
                return Err(PoiError::invalid("routing origin must be finite"));
            }
        }
        Ok(())
    }
}

/// Facts a provider needs to decide whether it can run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderContext {
    pub has_route: bool,
    pub google_api_key_configured: bool,
}

/// One fresh read of a remote route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSnapshot {
    pub route_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub owner_id: Option<Value>,
    #[serde(default)]
    pub geometry: RouteGeometry,
    /// Remote POI records, verbatim.
    #[serde(default)]
    pub pois: Vec<Value>,
}

const POI_LIST_PATHS: &[&[&str]] = &[
    &["route", "points_of_interest"],
    &["points_of_interest"],
    &["route", "pois"],
    &["pois"],
];

impl RouteSnapshot {
    /// Parse a route store document. The `route` wrapper object is optional.
    pub fn from_json(route_id: impl Into<String>, document: &Value) -> Result<Self> {
        if !document.is_object() {
            return Err(PoiError::invalid("route document is not a JSON object"));
        }
        let route = document
            .get("route")
            .filter(|value| value.is_object())
            .unwrap_or(document);

        let track_points = route
            .get("track_points")
            .and_then(Value::as_array)
            .map(|points| {
                points
                    .iter()
                    .filter_map(|p| serde_json::from_value::<TrackPoint>(p.clone()).ok())
                    .collect::<Vec<_>>()
            })
            .filter(|points| !points.is_empty());

        let geometry = RouteGeometry {
            encoded_polyline: string_at(route, &["encoded_polyline"])
                .or_else(|| string_at(route, &["polyline"]))
                .filter(|encoded| !encoded.is_empty())
                .map(str::to_string),
            track_points,
        };

        let pois = first_array(document, POI_LIST_PATHS)
            .cloned()
            .unwrap_or_default();

        Ok(Self {
            route_id: route_id.into(),
            name: string_at(route, &["name"]).map(str::to_string),
            owner_id: route
                .get("user_id")
                .or_else(|| route.get("ownerId"))
                .filter(|v| !v.is_null())
                .cloned(),
            geometry,
            pois,
        })
    }

    /// Existing remote POIs as canonical records; malformed entries are skipped.
    pub fn canonical_pois(&self) -> Vec<CanonicalPoi> {
        self.pois
            .iter()
            .filter_map(CanonicalPoi::from_remote)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bounds_center() {
        let bounds = MapBounds {
            north: 10.0,
            south: 0.0,
            east: 20.0,
            west: 10.0,
        };
        assert_eq!(bounds.center(), LatLng::new(5.0, 15.0));
        assert!(bounds.contains(LatLng::new(5.0, 15.0)));
        assert!(!bounds.contains(LatLng::new(11.0, 15.0)));
    }

    #[test]
    fn test_bounds_center_across_antimeridian() {
        let bounds = MapBounds {
            north: 1.0,
            south: -1.0,
            east: -170.0,
            west: 170.0,
        };
        let center = bounds.center();
        assert!((center.lng.abs() - 180.0).abs() < 1e-9);
        assert!(bounds.contains(LatLng::new(0.0, 179.0)));
    }

    #[test]
    fn test_bounds_validation() {
        let inverted = MapBounds {
            north: 0.0,
            south: 10.0,
            east: 1.0,
            west: 0.0,
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_identity_key_is_exact() {
        let a = CanonicalPoi::new("Cafe", 47.123_45, 8.5, "osm");
        let b = CanonicalPoi::new("Cafe", 47.123_45, 8.5, "google");
        let c = CanonicalPoi::new("Cafe", 47.123_451, 8.5, "osm");
        assert_eq!(a.identity_key(), b.identity_key());
        assert_ne!(a.identity_key(), c.identity_key());
    }

    #[test]
    fn test_geometry_derives_polyline_from_track_points() {
        let mut geometry = RouteGeometry::from_track_points(vec![
            TrackPoint { x: -120.2, y: 38.5, d: 0.0, e: None },
            TrackPoint { x: -120.95, y: 40.7, d: 250_000.0, e: Some(12.0) },
            TrackPoint { x: -126.453, y: 43.252, d: 800_000.0, e: None },
        ]);
        assert!(geometry.has_route());
        assert_eq!(
            geometry.resolved_polyline().as_deref(),
            Some("_p~iF~ps|U_ulLnnqC_mqNvxq`@")
        );
        geometry.ensure_polyline();
        assert_eq!(
            geometry.encoded_polyline.as_deref(),
            Some("_p~iF~ps|U_ulLnnqC_mqNvxq`@")
        );
    }

    #[test]
    fn test_empty_geometry_has_no_route() {
        let geometry = RouteGeometry::from_polyline("");
        assert!(!geometry.has_route());
        assert!(geometry.resolved_polyline().is_none());
        assert!(geometry.bounds().is_none());
    }

    #[test]
    fn test_search_params_require_query() {
        assert!(SearchParams::new("   ").validate().is_err());
        assert!(SearchParams::new("coffee").validate().is_ok());
    }

    #[test]
    fn test_snapshot_from_wrapped_document() {
        let doc = json!({
            "route": {
                "id": 42,
                "name": "Lakeside loop",
                "user_id": 7,
                "track_points": [
                    {"x": 8.5, "y": 47.3, "d": 0.0},
                    {"x": 8.6, "y": 47.4, "d": 1200.0, "e": 410.0},
                    {"bogus": true}
                ],
                "points_of_interest": [
                    {"lat": 47.31, "lng": 8.51, "name": "Bakery", "typeId": 3, "custom": "kept"}
                ]
            }
        });
        let snapshot = RouteSnapshot::from_json("42", &doc).unwrap();
        assert_eq!(snapshot.name.as_deref(), Some("Lakeside loop"));
        assert_eq!(snapshot.owner_id, Some(json!(7)));
        assert_eq!(snapshot.geometry.track_points.as_ref().map(Vec::len), Some(2));
        assert_eq!(snapshot.pois.len(), 1);
        assert_eq!(snapshot.pois[0]["custom"], "kept");
    }

    #[test]
    fn test_snapshot_without_pois_is_empty() {
        let doc = json!({"name": "Fresh route", "encoded_polyline": "_p~iF~ps|U"});
        let snapshot = RouteSnapshot::from_json("1", &doc).unwrap();
        assert!(snapshot.pois.is_empty());
        assert!(snapshot.geometry.has_route());
    }

    #[test]
    fn test_snapshot_rejects_non_object() {
        assert!(RouteSnapshot::from_json("1", &json!([1, 2])).is_err());
    }

    #[test]
    fn test_from_remote_skips_malformed_records() {
        let snapshot = RouteSnapshot {
            route_id: "1".into(),
            name: None,
            owner_id: None,
            geometry: RouteGeometry::default(),
            pois: vec![
                json!({"lat": 1.0, "lng": 2.0, "name": "Water", "typeName": "water"}),
                json!({"lat": "north", "lng": 2.0, "name": "Broken"}),
                json!({"lat": 1.0, "lng": 2.0}),
            ],
        };
        let pois = snapshot.canonical_pois();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].poi_type, CanonicalType::Water);
        assert_eq!(pois[0].provider, "route");
    }

    #[test]
    fn test_from_remote_falls_back_to_type_id() {
        let fuel_id = type_map::canonical_type_to_external_id(CanonicalType::Fuel);
        let record = json!({
            "lat": 1.0, "lng": 2.0, "name": "Pump",
            "typeName": "gas_station_legacy", "typeId": fuel_id
        });
        let poi = CanonicalPoi::from_remote(&record).unwrap();
        assert_eq!(poi.poi_type, CanonicalType::Fuel);

        let named = json!({"lat": 1.0, "lng": 2.0, "name": "Spring", "typeName": "water", "typeId": fuel_id});
        assert_eq!(CanonicalPoi::from_remote(&named).unwrap().poi_type, CanonicalType::Water);
    }

    #[test]
    fn test_poi_without_provider_deserializes() {
        let poi: CanonicalPoi =
            serde_json::from_value(json!({"name": "Bench", "lat": 1.0, "lng": 2.0})).unwrap();
        assert!(poi.provider.is_empty());
        assert_eq!(poi.poi_type, CanonicalType::Generic);
    }
}
