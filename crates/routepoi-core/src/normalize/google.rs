//! Google Places "search text along route" payloads.

use super::{dedupe_by_key, GOOGLE_PROVIDER_ID};
use crate::accessor::{first_coordinate, string_at, CoordinatePath};
use crate::error::{PoiError, Result};
use crate::models::{CanonicalPoi, SearchParams};
use crate::type_map::map_google_type;
use serde_json::{json, Value};

/// Fields requested from Places; only these are read back.
pub const GOOGLE_FIELD_MASK: &str = "places.id,places.displayName,places.location,\
places.primaryType,places.types,places.googleMapsUri,places.editorialSummary";

/// Coordinate shapes seen across Places API versions, tried in order.
const COORDINATE_PATHS: &[CoordinatePath] = &[
    CoordinatePath::new(&["location", "latitude"], &["location", "longitude"]),
    CoordinatePath::new(&["location", "lat"], &["location", "lng"]),
    CoordinatePath::new(
        &["geometry", "location", "lat"],
        &["geometry", "location", "lng"],
    ),
    CoordinatePath::new(&["center", "lat"], &["center", "lng"]),
];

/// JSON body for `places:searchText` along the route polyline.
pub fn google_request_body(params: &SearchParams) -> Result<Value> {
    params.validate()?;
    let encoded = params
        .route_polyline()
        .ok_or_else(|| PoiError::invalid("Google search requires an encoded route polyline"))?;

    let mut body = json!({
        "textQuery": params.text_query.trim(),
        "searchAlongRouteParameters": {
            "polyline": { "encodedPolyline": encoded }
        }
    });
    if let Some(origin) = params.routing_origin {
        body["routingParameters"] = json!({
            "origin": { "latitude": origin.latitude, "longitude": origin.longitude }
        });
    }
    Ok(body)
}

/// Normalize a `places:searchText` response. A missing `places` array means zero
/// results; a non-object payload is a provider error.
pub fn normalize_google(payload: &Value) -> Result<Vec<CanonicalPoi>> {
    if !payload.is_object() {
        return Err(PoiError::provider(
            GOOGLE_PROVIDER_ID,
            "response is not a JSON object",
        ));
    }
    let places = match payload.get("places") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(places)) => places,
        Some(_) => {
            return Err(PoiError::provider(
                GOOGLE_PROVIDER_ID,
                "`places` is not an array",
            ))
        }
    };

    let pois = places.iter().filter_map(place_to_poi).collect();
    Ok(dedupe_by_key(pois))
}

fn place_to_poi(place: &Value) -> Option<CanonicalPoi> {
    let name = string_at(place, &["displayName", "text"])
        .or_else(|| string_at(place, &["displayName"]))
        .or_else(|| string_at(place, &["title"]))
        .map(str::trim)
        .filter(|name| !name.is_empty())?;
    let (lat, lng) = first_coordinate(place, COORDINATE_PATHS)?;

    let category = string_at(place, &["primaryType"]).or_else(|| {
        place
            .get("types")
            .and_then(Value::as_array)
            .and_then(|types| types.first())
            .and_then(Value::as_str)
    });

    let mut poi = CanonicalPoi::new(name, lat, lng, GOOGLE_PROVIDER_ID)
        .with_type(category.map(map_google_type).unwrap_or_default());
    if let Some(url) = string_at(place, &["googleMapsUri"]).filter(|u| !u.is_empty()) {
        poi = poi.with_url(url);
    }
    if let Some(summary) = string_at(place, &["editorialSummary", "text"]).filter(|s| !s.is_empty())
    {
        poi = poi.with_description(summary);
    }
    if let Some(id) = string_at(place, &["id"]) {
        poi = poi.with_source_id(id);
    }
    Some(poi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LatLng, RoutingOrigin};
    use crate::polyline;
    use crate::type_map::CanonicalType;

    fn twenty_point_route() -> String {
        let coords: Vec<LatLng> = (0..20)
            .map(|i| LatLng::new(37.77 + i as f64 * 0.002, -122.42 + i as f64 * 0.001))
            .collect();
        polyline::encode(&coords)
    }

    #[test]
    fn test_request_body_requires_route() {
        let err = google_request_body(&SearchParams::new("coffee")).unwrap_err();
        assert!(matches!(err, PoiError::InvalidInput { .. }));
    }

    #[test]
    fn test_request_body_shape() {
        let encoded = twenty_point_route();
        let params = SearchParams::new(" coffee ")
            .with_polyline(encoded.clone())
            .with_origin(RoutingOrigin {
                latitude: 37.77,
                longitude: -122.42,
            });
        let body = google_request_body(&params).unwrap();
        assert_eq!(body["textQuery"], "coffee");
        assert_eq!(
            body["searchAlongRouteParameters"]["polyline"]["encodedPolyline"],
            encoded.as_str()
        );
        assert_eq!(body["routingParameters"]["origin"]["latitude"], 37.77);
    }

    #[test]
    fn test_coffee_search_along_route() {
        let payload = json!({
            "places": [
                {
                    "id": "abc",
                    "displayName": {"text": "Blue Door Coffee", "languageCode": "en"},
                    "location": {"latitude": 37.775, "longitude": -122.418},
                    "primaryType": "coffee_shop",
                    "googleMapsUri": "https://maps.google.com/?cid=1",
                    "editorialSummary": {"text": "Small-batch roaster."}
                },
                {
                    "displayName": {"text": "Roastery Lab"},
                    "location": {"lat": 37.78, "lng": -122.41},
                    "primaryType": "coffee_roastery_xyz"
                },
                {
                    "displayName": {"text": "Old API shape"},
                    "geometry": {"location": {"lat": 37.79, "lng": -122.40}}
                },
                {
                    "displayName": {"text": "No coordinates"},
                    "location": {"latitude": "n/a"}
                }
            ]
        });
        let pois = normalize_google(&payload).unwrap();
        assert_eq!(pois.len(), 3);
        assert!(pois.iter().all(|p| p.lat.is_finite() && p.lng.is_finite()));
        assert_eq!(pois[0].poi_type, CanonicalType::Coffee);
        assert_eq!(pois[0].url.as_deref(), Some("https://maps.google.com/?cid=1"));
        assert_eq!(pois[0].description.as_deref(), Some("Small-batch roaster."));
        assert_eq!(pois[0].raw_source_id.as_deref(), Some("abc"));
        assert_eq!(pois[1].poi_type, CanonicalType::Generic);
        assert_eq!(pois[2].poi_type, CanonicalType::Generic);
    }

    #[test]
    fn test_center_shape_and_types_fallback() {
        let payload = json!({
            "places": [{
                "displayName": "Trail Cafe",
                "center": {"lat": 1.0, "lng": 2.0},
                "types": ["cafe", "food"]
            }]
        });
        let pois = normalize_google(&payload).unwrap();
        assert_eq!(pois[0].name, "Trail Cafe");
        assert_eq!(pois[0].poi_type, CanonicalType::Coffee);
    }

    #[test]
    fn test_empty_response_is_success() {
        assert!(normalize_google(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_top_level_is_provider_error() {
        assert!(matches!(
            normalize_google(&json!("oops")),
            Err(PoiError::Provider { .. })
        ));
        assert!(matches!(
            normalize_google(&json!({"places": {"a": 1}})),
            Err(PoiError::Provider { .. })
        ));
    }
}
