//! Offline provider result used for demos and tests.

use super::MOCK_PROVIDER_ID;
use crate::error::Result;
use crate::models::{CanonicalPoi, LatLng, SearchParams};

/// Used when the caller supplies no map bounds.
pub const DEFAULT_MOCK_CENTER: LatLng = LatLng {
    lat: 37.7749,
    lng: -122.4194,
};

/// Exactly one generic POI at the centre of the map bounds, named after the query.
pub fn mock_result(params: &SearchParams) -> Result<Vec<CanonicalPoi>> {
    params.validate()?;
    let center = params
        .map_bounds
        .map(|bounds| bounds.center())
        .unwrap_or(DEFAULT_MOCK_CENTER);
    let name = format!("Mock result for \"{}\"", params.text_query.trim());
    Ok(vec![CanonicalPoi::new(name, center.lat, center.lng, MOCK_PROVIDER_ID)
        .with_description("Generated by the mock provider")])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MapBounds;
    use crate::type_map::CanonicalType;

    #[test]
    fn test_mock_uses_bounds_center() {
        let params = SearchParams::new("water").with_bounds(MapBounds {
            north: 2.0,
            south: 0.0,
            east: 4.0,
            west: 2.0,
        });
        let pois = mock_result(&params).unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!((pois[0].lat, pois[0].lng), (1.0, 3.0));
        assert_eq!(pois[0].poi_type, CanonicalType::Generic);
        assert!(pois[0].name.contains("water"));
    }

    #[test]
    fn test_mock_default_center() {
        let pois = mock_result(&SearchParams::new("anything")).unwrap();
        assert_eq!(pois[0].lat, DEFAULT_MOCK_CENTER.lat);
        assert_eq!(pois[0].provider, "mock");
    }
}
