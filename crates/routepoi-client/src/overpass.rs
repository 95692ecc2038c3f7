//! OpenStreetMap Overpass provider.

use crate::http::{build_client, failure_detail};
use crate::provider::PoiProvider;
use async_trait::async_trait;
use reqwest::Client;
use routepoi_core::normalize::{normalize_overpass, OverpassQuery};
use routepoi_core::{
    CanonicalPoi, PoiError, ProviderContext, Result, SamplerConfig, SearchParams, OSM_PROVIDER_ID,
};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_OVERPASS_URL: &str = "https://overpass-api.de/api/interpreter";

pub struct OverpassProvider {
    client: Client,
    url: String,
    sampler: SamplerConfig,
}

impl OverpassProvider {
    pub fn new(url: impl Into<String>, sampler: SamplerConfig, timeout: Duration) -> Result<Self> {
        sampler.validate()?;
        let client = build_client(timeout).map_err(|err| {
            PoiError::provider(OSM_PROVIDER_ID, format!("cannot build HTTP client: {}", err))
        })?;
        Ok(Self {
            client,
            url: url.into(),
            sampler,
        })
    }

    pub fn sampler(&self) -> &SamplerConfig {
        &self.sampler
    }
}

#[async_trait]
impl PoiProvider for OverpassProvider {
    fn id(&self) -> &'static str {
        OSM_PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "OpenStreetMap"
    }

    /// Searches along the route, or within the map bounds when there is none.
    fn is_enabled(&self, _context: &ProviderContext) -> bool {
        true
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<CanonicalPoi>> {
        let query = OverpassQuery::from_params(params, &self.sampler)?;
        tracing::debug!("Overpass search for amenities {:?}", query.amenities());

        let response = self
            .client
            .post(&self.url)
            .header("Content-Type", "text/plain")
            .body(query.to_query_string())
            .send()
            .await
            .map_err(|err| PoiError::provider(OSM_PROVIDER_ID, err.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = failure_detail(response).await;
            tracing::warn!("Overpass search failed: {}", message);
            return Err(PoiError::provider_status(OSM_PROVIDER_ID, status, message));
        }

        let payload: Value = response.json().await.map_err(|err| {
            PoiError::provider(OSM_PROVIDER_ID, format!("invalid JSON response: {}", err))
        })?;
        let pois = normalize_overpass(&payload)?;
        tracing::info!("Overpass returned {} POIs", pois.len());
        Ok(pois)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use routepoi_core::{polyline, CanonicalType, LatLng, MapBounds};
    use serde_json::json;

    fn provider(base: &str) -> OverpassProvider {
        OverpassProvider::new(
            format!("{}/api/interpreter", base),
            SamplerConfig::default(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn fuel_params() -> SearchParams {
        let encoded = polyline::encode(&[LatLng::new(47.3, 8.5), LatLng::new(47.32, 8.53)]);
        SearchParams::new("amenity=fuel").with_polyline(encoded)
    }

    #[tokio::test]
    async fn test_zero_elements_is_no_results() {
        let app = Router::new().route(
            "/api/interpreter",
            post(|| async { Json(json!({"version": 0.6, "elements": []})) }),
        );
        let osm = provider(&spawn_server(app).await);

        let err = osm.search(&fuel_params()).await.unwrap_err();
        assert!(err.is_no_results());
    }

    #[tokio::test]
    async fn test_query_text_is_posted() {
        let app = Router::new().route(
            "/api/interpreter",
            post(|body: String| async move {
                let ok = body.starts_with("[out:json]")
                    && body.contains("node[\"amenity\"~\"^(fuel)$\"](around:500,47.300000,8.500000);")
                    && body.ends_with("out center;");
                if !ok {
                    return (StatusCode::BAD_REQUEST, Json(json!({"error": body})));
                }
                let payload = json!({
                    "elements": [{
                        "type": "node", "id": 7, "lat": 47.301, "lon": 8.502,
                        "tags": {"amenity": "fuel"}
                    }]
                });
                (StatusCode::OK, Json(payload))
            }),
        );
        let osm = provider(&spawn_server(app).await);

        let pois = osm.search(&fuel_params()).await.unwrap();
        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].name, "Fuel");
        assert_eq!(pois[0].poi_type, CanonicalType::Fuel);
    }

    #[tokio::test]
    async fn test_gateway_timeout_is_provider_error() {
        let app = Router::new().route(
            "/api/interpreter",
            post(|| async { (StatusCode::GATEWAY_TIMEOUT, "busy") }),
        );
        let osm = provider(&spawn_server(app).await);

        let params = SearchParams::new("cafe").with_bounds(MapBounds {
            north: 47.4,
            south: 47.3,
            east: 8.6,
            west: 8.5,
        });
        match osm.search(&params).await {
            Err(PoiError::Provider { status_code, .. }) => assert_eq!(status_code, Some(504)),
            other => panic!("expected provider error, got {:?}", other),
        }
    }
}
