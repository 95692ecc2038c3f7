//! Google Places "search text along route" provider.

use crate::http::{build_client, failure_detail};
use crate::provider::PoiProvider;
use async_trait::async_trait;
use reqwest::Client;
use routepoi_core::normalize::{google_request_body, normalize_google, GOOGLE_FIELD_MASK};
use routepoi_core::{
    CanonicalPoi, PoiError, ProviderContext, Result, SearchParams, GOOGLE_PROVIDER_ID,
};
use serde_json::Value;
use std::time::Duration;

pub const DEFAULT_GOOGLE_PLACES_URL: &str = "https://places.googleapis.com/v1/places:searchText";

pub struct GooglePlacesProvider {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl GooglePlacesProvider {
    /// `endpoint` is the full `places:searchText` URL.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = build_client(timeout).map_err(|err| {
            PoiError::provider(GOOGLE_PROVIDER_ID, format!("cannot build HTTP client: {}", err))
        })?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty()),
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[async_trait]
impl PoiProvider for GooglePlacesProvider {
    fn id(&self) -> &'static str {
        GOOGLE_PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        "Google Places"
    }

    fn is_enabled(&self, context: &ProviderContext) -> bool {
        context.has_route && context.google_api_key_configured && self.has_api_key()
    }

    async fn search(&self, params: &SearchParams) -> Result<Vec<CanonicalPoi>> {
        let body = google_request_body(params)?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| PoiError::provider(GOOGLE_PROVIDER_ID, "API key is not configured"))?;

        tracing::debug!("Google Places search for '{}'", params.text_query.trim());
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Goog-Api-Key", api_key)
            .header("X-Goog-FieldMask", GOOGLE_FIELD_MASK)
            .json(&body)
            .send()
            .await
            .map_err(|err| PoiError::provider(GOOGLE_PROVIDER_ID, err.to_string()))?;

        if !response.status().is_success() {
            let (status, message) = failure_detail(response).await;
            tracing::warn!("Google Places search failed: {}", message);
            return Err(PoiError::provider_status(GOOGLE_PROVIDER_ID, status, message));
        }

        let payload: Value = response.json().await.map_err(|err| {
            PoiError::provider(GOOGLE_PROVIDER_ID, format!("invalid JSON response: {}", err))
        })?;
        let pois = normalize_google(&payload)?;
        tracing::info!("Google Places returned {} POIs", pois.len());
        Ok(pois)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use routepoi_core::{polyline, CanonicalType, LatLng};
    use serde_json::json;

    fn route_polyline() -> String {
        let coords: Vec<LatLng> = (0..20)
            .map(|i| LatLng::new(37.77 + i as f64 * 0.002, -122.42 + i as f64 * 0.001))
            .collect();
        polyline::encode(&coords)
    }

    async fn places(headers: HeaderMap, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
        if headers.get("X-Goog-Api-Key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::FORBIDDEN, Json(json!({"error": "bad key"})));
        }
        if body["searchAlongRouteParameters"]["polyline"]["encodedPolyline"]
            .as_str()
            .is_none()
        {
            return (StatusCode::BAD_REQUEST, Json(json!({"error": "no route"})));
        }
        let payload = json!({
            "places": [
                {
                    "id": "p1",
                    "displayName": {"text": "Ritual Coffee"},
                    "location": {"latitude": 37.776, "longitude": -122.417},
                    "primaryType": "coffee_shop"
                },
                {
                    "id": "p2",
                    "displayName": {"text": "Mystery Spot"},
                    "location": {"latitude": 37.781, "longitude": -122.412},
                    "primaryType": "unknown_xyz"
                },
                {
                    "id": "p3",
                    "displayName": {"text": "Nowhere"}
                }
            ]
        });
        (StatusCode::OK, Json(payload))
    }

    fn provider(base: &str, key: Option<&str>) -> GooglePlacesProvider {
        GooglePlacesProvider::new(
            format!("{}/v1/places:searchText", base),
            key.map(str::to_string),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_coffee_along_route() {
        let base = spawn_server(Router::new().route("/v1/places:searchText", post(places))).await;
        let google = provider(&base, Some("test-key"));

        let params = SearchParams::new("coffee").with_polyline(route_polyline());
        let pois = google.search(&params).await.unwrap();

        assert_eq!(pois.len(), 2);
        assert!(pois.iter().all(|p| p.lat.is_finite() && p.lng.is_finite()));
        assert_eq!(pois[0].poi_type, CanonicalType::Coffee);
        assert_eq!(pois[1].poi_type, CanonicalType::Generic);
        assert!(pois.iter().all(|p| p.provider == "google"));
    }

    #[tokio::test]
    async fn test_http_failure_is_provider_error() {
        let base = spawn_server(Router::new().route("/v1/places:searchText", post(places))).await;
        let google = provider(&base, Some("wrong-key"));

        let params = SearchParams::new("coffee").with_polyline(route_polyline());
        match google.search(&params).await {
            Err(PoiError::Provider { status_code, .. }) => assert_eq!(status_code, Some(403)),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_route_is_rejected_before_request() {
        // Nothing listens here; an outbound call would fail as a provider error.
        let google = provider("http://127.0.0.1:9", Some("test-key"));
        let err = google.search(&SearchParams::new("coffee")).await.unwrap_err();
        assert!(matches!(err, PoiError::InvalidInput { .. }));
    }

    #[test]
    fn test_enabled_needs_route_and_key() {
        let google = provider("http://localhost", Some("k"));
        let ready = ProviderContext {
            has_route: true,
            google_api_key_configured: true,
        };
        assert!(google.is_enabled(&ready));
        assert!(!google.is_enabled(&ProviderContext {
            has_route: false,
            ..ready
        }));
        assert!(!provider("http://localhost", Some("  ")).is_enabled(&ready));
    }
}
