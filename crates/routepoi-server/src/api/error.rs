//! API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use routepoi_core::{PoiError, WriteBackStage};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Poi(#[from] PoiError),

    #[error("{0}")]
    NotFound(String),

    /// A search or commit is already in flight on the same slot.
    #[error("{0}")]
    Conflict(String),
}

impl ApiError {
    pub fn session_not_found(id: &str) -> Self {
        ApiError::NotFound(format!("session '{}' not found", id))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Poi(err) => match err {
                PoiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
                PoiError::NoResults { .. } => StatusCode::NOT_FOUND,
                PoiError::WriteBack {
                    stage: WriteBackStage::Fetch,
                    status_code: Some(404),
                    ..
                } => StatusCode::NOT_FOUND,
                PoiError::Provider { .. } | PoiError::WriteBack { .. } => StatusCode::BAD_GATEWAY,
            },
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "not_found",
            ApiError::Conflict(_) => "conflict",
            ApiError::Poi(PoiError::WriteBack {
                stage: WriteBackStage::Fetch,
                status_code: Some(404),
                ..
            }) => "not_found",
            ApiError::Poi(err) => err.kind(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!("Request failed: {}", self);
        }
        let body = json!({ "error": self.to_string(), "kind": self.kind() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(PoiError::invalid("bad")).status(),
            StatusCode::BAD_REQUEST
        );
        let provider = ApiError::from(PoiError::provider_status("osm", 504, "timeout"));
        assert_eq!(provider.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(provider.kind(), "provider");
        assert!(provider.to_string().contains("osm"));

        let missing_route = ApiError::from(PoiError::write_back_status(
            WriteBackStage::Fetch,
            404,
            "gone",
        ));
        assert_eq!(missing_route.status(), StatusCode::NOT_FOUND);
        assert_eq!(missing_route.kind(), "not_found");

        let write = ApiError::from(PoiError::write_back(WriteBackStage::Write, "refused"));
        assert_eq!(write.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(write.kind(), "write_back");
    }
}
