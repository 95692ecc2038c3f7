//! Shared reqwest plumbing.

use reqwest::{Client, RequestBuilder, Response};
use std::time::Duration;

const MAX_ERROR_BODY_CHARS: usize = 200;

/// Client with a fixed per-request timeout.
pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder().timeout(timeout).build()
}

pub(crate) fn apply_request_id(request: RequestBuilder, request_id: Option<&str>) -> RequestBuilder {
    match request_id {
        Some(value) if !value.is_empty() => request.header("X-Request-ID", value),
        _ => request,
    }
}

/// Status code and a short description of a non-success response.
pub(crate) async fn failure_detail(response: Response) -> (u16, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let excerpt: String = body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect();
    let message = if excerpt.is_empty() {
        status.to_string()
    } else {
        format!("{} {}", status, excerpt)
    };
    (status.as_u16(), message)
}
