//! API routes for the routepoi server.

pub mod commit;
pub mod error;
pub mod markers;
pub mod request_id;
pub mod search;
pub mod sessions;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// REST routes, without state or layers.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/v1/providers", get(sessions::list_providers))
        .route("/v1/sessions", post(sessions::create_session))
        .route(
            "/v1/sessions/:id",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/v1/sessions/:id/search", post(search::search))
        .route("/v1/sessions/:id/search-all", post(search::search_all_providers))
        .route(
            "/v1/sessions/:id/markers",
            post(markers::add_marker).patch(markers::edit_marker),
        )
        .route(
            "/v1/sessions/:id/markers/transition",
            post(markers::transition_marker),
        )
        .route(
            "/v1/sessions/:id/markers/clear-suggested",
            post(markers::clear_suggested),
        )
        .route("/v1/sessions/:id/commit", post(commit::commit))
}

/// Complete application: routes, health check, state and middleware.
pub fn app(state: Arc<AppState>) -> Router {
    routes()
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(middleware::from_fn(request_id::ensure_request_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
