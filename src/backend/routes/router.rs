/**
 * Router Configuration
 *
 * Combines the WebSocket route and the API routes into one Axum router with
 * a request trace layer.
 *
 * # Routes
 *
 * - `GET /ws` - Authenticated WebSocket upgrade
 * - `GET /api/version` - Build metadata
 * - `GET /health` - Liveness
 *
 * Anything else gets a JSON 404.
 */

use axum::{http::StatusCode, routing::get, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::realtime::ws_upgrade;
#[cfg(feature = "ssr")]
use crate::backend::routes::api_routes::configure_api_routes;
#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
#[cfg(feature = "ssr")]
pub fn create_router(app_state: AppState) -> Router<()> {
    let router = Router::new().route("/ws", get(ws_upgrade));

    let router = configure_api_routes(router);

    let router = router.fallback(|| async { BackendError::handler(StatusCode::NOT_FOUND, "Not Found") });

    router
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(app_state)
}
