/**
 * API Route Handlers
 *
 * Operational endpoints next to the WebSocket route.
 *
 * # Routes
 *
 * - `GET /api/version` - Build metadata
 * - `GET /health` - Liveness plus live connection count
 */

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

#[cfg(feature = "ssr")]
use crate::backend::server::state::AppState;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VersionInfo {
    pub version: String,
    pub commit_hash: String,
    pub build_date: String,
}

impl VersionInfo {
    /// Metadata baked in at compile time
    pub fn current() -> Self {
        let build_date = env!("TASK_SOCIAL_BUILD_EPOCH")
            .parse::<i64>()
            .ok()
            .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            .map(|at| at.to_rfc3339())
            .unwrap_or_else(|| "unknown".to_string());

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit_hash: env!("TASK_SOCIAL_COMMIT_HASH").to_string(),
            build_date,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub connections: usize,
    pub store: &'static str,
}

/// GET /api/version
pub async fn get_version() -> Json<VersionInfo> {
    Json(VersionInfo::current())
}

/// GET /health
#[cfg(feature = "ssr")]
pub async fn get_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        connections: state.registry.len(),
        store: state.store.backend_name(),
    })
}

/// Configure API routes
#[cfg(feature = "ssr")]
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .route("/api/version", get(get_version))
        .route("/health", get(get_health))
}
