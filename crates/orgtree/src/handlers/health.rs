//! Health check endpoints for Kubernetes-style probes.
//!
//! - `/livez` - Basic liveness probe (immediate 200, no checks)
//! - `/healthz` - Cache round-trip probe

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::state::AppState;

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting connections.
#[axum::debug_handler]
pub async fn livez() -> StatusCode {
    StatusCode::OK
}

/// GET /healthz - Writes, reads back and deletes a probe entry in the cache.
///
/// Returns 503 when the cache store cannot complete the round trip.
#[axum::debug_handler]
pub async fn healthz(State(state): State<AppState>) -> Response {
    match state.service.probe_cache().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "cache": "ok" }))).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Cache health probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({
                    "cache": "unavailable",
                    "error": err.to_string()
                })),
            )
                .into_response()
        }
    }
}
