//! Liveness plus store reachability, mounted at the root.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the comment store cannot be reached.
    pub status: &'static str,
    pub version: &'static str,
    pub store_healthy: bool,
    /// Reply depth cap clients should mirror in their reply affordance.
    pub max_depth: i32,
}

/// GET /health. Answers 503 while the store is down so load balancers can
/// drain the instance.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store_healthy = match state.service.health_check().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Comment store health check failed");
            false
        }
    };

    let (code, status) = if store_healthy {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            store_healthy,
            max_depth: state.service.policy().max_depth,
        }),
    )
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
