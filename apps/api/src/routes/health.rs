//! Liveness check for load balancers and monitoring.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::state::SharedState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub server_time: DateTime<Utc>,
}

/// 200 when the database answers, 503 otherwise.
pub async fn health(State(state): State<SharedState>) -> (StatusCode, Json<HealthResponse>) {
    let db_ok = state.db.health_check().await;
    if !db_ok {
        warn!("Health check failed: database unreachable");
    }

    let (status, code) = if db_ok {
        ("ok", StatusCode::OK)
    } else {
        ("degraded", StatusCode::SERVICE_UNAVAILABLE)
    };

    let body = HealthResponse {
        status,
        database: if db_ok { "connected" } else { "unreachable" },
        version: env!("CARGO_PKG_VERSION"),
        server_time: Utc::now(),
    };
    (code, Json(body))
}
