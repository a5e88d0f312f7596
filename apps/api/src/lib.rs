//! # Duka API
//!
//! REST server for the Duka POS till and back office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Duka API Server                                │
//! │                                                                         │
//! │  till / admin UI ──► axum (8080) ──► routes ──► duka-db ──► SQLite     │
//! │                          │              │                               │
//! │                   TraceLayer, CORS      └──► duka-core analytics        │
//! │                                                                         │
//! │  DashboardRefresher ── interval / on demand ──► DashboardCache          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]: `duka.toml` plus `DUKA_*` environment overrides.

pub mod auth;
pub mod config;
pub mod error;
pub mod refresh;
pub mod reporting;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::{AppState, SharedState};

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// The full application: routes, state, request tracing and CORS.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    routes::api_routes()
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Any origin when none are configured.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
