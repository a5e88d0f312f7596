//! Shop management (admin).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use duka_core::validation::validate_name;
use duka_core::Shop;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
pub struct ShopRequest {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
}

impl ShopRequest {
    fn validate(&self) -> ApiResult<()> {
        validate_name("name", &self.name)?;
        Ok(())
    }

    fn location(&self) -> Option<String> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
    }
}

async fn list(State(state): State<SharedState>, _: AdminUser) -> ApiResult<Json<Vec<Shop>>> {
    Ok(Json(state.db.shops().list().await?))
}

async fn fetch(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Shop>> {
    let shop = state
        .db
        .shops()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Shop", &id))?;
    Ok(Json(shop))
}

async fn create(
    State(state): State<SharedState>,
    _: AdminUser,
    Json(req): Json<ShopRequest>,
) -> ApiResult<(StatusCode, Json<Shop>)> {
    req.validate()?;

    let now = Utc::now();
    let shop = Shop {
        id: Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        location: req.location(),
        created_at: now,
        updated_at: now,
    };
    state.db.shops().insert(&shop).await?;

    info!(shop_id = %shop.id, name = %shop.name, "Shop created");
    Ok((StatusCode::CREATED, Json(shop)))
}

async fn update(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<ShopRequest>,
) -> ApiResult<Json<Shop>> {
    req.validate()?;

    let existing = state
        .db
        .shops()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Shop", &id))?;

    let shop = Shop {
        name: req.name.trim().to_string(),
        location: req.location(),
        ..existing
    };
    Ok(Json(state.db.shops().update(&shop).await?))
}

async fn remove(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.shops().delete(&id).await?;
    info!(shop_id = %id, "Shop deleted");
    Ok(StatusCode::NO_CONTENT)
}
