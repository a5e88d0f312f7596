//! Cashier accounts (admin).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use duka_core::validation::{validate_email, validate_name, validate_password, validate_phone};
use duka_core::Cashier;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{hash_password, AdminUser};
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/password", put(set_password))
}

#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub shop_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCashierRequest {
    pub shop_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCashierRequest {
    pub shop_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
}

fn active() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    pub password: String,
}

fn validate_profile(name: &str, email: &str, phone: Option<&str>) -> ApiResult<()> {
    validate_name("name", name)?;
    validate_email(email)?;
    if let Some(phone) = phone {
        validate_phone(phone)?;
    }
    Ok(())
}

fn clean_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

async fn ensure_shop(state: &SharedState, shop_id: &str) -> ApiResult<()> {
    state
        .db
        .shops()
        .get_by_id(shop_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| ApiError::not_found("Shop", shop_id))
}

async fn list(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ShopQuery>,
) -> ApiResult<Json<Vec<Cashier>>> {
    let shop_id = query.shop_id.as_deref().filter(|s| !s.trim().is_empty());
    Ok(Json(state.db.cashiers().list(shop_id).await?))
}

async fn fetch(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Cashier>> {
    let cashier = state
        .db
        .cashiers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cashier", &id))?;
    Ok(Json(cashier))
}

async fn create(
    State(state): State<SharedState>,
    _: AdminUser,
    Json(req): Json<CreateCashierRequest>,
) -> ApiResult<(StatusCode, Json<Cashier>)> {
    let phone = clean_phone(req.phone);
    validate_profile(&req.name, &req.email, phone.as_deref())?;
    validate_password(&req.password)?;
    ensure_shop(&state, &req.shop_id).await?;

    let now = Utc::now();
    let cashier = Cashier {
        id: Uuid::new_v4().to_string(),
        shop_id: req.shop_id,
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        phone,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let hash = hash_password(&req.password)?;
    state.db.cashiers().insert(&cashier, &hash).await?;

    info!(cashier_id = %cashier.id, shop_id = %cashier.shop_id, "Cashier created");
    Ok((StatusCode::CREATED, Json(cashier)))
}

async fn update(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateCashierRequest>,
) -> ApiResult<Json<Cashier>> {
    let phone = clean_phone(req.phone);
    validate_profile(&req.name, &req.email, phone.as_deref())?;
    ensure_shop(&state, &req.shop_id).await?;

    let existing = state
        .db
        .cashiers()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Cashier", &id))?;

    let cashier = Cashier {
        shop_id: req.shop_id,
        name: req.name.trim().to_string(),
        email: req.email.trim().to_lowercase(),
        phone,
        is_active: req.is_active,
        ..existing
    };
    let updated = state.db.cashiers().update(&cashier).await?;

    if !updated.is_active {
        info!(cashier_id = %id, "Cashier deactivated");
    }
    Ok(Json(updated))
}

async fn set_password(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<PasswordRequest>,
) -> ApiResult<StatusCode> {
    validate_password(&req.password)?;
    let hash = hash_password(&req.password)?;
    state.db.cashiers().set_password(&id, &hash).await?;

    info!(cashier_id = %id, "Cashier password reset");
    Ok(StatusCode::NO_CONTENT)
}

async fn remove(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.cashiers().delete(&id).await?;
    info!(cashier_id = %id, "Cashier deleted");
    Ok(StatusCode::NO_CONTENT)
}
