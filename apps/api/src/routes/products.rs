//! Catalog. Admins manage every shop's products; cashiers read their own
//! shop's catalog.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use duka_core::numeric::deserialize_count;
use duka_core::validation::{validate_name, validate_pricing, validate_stock};
use duka_core::{Money, Product, ValidationError};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/low-stock", get(low_stock))
        .route("/{id}", get(fetch).put(update).delete(remove))
        .route("/{id}/stock", post(adjust_stock))
}

#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub shop_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    pub shop_id: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub buying_price: Money,
    #[serde(default)]
    pub min_selling_price: Money,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub current_stock: i64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub min_stock_level: i64,
}

impl ProductRequest {
    fn validate(&self) -> ApiResult<()> {
        validate_name("name", &self.name)?;
        validate_pricing(self.buying_price, self.min_selling_price)?;
        validate_stock("currentStock", self.current_stock)?;
        validate_stock("minStockLevel", self.min_stock_level)?;
        Ok(())
    }

    fn category(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    }
}

/// Signed change to the stock count (restock or write-off).
#[derive(Debug, Deserialize)]
pub struct StockAdjustment {
    pub delta: i64,
}

/// Shop a caller may read: a cashier is pinned to their own shop.
fn scoped_shop(user: &AuthUser, requested: Option<String>) -> Option<String> {
    if user.is_admin() {
        requested.filter(|s| !s.trim().is_empty())
    } else {
        user.shop_id.clone()
    }
}

async fn list(
    State(state): State<SharedState>,
    user: AuthUser,
    Query(query): Query<ShopQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let shop_id = scoped_shop(&user, query.shop_id);
    Ok(Json(state.db.products().list(shop_id.as_deref()).await?))
}

async fn low_stock(
    State(state): State<SharedState>,
    user: AuthUser,
    Query(query): Query<ShopQuery>,
) -> ApiResult<Json<Vec<Product>>> {
    let shop_id = scoped_shop(&user, query.shop_id);
    Ok(Json(state.db.products().low_stock(shop_id.as_deref()).await?))
}

async fn fetch(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let product = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .filter(|p| user.is_admin() || user.shop_id.as_deref() == Some(p.shop_id.as_str()))
        .ok_or_else(|| ApiError::not_found("Product", &id))?;
    Ok(Json(product))
}

async fn create(
    State(state): State<SharedState>,
    _: AdminUser,
    Json(req): Json<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    req.validate()?;

    let now = Utc::now();
    let product = Product {
        id: Uuid::new_v4().to_string(),
        shop_id: req.shop_id.clone(),
        name: req.name.trim().to_string(),
        category: req.category(),
        buying_price: req.buying_price,
        min_selling_price: req.min_selling_price,
        current_stock: req.current_stock,
        min_stock_level: req.min_stock_level,
        created_at: now,
        updated_at: now,
    };
    state.db.products().insert(&product).await?;

    info!(product_id = %product.id, shop_id = %product.shop_id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

async fn update(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<ProductRequest>,
) -> ApiResult<Json<Product>> {
    req.validate()?;

    let existing = state
        .db
        .products()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &id))?;

    let product = Product {
        shop_id: req.shop_id.clone(),
        name: req.name.trim().to_string(),
        category: req.category(),
        buying_price: req.buying_price,
        min_selling_price: req.min_selling_price,
        current_stock: req.current_stock,
        min_stock_level: req.min_stock_level,
        ..existing
    };
    Ok(Json(state.db.products().update(&product).await?))
}

async fn adjust_stock(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<StockAdjustment>,
) -> ApiResult<Json<Product>> {
    if req.delta == 0 {
        return Err(ValidationError::InvalidFormat {
            field: "delta".to_string(),
            reason: "must not be zero".to_string(),
        }
        .into());
    }

    let product = state.db.products().adjust_stock(&id, req.delta).await?;
    info!(product_id = %id, delta = req.delta, stock = product.current_stock, "Stock adjusted");
    Ok(Json(product))
}

async fn remove(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.products().delete(&id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}
