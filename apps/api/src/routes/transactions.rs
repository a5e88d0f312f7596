//! Sales. Cashiers ring up sales for their own shop; admins browse all of
//! them with the report filter.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use duka_core::cart::{Cart, CheckoutRequest, SaleDraft};
use duka_core::Transaction;
use tracing::info;

use crate::auth::{AuthUser, CashierUser};
use crate::error::{ApiError, ApiResult};
use crate::reporting::ReportQuery;
use crate::state::SharedState;

const DEFAULT_PAGE_SIZE: usize = 50;
const MAX_PAGE_SIZE: usize = 500;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch))
}

/// Newest first, one page at a time. A cashier only sees their own sales.
async fn list(
    State(state): State<SharedState>,
    user: AuthUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let mut filter = query.filter(Utc::now().date_naive())?;
    if !user.is_admin() {
        filter = filter.with_cashier(user.id.clone());
    }

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let page = state
        .db
        .transactions()
        .page(&filter, limit as i64, offset)
        .await?;
    Ok(Json(page))
}

async fn fetch(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Transaction>> {
    let transaction = state
        .db
        .transactions()
        .get_by_id(&id)
        .await?
        .filter(|t| user.is_admin() || t.cashier_id == user.id)
        .ok_or_else(|| ApiError::not_found("Transaction", &id))?;
    Ok(Json(transaction))
}

/// Prices the request against the shop's catalog, checks the tender, and
/// stores sale, stock movement and credit in one database transaction.
async fn create(
    State(state): State<SharedState>,
    cashier: CashierUser,
    Json(req): Json<CheckoutRequest>,
) -> ApiResult<(StatusCode, Json<SaleDraft>)> {
    let account = state
        .db
        .cashiers()
        .get_by_id(&cashier.id)
        .await?
        .filter(|c| c.is_active && c.shop_id == cashier.shop_id)
        .ok_or_else(|| ApiError::forbidden("Cashier account is not active for this shop"))?;

    let catalog = state.db.products().list(Some(&account.shop_id)).await?;
    let cart = Cart::from_request(&account.shop_id, &catalog, &req.items)?;
    let draft = cart.checkout(&account.id, &req.tender, Utc::now())?;

    state.db.transactions().record_sale(&draft).await?;
    state.dashboard.request_refresh();

    info!(
        transaction_id = %draft.transaction.id,
        cashier_id = %account.id,
        total = %draft.transaction.total_amount,
        items = draft.transaction.items.len(),
        "Sale completed"
    );
    Ok((StatusCode::CREATED, Json(draft)))
}
