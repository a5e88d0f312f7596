//! Report endpoints (admin). Every report accepts the [`ReportQuery`]
//! parameters: `period`, `start`, `end`, `shop_id`, `cashier_id`.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use duka_core::analytics::{
    cashier_performance, daily_trend, daily_trend_filled, expense_breakdown, label_rows,
    payment_breakdown, product_performance, shop_performance, CreditSummary, ExpenseCategoryRow,
    FinancialSummary, InventorySummary, PaymentBreakdownRow, PerformanceRow, ProductRow,
    TrendPoint, UnifiedReport, DEFAULT_TOP_PRODUCTS,
};
use duka_core::RecordFilter;

use crate::auth::AdminUser;
use crate::error::ApiResult;
use crate::refresh::{refresh_dashboard, DashboardSnapshot};
use crate::reporting::{unified_report, ReportData, ReportQuery};
use crate::state::SharedState;

/// Longest top-products list a caller may ask for.
const MAX_TOP_PRODUCTS: usize = 100;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/refresh", post(refresh))
        .route("/summary", get(summary))
        .route("/trend", get(trend))
        .route("/payments", get(payments))
        .route("/shops", get(shops))
        .route("/cashiers", get(cashiers))
        .route("/credits", get(credits))
        .route("/inventory", get(inventory))
        .route("/products", get(products))
        .route("/expenses", get(expenses))
        .route("/unified", get(unified))
}

async fn load(state: &SharedState, query: &ReportQuery) -> ApiResult<(RecordFilter, ReportData)> {
    let filter = query.filter(Utc::now().date_naive())?;
    let data = ReportData::load(&state.db, &filter).await?;
    Ok((filter, data))
}

/// The cached snapshot; computed on the spot before the first refresh.
async fn dashboard(
    State(state): State<SharedState>,
    _: AdminUser,
) -> ApiResult<Json<DashboardSnapshot>> {
    match state.dashboard.latest().await {
        Some(snapshot) => Ok(Json(snapshot)),
        None => Ok(Json(refresh_dashboard(&state).await?)),
    }
}

async fn refresh(
    State(state): State<SharedState>,
    _: AdminUser,
) -> ApiResult<Json<DashboardSnapshot>> {
    Ok(Json(refresh_dashboard(&state).await?))
}

async fn summary(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<FinancialSummary>> {
    let (_, data) = load(&state, &query).await?;
    Ok(Json(FinancialSummary::compute(
        &data.transactions,
        &data.credits,
        &data.expenses,
    )))
}

/// One point per day. A bounded range includes the days without sales.
async fn trend(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<TrendPoint>>> {
    let (filter, data) = load(&state, &query).await?;
    let points = match filter.range {
        Some(range) => daily_trend_filled(&data.transactions, range),
        None => daily_trend(&data.transactions),
    };
    Ok(Json(points))
}

async fn payments(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<PaymentBreakdownRow>>> {
    let (_, data) = load(&state, &query).await?;
    Ok(Json(payment_breakdown(&data.transactions)))
}

async fn shops(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<PerformanceRow>>> {
    let (_, data) = load(&state, &query).await?;
    let mut rows = shop_performance(&data.transactions);
    label_rows(&mut rows, &state.db.shops().names().await?);
    Ok(Json(rows))
}

async fn cashiers(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<PerformanceRow>>> {
    let (_, data) = load(&state, &query).await?;
    let mut rows = cashier_performance(&data.transactions);
    label_rows(&mut rows, &state.db.cashiers().names().await?);
    Ok(Json(rows))
}

async fn credits(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<CreditSummary>> {
    let filter = query.filter(Utc::now().date_naive())?;
    let credits = state.db.credits().list(&filter, None).await?;
    Ok(Json(CreditSummary::compute(&credits, Utc::now().date_naive())))
}

/// Current stock; only `shop_id` applies.
async fn inventory(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<InventorySummary>> {
    let filter = query.filter(Utc::now().date_naive())?;
    let products = state.db.products().list(filter.shop_id.as_deref()).await?;
    Ok(Json(InventorySummary::compute(&products)))
}

/// Best sellers by revenue; `limit` defaults to 10.
async fn products(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<ProductRow>>> {
    let filter = query.filter(Utc::now().date_naive())?;
    let transactions = state.db.transactions().list(&filter).await?;
    let limit = query
        .limit
        .unwrap_or(DEFAULT_TOP_PRODUCTS)
        .clamp(1, MAX_TOP_PRODUCTS);
    Ok(Json(product_performance(&transactions, limit)))
}

async fn expenses(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<ExpenseCategoryRow>>> {
    let filter = query.filter(Utc::now().date_naive())?;
    let expenses = state.db.expenses().list(&filter).await?;
    Ok(Json(expense_breakdown(&expenses)))
}

async fn unified(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<UnifiedReport>> {
    let filter = query.filter(Utc::now().date_naive())?;
    Ok(Json(unified_report(&state.db, &filter).await?))
}
