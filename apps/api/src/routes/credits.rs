//! Credit sales and their repayments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use duka_core::validation::validate_positive_amount;
use duka_core::{Credit, CreditPayment, CreditStatus, Money, PaymentMethod, ValidationError};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AdminUser, AuthUser};
use crate::error::{ApiError, ApiResult};
use crate::reporting::ReportQuery;
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list))
        .route("/{id}", get(fetch))
        .route("/{id}/payments", post(pay))
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: Option<String>,
}

impl StatusQuery {
    fn status(&self) -> ApiResult<Option<CreditStatus>> {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => Ok(Some(s.parse::<CreditStatus>()?)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Money,
    #[serde(default = "cash")]
    pub payment_method: PaymentMethod,
}

fn cash() -> PaymentMethod {
    PaymentMethod::Cash
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditDetail {
    pub credit: Credit,
    pub payments: Vec<CreditPayment>,
}

async fn list(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
    Query(status): Query<StatusQuery>,
) -> ApiResult<Json<Vec<Credit>>> {
    let filter = query.filter(Utc::now().date_naive())?;
    let credits = state.db.credits().list(&filter, status.status()?).await?;
    Ok(Json(credits))
}

async fn fetch(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CreditDetail>> {
    let credit = state
        .db
        .credits()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Credit", &id))?;
    let payments = state.db.credits().payments(&id).await?;
    Ok(Json(CreditDetail { credit, payments }))
}

/// Admins settle any credit; a cashier only credits of their own shop.
async fn pay(
    State(state): State<SharedState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(req): Json<PaymentRequest>,
) -> ApiResult<(StatusCode, Json<CreditDetail>)> {
    validate_positive_amount("amount", req.amount)?;
    if !req.payment_method.is_immediate() {
        return Err(ValidationError::NotAllowed {
            field: "paymentMethod".to_string(),
            allowed: PaymentMethod::ALL
                .iter()
                .filter(|m| m.is_immediate())
                .map(|m| m.to_string())
                .collect(),
        }
        .into());
    }

    let existing = state
        .db
        .credits()
        .get_by_id(&id)
        .await?
        .filter(|c| user.is_admin() || user.shop_id.as_deref() == Some(c.shop_id.as_str()))
        .ok_or_else(|| ApiError::not_found("Credit", &id))?;

    let cashier_id = (!user.is_admin()).then_some(user.id.as_str());
    let (credit, _) = state
        .db
        .credits()
        .record_payment(&existing.id, req.amount, req.payment_method, cashier_id)
        .await?;
    let payments = state.db.credits().payments(&id).await?;
    state.dashboard.request_refresh();

    info!(
        credit_id = %id,
        amount = %req.amount,
        balance = %credit.balance_due,
        status = %credit.status,
        "Credit payment recorded"
    );
    Ok((StatusCode::CREATED, Json(CreditDetail { credit, payments })))
}
