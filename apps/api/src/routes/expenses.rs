//! Operating expenses (admin).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use duka_core::validation::{parse_date, validate_name, validate_positive_amount};
use duka_core::{Expense, Money};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AdminUser;
use crate::error::{ApiError, ApiResult};
use crate::reporting::ReportQuery;
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(fetch).put(update).delete(remove))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseRequest {
    /// Omitted for business-wide expenses.
    #[serde(default)]
    pub shop_id: Option<String>,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Money,
    /// YYYY-MM-DD; defaults to today.
    #[serde(default)]
    pub expense_date: Option<String>,
}

/// A request after validation, ready to be written.
struct ExpenseFields {
    shop_id: Option<String>,
    category: String,
    description: Option<String>,
    amount: Money,
    expense_date: chrono::NaiveDate,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ExpenseRequest {
    async fn validate(self, state: &SharedState) -> ApiResult<ExpenseFields> {
        validate_name("category", &self.category)?;
        validate_positive_amount("amount", self.amount)?;

        let expense_date = match self.expense_date.as_deref().map(str::trim) {
            None | Some("") => Utc::now().date_naive(),
            Some(date) => parse_date("expenseDate", date)?,
        };

        let shop_id = trimmed(self.shop_id);
        if let Some(shop_id) = &shop_id {
            if state.db.shops().get_by_id(shop_id).await?.is_none() {
                return Err(ApiError::not_found("Shop", shop_id));
            }
        }

        Ok(ExpenseFields {
            shop_id,
            category: self.category.trim().to_string(),
            description: trimmed(self.description),
            amount: self.amount,
            expense_date,
        })
    }
}

async fn list(
    State(state): State<SharedState>,
    _: AdminUser,
    Query(query): Query<ReportQuery>,
) -> ApiResult<Json<Vec<Expense>>> {
    let filter = query.filter(Utc::now().date_naive())?;
    Ok(Json(state.db.expenses().list(&filter).await?))
}

async fn fetch(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Expense>> {
    let expense = state
        .db
        .expenses()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense", &id))?;
    Ok(Json(expense))
}

async fn create(
    State(state): State<SharedState>,
    _: AdminUser,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<(StatusCode, Json<Expense>)> {
    let fields = req.validate(&state).await?;

    let expense = Expense {
        id: Uuid::new_v4().to_string(),
        shop_id: fields.shop_id,
        category: fields.category,
        description: fields.description,
        amount: fields.amount,
        expense_date: fields.expense_date,
        created_at: Utc::now(),
    };
    state.db.expenses().insert(&expense).await?;
    state.dashboard.request_refresh();

    info!(expense_id = %expense.id, category = %expense.category, amount = %expense.amount, "Expense recorded");
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn update(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
    Json(req): Json<ExpenseRequest>,
) -> ApiResult<Json<Expense>> {
    let fields = req.validate(&state).await?;

    let existing = state
        .db
        .expenses()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("Expense", &id))?;

    let expense = Expense {
        shop_id: fields.shop_id,
        category: fields.category,
        description: fields.description,
        amount: fields.amount,
        expense_date: fields.expense_date,
        ..existing
    };
    state.db.expenses().update(&expense).await?;
    state.dashboard.request_refresh();

    Ok(Json(expense))
}

async fn remove(
    State(state): State<SharedState>,
    _: AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.db.expenses().delete(&id).await?;
    state.dashboard.request_refresh();

    info!(expense_id = %id, "Expense deleted");
    Ok(StatusCode::NO_CONTENT)
}
