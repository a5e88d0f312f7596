//! Login, token refresh and identity.

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use duka_core::validation::validate_email;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{verify_password, AuthUser, Role, TokenPair};
use crate::error::{ApiError, ApiResult};
use crate::state::SharedState;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/admin/login", post(admin_login))
        .route("/cashier/login", post(cashier_login))
        .route("/refresh", post(refresh))
        .route("/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse<T> {
    pub user: T,
    #[serde(flatten)]
    pub tokens: TokenPair,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: String,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_id: Option<String>,
}

fn invalid_credentials() -> ApiError {
    ApiError::unauthorized("Invalid email or password")
}

async fn admin_login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse<duka_core::Admin>>> {
    validate_email(&req.email)?;

    let Some((admin, hash)) = state.db.admins().find_credentials(&req.email).await? else {
        warn!(email = %req.email, "Admin login for unknown email");
        return Err(invalid_credentials());
    };
    if !verify_password(&req.password, &hash) {
        warn!(admin_id = %admin.id, "Admin login with wrong password");
        return Err(invalid_credentials());
    }

    let tokens = state.jwt.issue(&admin.id, Role::Admin, None)?;
    info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(LoginResponse { user: admin, tokens }))
}

async fn cashier_login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse<duka_core::Cashier>>> {
    validate_email(&req.email)?;

    let Some((cashier, hash)) = state.db.cashiers().find_credentials(&req.email).await? else {
        warn!(email = %req.email, "Cashier login for unknown email");
        return Err(invalid_credentials());
    };
    if !verify_password(&req.password, &hash) {
        warn!(cashier_id = %cashier.id, "Cashier login with wrong password");
        return Err(invalid_credentials());
    }
    if !cashier.is_active {
        return Err(ApiError::forbidden("Cashier account is deactivated"));
    }

    let tokens = state
        .jwt
        .issue(&cashier.id, Role::Cashier, Some(&cashier.shop_id))?;
    info!(cashier_id = %cashier.id, shop_id = %cashier.shop_id, "Cashier logged in");

    Ok(Json(LoginResponse {
        user: cashier,
        tokens,
    }))
}

/// Issues a fresh pair. Cashiers are re-checked so a deactivated or moved
/// account cannot keep refreshing.
async fn refresh(
    State(state): State<SharedState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<TokenPair>> {
    let claims = state.jwt.validate_refresh_token(&req.refresh_token)?;

    let tokens = match claims.role {
        Role::Admin => {
            state
                .db
                .admins()
                .get_by_id(&claims.sub)
                .await?
                .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;
            state.jwt.issue(&claims.sub, Role::Admin, None)?
        }
        Role::Cashier => {
            let cashier = state
                .db
                .cashiers()
                .get_by_id(&claims.sub)
                .await?
                .filter(|c| c.is_active)
                .ok_or_else(|| ApiError::unauthorized("Account is no longer active"))?;
            state
                .jwt
                .issue(&cashier.id, Role::Cashier, Some(&cashier.shop_id))?
        }
    };

    Ok(Json(tokens))
}

async fn me(State(state): State<SharedState>, user: AuthUser) -> ApiResult<Json<Identity>> {
    let identity = match user.role {
        Role::Admin => {
            let admin = state
                .db
                .admins()
                .get_by_id(&user.id)
                .await?
                .ok_or_else(|| ApiError::not_found("Admin", &user.id))?;
            Identity {
                id: admin.id,
                role: Role::Admin,
                name: admin.name,
                email: admin.email,
                shop_id: None,
            }
        }
        Role::Cashier => {
            let cashier = state
                .db
                .cashiers()
                .get_by_id(&user.id)
                .await?
                .ok_or_else(|| ApiError::not_found("Cashier", &user.id))?;
            Identity {
                id: cashier.id,
                role: Role::Cashier,
                name: cashier.name,
                email: cashier.email,
                shop_id: Some(cashier.shop_id),
            }
        }
    };

    Ok(Json(identity))
}
