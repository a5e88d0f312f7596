//! # HTTP Routes
//!
//! ```text
//! /health                      liveness
//! /api/auth/*                  login, refresh, me
//! /api/shops        (admin)    shop CRUD
//! /api/cashiers     (admin)    cashier CRUD, password reset
//! /api/products                catalog; cashiers read their own shop
//! /api/transactions            sales; cashiers create, admins browse
//! /api/credits                 credit sales and repayments
//! /api/expenses     (admin)    expense CRUD
//! /api/reports      (admin)    aggregated reports and dashboard
//! ```

pub mod auth;
pub mod cashiers;
pub mod credits;
pub mod expenses;
pub mod health;
pub mod products;
pub mod reports;
pub mod shops;
pub mod transactions;

use axum::routing::get;
use axum::Router;

use crate::state::SharedState;

/// Every route, still waiting for its state.
pub fn api_routes() -> Router<SharedState> {
    let api = Router::new()
        .nest("/auth", auth::router())
        .nest("/shops", shops::router())
        .nest("/cashiers", cashiers::router())
        .nest("/products", products::router())
        .nest("/transactions", transactions::router())
        .nest("/credits", credits::router())
        .nest("/expenses", expenses::router())
        .nest("/reports", reports::router());

    Router::new()
        .route("/health", get(health::health))
        .nest("/api", api)
}
