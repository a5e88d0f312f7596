//! # Application State
//!
//! Shared by every handler through `State<SharedState>`.

use std::sync::Arc;

use duka_db::Database;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use crate::refresh::DashboardCache;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub db: Database,
    pub jwt: JwtManager,
    pub dashboard: DashboardCache,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> SharedState {
        let jwt = JwtManager::new(
            config.auth.jwt_secret.clone(),
            config.auth.access_lifetime_secs,
            config.auth.refresh_lifetime_secs,
        );

        Arc::new(AppState {
            db,
            jwt,
            dashboard: DashboardCache::new(config.dashboard.period),
            config,
        })
    }
}
