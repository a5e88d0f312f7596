//! # Duka API Server
//!
//! ## Startup
//! ```text
//! ApiConfig::load ──► tracing ──► Database::new (migrations) ──► admin bootstrap
//!        ──► AppState ──► DashboardRefresher ──► axum::serve (until Ctrl+C / SIGTERM)
//! ```

use anyhow::Context;
use chrono::Utc;
use duka_api::auth::hash_password;
use duka_api::refresh::DashboardRefresher;
use duka_api::{build_router, ApiConfig, AppState};
use duka_core::validation::{validate_email, validate_password};
use duka_core::Admin;
use duka_db::{Database, DbConfig};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::load(None).context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("Invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Duka API server...");
    config.uses_default_secret();

    let db = Database::new(
        DbConfig::new(&config.database.path).max_connections(config.database.max_connections),
    )
    .await
    .context("Failed to open database")?;

    bootstrap_admin(&db, &config).await?;

    let addr = config.server.bind_address();
    let state = AppState::new(db.clone(), config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let refresher = DashboardRefresher::new(state.clone()).spawn(shutdown_rx);

    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let _ = shutdown_tx.send(true);
    if let Err(e) = refresher.await {
        warn!(error = %e, "Dashboard refresher ended abnormally");
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

/// Creates the first admin from configuration when the table is empty.
async fn bootstrap_admin(db: &Database, config: &ApiConfig) -> anyhow::Result<()> {
    if db.admins().count().await? > 0 {
        return Ok(());
    }

    let (Some(email), Some(password)) = (&config.auth.admin_email, &config.auth.admin_password)
    else {
        warn!("No admin account exists; set DUKA_ADMIN_EMAIL and DUKA_ADMIN_PASSWORD to create one");
        return Ok(());
    };

    validate_email(email)?;
    validate_password(password)?;

    let admin = Admin {
        id: Uuid::new_v4().to_string(),
        name: config.auth.admin_name.clone(),
        email: email.trim().to_lowercase(),
        created_at: Utc::now(),
    };
    let hash = hash_password(password)?;
    db.admins().insert(&admin, &hash).await?;

    info!(admin_id = %admin.id, email = %admin.email, "Bootstrapped admin account");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
