//! # Schema Migrations
//!
//! The SQL files under `migrations/sqlite` are compiled into the binary, so
//! the server and the seed tool bring their schema with them. sqlx records
//! what it applied in `_sqlx_migrations` and skips those on the next start.
//!
//! New schema goes in a new `NNN_description.sql` file; applied files are
//! checksummed and must not be edited.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever is pending. Safe to call on every start.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    let (embedded, applied) = migration_status(pool).await.unwrap_or((MIGRATOR.migrations.len(), 0));
    debug!(embedded, applied, "Migration status before start");

    MIGRATOR.run(pool).await?;

    if applied < embedded {
        info!(count = embedded - applied, "Applied schema migrations");
    }
    Ok(())
}

/// `(embedded, applied)` counts. Fails before the first migration ran,
/// since the bookkeeping table does not exist yet.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;

    Ok((MIGRATOR.migrations.len(), applied.max(0) as usize))
}
