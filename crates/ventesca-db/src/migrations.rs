//! Schema migrations, compiled into the binary.
//!
//! Files in `migrations/sqlite/` are applied in filename order
//! (`NNN_description.sql`). Applied files are checksummed by sqlx, so a
//! shipped migration is never edited; changes go in a new file.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// ```text
/// migrations/sqlite/
/// └── 001_initial_schema.sql  catalog, discounts, orders, bulk modifications
/// ```
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies whatever has not been applied yet.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(known = MIGRATOR.migrations.len(), "Schema up to date");
    Ok(())
}

/// `(known, applied)` migration counts, logged at server start-up.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}
