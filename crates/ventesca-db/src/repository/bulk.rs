//! # Bulk Price Modification Repository
//!
//! Persistence of the bulk repricing workflow. Setup, execute and revert
//! each run in a single transaction; dropping the transaction on any error
//! rolls every write back.
//!
//! ## Execute Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. load parent, require PENDING                                       │
//! │   2. read staged rows + product code/name + category name               │
//! │   3. per row: UPDATE products.selling_price = new_price                 │
//! │              INSERT price_modification_snapshots                        │
//! │   4. parent → EXECUTED (executed_by, executed_at)                       │
//! │   5. rows → APPLIED                                                     │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Revert Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │   1. load parent, require EXECUTED                                      │
//! │   2. load snapshot rows (missing snapshot is fatal)                     │
//! │   3. per row: INSERT REVERSAL price_modification                        │
//! │                 (old = current price, new = snapshot old price)         │
//! │              UPDATE products.selling_price = snapshot old price         │
//! │   4. parent → REVERTED (reverted_by, reverted_at)                       │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use ventesca_core::bulk::{compute_new_price, project, BulkProjection, BulkSetup, StagedChange};
use ventesca_core::{
    BulkPriceModification, BulkStatus, CoreError, Money, PriceModification,
    PriceModificationKind, PriceModificationSnapshot, PriceModificationStatus,
};

const BULK_COLUMNS: &str = r#"
    id, tenant_id, scope, strategy, direction, adjustment_value, affected_products_count,
    status, reason, created_by, created_at, executed_by, executed_at, reverted_by, reverted_at
"#;

const MODIFICATION_COLUMNS: &str = r#"
    id, bulk_modification_id, product_id, old_price, new_price, status, kind, created_at
"#;

// =============================================================================
// Row Types
// =============================================================================

/// A product selected by the scope of a setup.
#[derive(Debug, sqlx::FromRow)]
struct ScopedProduct {
    id: String,
    selling_price: i64,
}

/// A staged row joined with the product details the snapshot keeps.
#[derive(Debug, sqlx::FromRow)]
struct StagedRow {
    price_modification_id: String,
    product_id: String,
    old_price: i64,
    new_price: i64,
    product_code: String,
    product_name: String,
    category_name: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct StagedStock {
    old_price: i64,
    new_price: i64,
    stock: i64,
}

// =============================================================================
// Repository
// =============================================================================

#[derive(Debug, Clone)]
pub struct BulkModificationRepository {
    pool: SqlitePool,
}

impl BulkModificationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        BulkModificationRepository { pool }
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// A bulk modification of the tenant, with its selected categories.
    pub async fn get(&self, tenant_id: &str, id: &str) -> DbResult<Option<BulkPriceModification>> {
        let mut conn = self.pool.acquire().await?;
        fetch_bulk(&mut conn, tenant_id, id).await
    }

    /// The tenant's bulk modifications, newest first.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<BulkPriceModification>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "SELECT {BULK_COLUMNS} FROM bulk_price_modifications WHERE tenant_id = ?1 ORDER BY created_at DESC, id"
        );

        let mut bulks = sqlx::query_as::<_, BulkPriceModification>(&sql)
            .bind(tenant_id)
            .fetch_all(&mut *conn)
            .await?;

        for bulk in &mut bulks {
            bulk.category_ids = fetch_category_ids(&mut conn, &bulk.id).await?;
        }

        Ok(bulks)
    }

    /// Every price modification row of a bulk modification, ADJUSTMENT rows first.
    pub async fn modifications(&self, bulk_id: &str) -> DbResult<Vec<PriceModification>> {
        let sql = format!(
            r#"
            SELECT {MODIFICATION_COLUMNS} FROM price_modifications
            WHERE bulk_modification_id = ?1
            ORDER BY kind, created_at, id
            "#
        );

        let rows = sqlx::query_as::<_, PriceModification>(&sql)
            .bind(bulk_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows)
    }

    /// The snapshot captured when the bulk modification executed.
    pub async fn snapshots(&self, bulk_id: &str) -> DbResult<Vec<PriceModificationSnapshot>> {
        let mut conn = self.pool.acquire().await?;
        fetch_snapshots(&mut conn, bulk_id).await
    }

    /// PENDING rows paired with the current stock of their product.
    ///
    /// Products deleted since setup drop out, as they do from the valuation.
    pub async fn staged_changes(&self, bulk_id: &str) -> DbResult<Vec<StagedChange>> {
        let rows = sqlx::query_as::<_, StagedStock>(
            r#"
            SELECT pm.old_price, pm.new_price, p.stock
            FROM price_modifications pm
            JOIN products p ON p.id = pm.product_id AND p.is_deleted = 0
            WHERE pm.bulk_modification_id = ?1
              AND pm.kind = ?2
              AND pm.status = ?3
            "#,
        )
        .bind(bulk_id)
        .bind(PriceModificationKind::Adjustment)
        .bind(PriceModificationStatus::Pending)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StagedChange {
                old_price: Money::from_minor(r.old_price),
                new_price: Money::from_minor(r.new_price),
                stock: r.stock,
            })
            .collect())
    }

    /// Inventory totals as they would be after executing the staged rows.
    pub async fn preview(&self, tenant_id: &str, id: &str) -> DbResult<BulkProjection> {
        let bulk = self
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Bulk price modification", id))?;

        let changes = self.staged_changes(id).await?;
        let current = ProductRepository::new(self.pool.clone())
            .valuation(tenant_id)
            .await?;

        Ok(project(&changes, bulk.direction, &current))
    }

    // -------------------------------------------------------------------------
    // Setup
    // -------------------------------------------------------------------------

    /// Stages a bulk modification: parent row plus one PENDING row per
    /// product in scope, all in one transaction. Products are not touched.
    ///
    /// The request is expected to be validated already.
    pub async fn setup(
        &self,
        tenant_id: &str,
        created_by: &str,
        setup: &BulkSetup,
    ) -> DbResult<BulkPriceModification> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(
            bulk_id = %id,
            scope = ?setup.scope,
            strategy = ?setup.strategy,
            direction = ?setup.direction,
            adjustment = setup.adjustment_value,
            "Setting up bulk price modification"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO bulk_price_modifications (
                id, tenant_id, scope, strategy, direction, adjustment_value,
                affected_products_count, status, reason, created_by, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(tenant_id)
        .bind(setup.scope)
        .bind(setup.strategy)
        .bind(setup.direction)
        .bind(setup.adjustment_value)
        .bind(BulkStatus::Pending)
        .bind(&setup.reason)
        .bind(created_by)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for category_id in setup.scoped_category_ids() {
            sqlx::query(
                "INSERT OR IGNORE INTO bulk_price_modification_categories (bulk_modification_id, category_id) VALUES (?1, ?2)",
            )
            .bind(&id)
            .bind(category_id)
            .execute(&mut *tx)
            .await?;
        }

        // INVENTORY scope has no category links, so the second branch never matches.
        let products = sqlx::query_as::<_, ScopedProduct>(
            r#"
            SELECT p.id, p.selling_price
            FROM products p
            WHERE p.tenant_id = ?1
              AND p.is_deleted = 0
              AND (?2 = 'INVENTORY' OR p.category_id IN (
                    SELECT category_id FROM bulk_price_modification_categories
                    WHERE bulk_modification_id = ?3))
            ORDER BY p.code
            "#,
        )
        .bind(tenant_id)
        .bind(setup.scope)
        .bind(&id)
        .fetch_all(&mut *tx)
        .await?;

        for product in &products {
            let new_price = compute_new_price(
                Money::from_minor(product.selling_price),
                setup.strategy,
                setup.direction,
                setup.adjustment_value,
            )?;

            insert_modification(
                &mut tx,
                &id,
                &product.id,
                product.selling_price,
                new_price.minor(),
                PriceModificationStatus::Pending,
                PriceModificationKind::Adjustment,
            )
            .await?;
        }

        sqlx::query("UPDATE bulk_price_modifications SET affected_products_count = ?2 WHERE id = ?1")
            .bind(&id)
            .bind(products.len() as i64)
            .execute(&mut *tx)
            .await?;

        let bulk = fetch_bulk(&mut tx, tenant_id, &id)
            .await?
            .ok_or_else(|| DbError::not_found("Bulk price modification", &id))?;

        tx.commit().await?;

        info!(
            bulk_id = %id,
            affected_products = products.len(),
            "Bulk price modification staged"
        );

        Ok(bulk)
    }

    // -------------------------------------------------------------------------
    // Execute
    // -------------------------------------------------------------------------

    /// Applies every staged price and captures the snapshot, atomically.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such bulk modification for the tenant
    /// * `Err(DbError::InvalidTransition)` - not PENDING
    pub async fn execute(
        &self,
        tenant_id: &str,
        id: &str,
        executed_by: &str,
    ) -> DbResult<BulkPriceModification> {
        let mut tx = self.pool.begin().await?;

        let bulk = fetch_bulk(&mut tx, tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Bulk price modification", id))?;

        bulk.status.ensure_transition(BulkStatus::Executed)?;

        let rows = sqlx::query_as::<_, StagedRow>(
            r#"
            SELECT
                pm.id       AS price_modification_id,
                pm.product_id,
                pm.old_price,
                pm.new_price,
                p.code      AS product_code,
                p.name      AS product_name,
                c.name      AS category_name
            FROM price_modifications pm
            JOIN products p ON p.id = pm.product_id
            LEFT JOIN categories c ON c.id = p.category_id
            WHERE pm.bulk_modification_id = ?1
              AND pm.kind = ?2
              AND pm.status = ?3
            ORDER BY p.code
            "#,
        )
        .bind(id)
        .bind(PriceModificationKind::Adjustment)
        .bind(PriceModificationStatus::Pending)
        .fetch_all(&mut *tx)
        .await?;

        let now = Utc::now();

        for row in &rows {
            set_selling_price(&mut tx, &row.product_id, row.new_price).await?;

            sqlx::query(
                r#"
                INSERT INTO price_modification_snapshots (
                    id, bulk_modification_id, price_modification_id, product_id,
                    product_code, product_name, category_name, old_price, new_price, captured_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(id)
            .bind(&row.price_modification_id)
            .bind(&row.product_id)
            .bind(&row.product_code)
            .bind(&row.product_name)
            .bind(&row.category_name)
            .bind(row.old_price)
            .bind(row.new_price)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE bulk_price_modifications
            SET status = ?3, executed_by = ?4, executed_at = ?5
            WHERE id = ?1 AND tenant_id = ?2 AND status = ?6
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(BulkStatus::Executed)
        .bind(executed_by)
        .bind(now)
        .bind(BulkStatus::Pending)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InvalidBulkTransition {
                from: bulk.status,
                to: BulkStatus::Executed,
            }
            .into());
        }

        sqlx::query(
            "UPDATE price_modifications SET status = ?2 WHERE bulk_modification_id = ?1 AND kind = ?3",
        )
        .bind(id)
        .bind(PriceModificationStatus::Applied)
        .bind(PriceModificationKind::Adjustment)
        .execute(&mut *tx)
        .await?;

        let executed = fetch_bulk(&mut tx, tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Bulk price modification", id))?;

        tx.commit().await?;

        info!(
            bulk_id = %id,
            executed_by = %executed_by,
            products = rows.len(),
            "Bulk price modification executed"
        );

        Ok(executed)
    }

    // -------------------------------------------------------------------------
    // Cancel
    // -------------------------------------------------------------------------

    /// Discards a PENDING bulk modification and its staged rows.
    pub async fn cancel(&self, tenant_id: &str, id: &str) -> DbResult<()> {
        let bulk = self
            .get(tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Bulk price modification", id))?;

        if !bulk.status.can_cancel() {
            return Err(cannot_cancel(&bulk));
        }

        let result = sqlx::query(
            "DELETE FROM bulk_price_modifications WHERE id = ?1 AND tenant_id = ?2 AND status = ?3",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(BulkStatus::Pending)
        .execute(&self.pool)
        .await?;

        // Executed by someone else between the read and the delete.
        if result.rows_affected() == 0 {
            return Err(cannot_cancel(&bulk));
        }

        info!(bulk_id = %id, "Bulk price modification cancelled");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Revert
    // -------------------------------------------------------------------------

    /// Restores the snapshot prices of an EXECUTED bulk modification.
    ///
    /// ## Returns
    /// * `Err(DbError::InvalidTransition)` - not EXECUTED
    /// * `Err(DbError::MissingSnapshot)` - executed rows without a snapshot
    pub async fn revert(
        &self,
        tenant_id: &str,
        id: &str,
        reverted_by: &str,
    ) -> DbResult<BulkPriceModification> {
        let mut tx = self.pool.begin().await?;

        let bulk = fetch_bulk(&mut tx, tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Bulk price modification", id))?;

        bulk.status.ensure_transition(BulkStatus::Reverted)?;

        let snapshots = fetch_snapshots(&mut tx, id).await?;

        if snapshots.is_empty() && bulk.affected_products_count > 0 {
            warn!(bulk_id = %id, "Executed bulk price modification has no snapshot");
            return Err(CoreError::MissingSnapshot(id.to_string()).into());
        }

        for snapshot in &snapshots {
            let current_price: i64 =
                sqlx::query_scalar("SELECT selling_price FROM products WHERE id = ?1")
                    .bind(&snapshot.product_id)
                    .fetch_optional(&mut *tx)
                    .await?
                    .ok_or_else(|| DbError::not_found("Product", &snapshot.product_id))?;

            insert_modification(
                &mut tx,
                id,
                &snapshot.product_id,
                current_price,
                snapshot.old_price,
                PriceModificationStatus::Applied,
                PriceModificationKind::Reversal,
            )
            .await?;

            set_selling_price(&mut tx, &snapshot.product_id, snapshot.old_price).await?;
        }

        let result = sqlx::query(
            r#"
            UPDATE bulk_price_modifications
            SET status = ?3, reverted_by = ?4, reverted_at = ?5
            WHERE id = ?1 AND tenant_id = ?2 AND status = ?6
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(BulkStatus::Reverted)
        .bind(reverted_by)
        .bind(Utc::now())
        .bind(BulkStatus::Executed)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::InvalidBulkTransition {
                from: bulk.status,
                to: BulkStatus::Reverted,
            }
            .into());
        }

        let reverted = fetch_bulk(&mut tx, tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Bulk price modification", id))?;

        tx.commit().await?;

        info!(
            bulk_id = %id,
            reverted_by = %reverted_by,
            products = snapshots.len(),
            "Bulk price modification reverted"
        );

        Ok(reverted)
    }
}

// =============================================================================
// Connection-level helpers (usable inside a transaction)
// =============================================================================

async fn fetch_bulk(
    conn: &mut SqliteConnection,
    tenant_id: &str,
    id: &str,
) -> DbResult<Option<BulkPriceModification>> {
    let sql = format!(
        "SELECT {BULK_COLUMNS} FROM bulk_price_modifications WHERE id = ?1 AND tenant_id = ?2"
    );

    let bulk = sqlx::query_as::<_, BulkPriceModification>(&sql)
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&mut *conn)
        .await?;

    match bulk {
        Some(mut bulk) => {
            bulk.category_ids = fetch_category_ids(conn, id).await?;
            Ok(Some(bulk))
        }
        None => Ok(None),
    }
}

async fn fetch_category_ids(conn: &mut SqliteConnection, bulk_id: &str) -> DbResult<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar(
        "SELECT category_id FROM bulk_price_modification_categories WHERE bulk_modification_id = ?1 ORDER BY category_id",
    )
    .bind(bulk_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(ids)
}

async fn fetch_snapshots(
    conn: &mut SqliteConnection,
    bulk_id: &str,
) -> DbResult<Vec<PriceModificationSnapshot>> {
    let snapshots = sqlx::query_as::<_, PriceModificationSnapshot>(
        r#"
        SELECT id, bulk_modification_id, price_modification_id, product_id,
               product_code, product_name, category_name, old_price, new_price, captured_at
        FROM price_modification_snapshots
        WHERE bulk_modification_id = ?1
        ORDER BY product_code
        "#,
    )
    .bind(bulk_id)
    .fetch_all(&mut *conn)
    .await?;

    Ok(snapshots)
}

async fn insert_modification(
    conn: &mut SqliteConnection,
    bulk_id: &str,
    product_id: &str,
    old_price: i64,
    new_price: i64,
    status: PriceModificationStatus,
    kind: PriceModificationKind,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO price_modifications (
            id, bulk_modification_id, product_id, old_price, new_price, status, kind, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(bulk_id)
    .bind(product_id)
    .bind(old_price)
    .bind(new_price)
    .bind(status)
    .bind(kind)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn set_selling_price(conn: &mut SqliteConnection, product_id: &str, price: i64) -> DbResult<()> {
    sqlx::query("UPDATE products SET selling_price = ?2, updated_at = ?3 WHERE id = ?1")
        .bind(product_id)
        .bind(price)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

    Ok(())
}

fn cannot_cancel(bulk: &BulkPriceModification) -> DbError {
    DbError::InvalidTransition(format!(
        "Bulk price modification {} is {:?} and can no longer be cancelled",
        bulk.id, bulk.status
    ))
}

// =============================================================================
// Unit Tests
// =============================================================================
