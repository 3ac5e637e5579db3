//! # Repository Module
//!
//! Database repository implementations for Ventesca.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Intent handler (apps/server)                                           │
//! │       │                                                                 │
//! │       │  db.orders().get_line(&order.id, &line_id)                      │
//! │       ▼                                                                 │
//! │  OrderRepository                                                        │
//! │  ├── open_current(&self, tenant, seller)                                │
//! │  ├── get_line(&self, order, line)                                       │
//! │  ├── update_line(&self, line)                                           │
//! │  └── delete_line(&self, order, line)                                    │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! │                                                                         │
//! │  Every read and write is scoped by tenant_id.                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Products, soft delete, valuation
//! - [`CategoryRepository`](catalog::CategoryRepository) / [`SupplierRepository`](catalog::SupplierRepository)
//! - [`DiscountRepository`](discount::DiscountRepository) - Discounts and their links
//! - [`OrderRepository`](order::OrderRepository) - The current order and its lines
//! - [`BulkModificationRepository`](bulk::BulkModificationRepository) - Setup, execute, cancel, revert

pub mod bulk;
pub mod catalog;
pub mod discount;
pub mod order;
pub mod product;

/// `?2, ?3, ...` placeholders for an `IN (...)` list bound after `?1`.
pub(crate) fn in_placeholders(count: usize) -> String {
    (2..count + 2)
        .map(|n| format!("?{n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// How many distinct `ids` name a live row of `table` owned by the tenant.
pub(crate) async fn count_distinct_ids(
    pool: &sqlx::SqlitePool,
    table: &str,
    live_filter: &str,
    tenant_id: &str,
    ids: &[String],
) -> crate::error::DbResult<usize> {
    if ids.is_empty() {
        return Ok(0);
    }

    let sql = format!(
        "SELECT COUNT(DISTINCT id) FROM {table} WHERE tenant_id = ?1 {live_filter} AND id IN ({})",
        in_placeholders(ids.len())
    );

    let mut query = sqlx::query_scalar::<_, i64>(&sql).bind(tenant_id);
    for id in ids {
        query = query.bind(id);
    }

    Ok(query.fetch_one(pool).await? as usize)
}
