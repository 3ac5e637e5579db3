//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Lookup by scanned code (add-product intent)
//! - CRUD with soft delete
//! - Inventory valuation for reports and bulk previews
//!
//! Soft-deleted products are invisible to every read in this module.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use super::count_distinct_ids;
use crate::error::{DbError, DbResult};
use ventesca_core::{InventoryValuation, Product};

const PRODUCT_COLUMNS: &str = r#"
    id, tenant_id, code, name, cost, selling_price, stock,
    is_active, is_deleted, category_id, supplier_id, created_at, updated_at
"#;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a non-deleted product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found, deleted, or owned by another tenant
    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND tenant_id = ?2 AND is_deleted = 0"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Gets a non-deleted product by its business code.
    ///
    /// ## Arguments
    /// * `code` - Product code as scanned (e.g., "7801234567890")
    pub async fn get_by_code(&self, tenant_id: &str, code: &str) -> DbResult<Option<Product>> {
        debug!(code = %code, "Looking up product by code");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE code = ?1 AND tenant_id = ?2 AND is_deleted = 0"
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(code.trim())
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// How many distinct `ids` are non-deleted products of the tenant.
    pub async fn count_existing(&self, tenant_id: &str, ids: &[String]) -> DbResult<usize> {
        count_distinct_ids(&self.pool, "products", "AND is_deleted = 0", tenant_id, ids).await
    }

    /// Lists the tenant's non-deleted products, sorted by name.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE tenant_id = ?1 AND is_deleted = 0 ORDER BY name"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - Code already used by a live product
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, tenant_id, code, name, cost, selling_price, stock,
                is_active, is_deleted, category_id, supplier_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.tenant_id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(product.cost)
        .bind(product.selling_price)
        .bind(product.stock)
        .bind(product.is_active)
        .bind(product.is_deleted)
        .bind(&product.category_id)
        .bind(&product.supplier_id)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => DbError::duplicate("code", &product.code),
            other => other,
        })?;

        Ok(product.clone())
    }

    /// Sets a product's stock level.
    pub async fn set_stock(&self, tenant_id: &str, id: &str, stock: i64) -> DbResult<()> {
        debug!(id = %id, stock = stock, "Setting stock");

        let result = sqlx::query(
            "UPDATE products SET stock = ?3, updated_at = ?4 WHERE id = ?1 AND tenant_id = ?2 AND is_deleted = 0",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_deleted = true.
    ///
    /// Order lines and price history keep referencing the row.
    pub async fn soft_delete(&self, tenant_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let result = sqlx::query(
            "UPDATE products SET is_deleted = 1, updated_at = ?3 WHERE id = ?1 AND tenant_id = ?2 AND is_deleted = 0",
        )
        .bind(id)
        .bind(tenant_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Inventory-wide totals over the tenant's non-deleted products.
    pub async fn valuation(&self, tenant_id: &str) -> DbResult<InventoryValuation> {
        let valuation = sqlx::query_as::<_, InventoryValuation>(
            r#"
            SELECT
                COUNT(*)                                        AS product_count,
                COALESCE(SUM(stock), 0)                         AS total_units,
                COALESCE(SUM(selling_price * stock), 0)         AS total_selling_value,
                COALESCE(SUM(cost * stock), 0)                  AS total_cost_value,
                COALESCE(SUM((selling_price - cost) * stock), 0) AS potential_profit
            FROM products
            WHERE tenant_id = ?1 AND is_deleted = 0
            "#,
        )
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(valuation)
    }

    /// Counts the tenant's non-deleted products.
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE tenant_id = ?1 AND is_deleted = 0")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
