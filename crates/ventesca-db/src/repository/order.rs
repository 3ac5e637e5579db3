//! # Order Repository
//!
//! The seller's current order and its lines.
//!
//! ## Current Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Current Order                                     │
//! │                                                                         │
//! │  1. OPEN                                                                │
//! │     └── open_current(tenant, seller) → Order { status: Pending }        │
//! │         (get-or-create; at most one PENDING order per seller)           │
//! │                                                                         │
//! │  2. EDIT LINES                                                          │
//! │     └── insert_line()  → ProductOrder { quantity: 1, SELL }             │
//! │     └── update_line()  → quantity / type / totals                       │
//! │     └── delete_line()                                                   │
//! │                                                                         │
//! │  Every line lookup is scoped by the order id, so a seller can only      │
//! │  touch lines of their own current order.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Line writes are single-row statements; concurrent edits of one line are
//! last-write-wins.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use ventesca_core::{Order, OrderStatus, ProductOrder};

const LINE_COLUMNS: &str = r#"
    id, order_id, product_id, quantity, line_type, total_price, total_discount, created_at, updated_at
"#;

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// The seller's PENDING order, if one is open.
    pub async fn find_current(&self, tenant_id: &str, seller_id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, tenant_id, seller_id, status, created_at, updated_at
            FROM orders
            WHERE tenant_id = ?1 AND seller_id = ?2 AND status = ?3
            "#,
        )
        .bind(tenant_id)
        .bind(seller_id)
        .bind(OrderStatus::Pending)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Returns the seller's PENDING order, creating it first if needed.
    pub async fn open_current(&self, tenant_id: &str, seller_id: &str) -> DbResult<Order> {
        if let Some(order) = self.find_current(tenant_id, seller_id).await? {
            return Ok(order);
        }

        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        // A concurrent open may win the partial unique index; then we read theirs.
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO orders (id, tenant_id, seller_id, status, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
        )
        .bind(&id)
        .bind(tenant_id)
        .bind(seller_id)
        .bind(OrderStatus::Pending)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            info!(order_id = %id, seller_id = %seller_id, "Opened new current order");
        }

        self.find_current(tenant_id, seller_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", seller_id))
    }

    /// Lists the lines of an order in the order they were added.
    pub async fn list_lines(&self, order_id: &str) -> DbResult<Vec<ProductOrder>> {
        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM product_orders WHERE order_id = ?1 ORDER BY created_at, id"
        );

        let lines = sqlx::query_as::<_, ProductOrder>(&sql)
            .bind(order_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(lines)
    }

    /// A line of the given order.
    pub async fn get_line(&self, order_id: &str, line_id: &str) -> DbResult<Option<ProductOrder>> {
        let sql = format!("SELECT {LINE_COLUMNS} FROM product_orders WHERE id = ?1 AND order_id = ?2");

        let line = sqlx::query_as::<_, ProductOrder>(&sql)
            .bind(line_id)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(line)
    }

    /// The line holding `product_id` in the given order, if any.
    pub async fn find_line_by_product(
        &self,
        order_id: &str,
        product_id: &str,
    ) -> DbResult<Option<ProductOrder>> {
        let sql = format!(
            "SELECT {LINE_COLUMNS} FROM product_orders WHERE order_id = ?1 AND product_id = ?2"
        );

        let line = sqlx::query_as::<_, ProductOrder>(&sql)
            .bind(order_id)
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(line)
    }

    pub async fn insert_line(&self, line: &ProductOrder) -> DbResult<ProductOrder> {
        debug!(order_id = %line.order_id, product_id = %line.product_id, "Inserting order line");

        sqlx::query(
            r#"
            INSERT INTO product_orders (
                id, order_id, product_id, quantity, line_type,
                total_price, total_discount, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(&line.product_id)
        .bind(line.quantity)
        .bind(line.line_type)
        .bind(line.total_price)
        .bind(line.total_discount)
        .bind(line.created_at)
        .bind(line.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(line.clone())
    }

    /// Persists quantity, type and totals of a line.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - the line was deleted meanwhile
    pub async fn update_line(&self, line: &ProductOrder) -> DbResult<()> {
        debug!(
            line_id = %line.id,
            quantity = line.quantity,
            line_type = ?line.line_type,
            total_price = line.total_price,
            "Updating order line"
        );

        let result = sqlx::query(
            r#"
            UPDATE product_orders SET
                quantity = ?3,
                line_type = ?4,
                total_price = ?5,
                total_discount = ?6,
                updated_at = ?7
            WHERE id = ?1 AND order_id = ?2
            "#,
        )
        .bind(&line.id)
        .bind(&line.order_id)
        .bind(line.quantity)
        .bind(line.line_type)
        .bind(line.total_price)
        .bind(line.total_discount)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order line", &line.id));
        }

        Ok(())
    }

    /// Removes a line from the order.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - no such line in this order
    pub async fn delete_line(&self, order_id: &str, line_id: &str) -> DbResult<()> {
        debug!(line_id = %line_id, "Deleting order line");

        let result = sqlx::query("DELETE FROM product_orders WHERE id = ?1 AND order_id = ?2")
            .bind(line_id)
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order line", line_id));
        }

        Ok(())
    }
}

/// Helper to generate a new order line ID.
pub fn generate_line_id() -> String {
    Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{new_product, test_db, SELLER, TENANT};
    use ventesca_core::LineType;

    fn line_for(order_id: &str, product_id: &str) -> ProductOrder {
        let now = Utc::now();
        ProductOrder {
            id: generate_line_id(),
            order_id: order_id.to_string(),
            product_id: product_id.to_string(),
            quantity: 1,
            line_type: LineType::Sell,
            total_price: 100,
            total_discount: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_open_current_is_get_or_create() {
        let db = test_db().await;
        let repo = db.orders();

        assert!(repo.find_current(TENANT, SELLER).await.unwrap().is_none());

        let first = repo.open_current(TENANT, SELLER).await.unwrap();
        let second = repo.open_current(TENANT, SELLER).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.status, OrderStatus::Pending);

        let other = repo.open_current(TENANT, "another-seller").await.unwrap();
        assert_ne!(first.id, other.id);
    }

    #[tokio::test]
    async fn test_line_crud_is_scoped_to_order() {
        let db = test_db().await;
        let product = db.products().insert(&new_product("A", 100, 5)).await.unwrap();
        let repo = db.orders();

        let order = repo.open_current(TENANT, SELLER).await.unwrap();
        let other_order = repo.open_current(TENANT, "another-seller").await.unwrap();

        let mut line = repo.insert_line(&line_for(&order.id, &product.id)).await.unwrap();

        assert!(repo.get_line(&other_order.id, &line.id).await.unwrap().is_none());
        assert!(repo
            .find_line_by_product(&order.id, &product.id)
            .await
            .unwrap()
            .is_some());

        line.quantity = 4;
        line.line_type = LineType::Return;
        line.total_price = -400;
        repo.update_line(&line).await.unwrap();

        let stored = repo.get_line(&order.id, &line.id).await.unwrap().unwrap();
        assert_eq!(stored.quantity, 4);
        assert_eq!(stored.line_type, LineType::Return);
        assert_eq!(stored.total_price, -400);

        assert!(matches!(
            repo.delete_line(&other_order.id, &line.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
        repo.delete_line(&order.id, &line.id).await.unwrap();
        assert!(repo.list_lines(&order.id).await.unwrap().is_empty());

        assert!(matches!(
            repo.update_line(&line).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_negative_quantity_is_rejected_by_schema() {
        let db = test_db().await;
        let product = db.products().insert(&new_product("A", 100, 5)).await.unwrap();
        let order = db.orders().open_current(TENANT, SELLER).await.unwrap();

        let mut line = line_for(&order.id, &product.id);
        line.quantity = -1;
        assert!(db.orders().insert_line(&line).await.is_err());
    }
}
