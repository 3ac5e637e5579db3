//! # Discount Repository
//!
//! Discount definitions and the links that decide which products they reach.
//!
//! ## Reach by Scope
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  scope           linked through            reaches                      │
//! │  ──────────────  ────────────────────────  ──────────────────────────   │
//! │  GLOBAL          (nothing)                 every product of the tenant  │
//! │  CATEGORY        discount_categories       products of those categories │
//! │  SINGLE_PRODUCT  discount_products         those products               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`DiscountRepository::for_product`] assembles the candidate set handed to
//! the pricing engine. Eligibility (active flag, minimum quantity) is decided
//! by the engine, not here.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use ventesca_core::pricing::merge_discounts;
use ventesca_core::{Discount, Product};

const DISCOUNT_COLUMNS: &str = r#"
    d.id, d.tenant_id, d.name, d.scope, d.discount_type, d.application_method,
    d.value, d.minimum_quantity, d.valid_from, d.valid_until, d.is_active, d.created_at
"#;

#[derive(Debug, Clone)]
pub struct DiscountRepository {
    pool: SqlitePool,
}

impl DiscountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        DiscountRepository { pool }
    }

    /// Inserts a discount together with its product or category links.
    ///
    /// Links that do not match the discount's scope are ignored by
    /// [`for_product`](Self::for_product), so callers validate them first.
    pub async fn insert(
        &self,
        discount: &Discount,
        product_ids: &[String],
        category_ids: &[String],
    ) -> DbResult<Discount> {
        debug!(name = %discount.name, scope = ?discount.scope, "Inserting discount");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO discounts (
                id, tenant_id, name, scope, discount_type, application_method,
                value, minimum_quantity, valid_from, valid_until, is_active, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&discount.id)
        .bind(&discount.tenant_id)
        .bind(&discount.name)
        .bind(discount.scope)
        .bind(discount.discount_type)
        .bind(discount.application_method)
        .bind(discount.value)
        .bind(discount.minimum_quantity)
        .bind(discount.valid_from)
        .bind(discount.valid_until)
        .bind(discount.is_active)
        .bind(discount.created_at)
        .execute(&mut *tx)
        .await?;

        for product_id in product_ids {
            sqlx::query("INSERT INTO discount_products (discount_id, product_id) VALUES (?1, ?2)")
                .bind(&discount.id)
                .bind(product_id)
                .execute(&mut *tx)
                .await?;
        }

        for category_id in category_ids {
            sqlx::query("INSERT INTO discount_categories (discount_id, category_id) VALUES (?1, ?2)")
                .bind(&discount.id)
                .bind(category_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(discount.clone())
    }

    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Discount>> {
        let sql = format!("SELECT {DISCOUNT_COLUMNS} FROM discounts d WHERE d.id = ?1 AND d.tenant_id = ?2");

        let discount = sqlx::query_as::<_, Discount>(&sql)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(discount)
    }

    /// Lists the tenant's discounts, newest first.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Discount>> {
        let sql = format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts d WHERE d.tenant_id = ?1 ORDER BY d.created_at DESC"
        );

        let discounts = sqlx::query_as::<_, Discount>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(discounts)
    }

    /// Deletes a discount; its links go with it.
    ///
    /// Order lines priced with it keep their stored totals until next touched.
    pub async fn delete(&self, tenant_id: &str, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting discount");

        let result = sqlx::query("DELETE FROM discounts WHERE id = ?1 AND tenant_id = ?2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        Ok(())
    }

    /// Flips `is_active` and returns the updated discount.
    pub async fn toggle_active(&self, tenant_id: &str, id: &str) -> DbResult<Discount> {
        let result = sqlx::query(
            "UPDATE discounts SET is_active = CASE is_active WHEN 0 THEN 1 ELSE 0 END WHERE id = ?1 AND tenant_id = ?2",
        )
        .bind(id)
        .bind(tenant_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Discount", id));
        }

        self.get_by_id(tenant_id, id)
            .await?
            .ok_or_else(|| DbError::not_found("Discount", id))
    }

    /// The candidate discounts of a product.
    ///
    /// ```text
    ///   linked to the product  ∪  linked to its category  ∪  active GLOBAL
    /// ```
    ///
    /// De-duplicated by id.
    pub async fn for_product(&self, product: &Product) -> DbResult<Vec<Discount>> {
        let linked_sql = format!(
            r#"
            SELECT {DISCOUNT_COLUMNS} FROM discounts d
            WHERE d.tenant_id = ?1 AND (
                (d.scope = 'SINGLE_PRODUCT' AND EXISTS (
                    SELECT 1 FROM discount_products dp
                    WHERE dp.discount_id = d.id AND dp.product_id = ?2))
                OR (d.scope = 'CATEGORY' AND EXISTS (
                    SELECT 1 FROM discount_categories dc
                    WHERE dc.discount_id = d.id AND dc.category_id = ?3))
            )
            ORDER BY d.created_at
            "#
        );

        let linked = sqlx::query_as::<_, Discount>(&linked_sql)
            .bind(&product.tenant_id)
            .bind(&product.id)
            .bind(&product.category_id)
            .fetch_all(&self.pool)
            .await?;

        let global_sql = format!(
            r#"
            SELECT {DISCOUNT_COLUMNS} FROM discounts d
            WHERE d.tenant_id = ?1 AND d.scope = 'GLOBAL' AND d.is_active = 1
            ORDER BY d.created_at
            "#
        );

        let global = sqlx::query_as::<_, Discount>(&global_sql)
            .bind(&product.tenant_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(
            product_id = %product.id,
            linked = linked.len(),
            global = global.len(),
            "Loaded candidate discounts"
        );

        Ok(merge_discounts([linked, global]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{new_category, new_discount, new_product, test_db, TENANT};
    use ventesca_core::{ApplicationMethod, DiscountScope, DiscountType};

    #[tokio::test]
    async fn test_for_product_collects_every_scope() {
        let db = test_db().await;

        let drinks = db.categories().insert(&new_category("Drinks")).await.unwrap();
        let mut cola = new_product("COLA", 1000, 10);
        cola.category_id = Some(drinks.id.clone());
        let cola = db.products().insert(&cola).await.unwrap();
        let bread = db.products().insert(&new_product("BREAD", 500, 10)).await.unwrap();

        let repo = db.discounts();
        let single = new_discount(
            DiscountScope::SingleProduct,
            DiscountType::Fixed,
            ApplicationMethod::ByProduct,
            50,
        );
        repo.insert(&single, &[cola.id.clone()], &[]).await.unwrap();

        let by_category = new_discount(
            DiscountScope::Category,
            DiscountType::Percentage,
            ApplicationMethod::ToTotal,
            10,
        );
        repo.insert(&by_category, &[], &[drinks.id.clone()]).await.unwrap();

        let global = new_discount(
            DiscountScope::Global,
            DiscountType::Fixed,
            ApplicationMethod::ToTotal,
            100,
        );
        repo.insert(&global, &[], &[]).await.unwrap();

        let mut ids: Vec<String> = repo
            .for_product(&cola)
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        ids.sort();
        let mut expected = vec![single.id.clone(), by_category.id.clone(), global.id.clone()];
        expected.sort();
        assert_eq!(ids, expected);

        let for_bread = repo.for_product(&bread).await.unwrap();
        assert_eq!(for_bread.len(), 1);
        assert_eq!(for_bread[0].id, global.id);
    }

    #[tokio::test]
    async fn test_inactive_global_is_not_a_candidate() {
        let db = test_db().await;
        let product = db.products().insert(&new_product("X", 100, 1)).await.unwrap();

        let mut global = new_discount(
            DiscountScope::Global,
            DiscountType::Fixed,
            ApplicationMethod::ToTotal,
            10,
        );
        global.is_active = false;
        db.discounts().insert(&global, &[], &[]).await.unwrap();

        assert!(db.discounts().for_product(&product).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_and_delete() {
        let db = test_db().await;
        let repo = db.discounts();

        let discount = new_discount(
            DiscountScope::Global,
            DiscountType::Percentage,
            ApplicationMethod::ToTotal,
            5,
        );
        repo.insert(&discount, &[], &[]).await.unwrap();

        let toggled = repo.toggle_active(TENANT, &discount.id).await.unwrap();
        assert!(!toggled.is_active);
        let toggled = repo.toggle_active(TENANT, &discount.id).await.unwrap();
        assert!(toggled.is_active);

        repo.delete(TENANT, &discount.id).await.unwrap();
        assert!(repo.list(TENANT).await.unwrap().is_empty());

        let err = repo.delete(TENANT, &discount.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
