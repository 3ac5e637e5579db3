//! # Catalog Repositories
//!
//! Categories and suppliers. Both are small tenant-scoped lists; products
//! reference them and CATEGORY-scoped discounts and bulk changes select by
//! category.

use sqlx::SqlitePool;
use tracing::debug;

use super::count_distinct_ids;
use crate::error::DbResult;
use ventesca_core::{Category, Supplier};

// =============================================================================
// Categories
// =============================================================================

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            "INSERT INTO categories (id, tenant_id, name, description, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&category.id)
        .bind(&category.tenant_id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await?;

        Ok(category.clone())
    }

    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, tenant_id, name, description, created_at FROM categories WHERE id = ?1 AND tenant_id = ?2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Lists the tenant's categories, sorted by name.
    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, tenant_id, name, description, created_at FROM categories WHERE tenant_id = ?1 ORDER BY name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// How many distinct `ids` are categories of the tenant.
    pub async fn count_existing(&self, tenant_id: &str, ids: &[String]) -> DbResult<usize> {
        count_distinct_ids(&self.pool, "categories", "", tenant_id, ids).await
    }
}

// =============================================================================
// Suppliers
// =============================================================================

#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    pub async fn insert(&self, supplier: &Supplier) -> DbResult<Supplier> {
        debug!(name = %supplier.name, "Inserting supplier");

        sqlx::query(
            "INSERT INTO suppliers (id, tenant_id, name, contact, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&supplier.id)
        .bind(&supplier.tenant_id)
        .bind(&supplier.name)
        .bind(&supplier.contact)
        .bind(supplier.created_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier.clone())
    }

    pub async fn get_by_id(&self, tenant_id: &str, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>(
            "SELECT id, tenant_id, name, contact, created_at FROM suppliers WHERE id = ?1 AND tenant_id = ?2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(supplier)
    }

    pub async fn list(&self, tenant_id: &str) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>(
            "SELECT id, tenant_id, name, contact, created_at FROM suppliers WHERE tenant_id = ?1 ORDER BY name",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(suppliers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{new_category, test_db, TENANT};
    use chrono::Utc;

    #[tokio::test]
    async fn test_categories_are_tenant_scoped() {
        let db = test_db().await;
        let repo = db.categories();

        let drinks = repo.insert(&new_category("Drinks")).await.unwrap();
        repo.insert(&new_category("Bakery")).await.unwrap();

        let names: Vec<String> = repo
            .list(TENANT)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Bakery", "Drinks"]);

        assert!(repo.get_by_id("someone-else", &drinks.id).await.unwrap().is_none());
        assert_eq!(
            repo.count_existing(TENANT, &[drinks.id.clone(), "missing".to_string()])
                .await
                .unwrap(),
            1
        );
        // a repeated id counts once
        assert_eq!(
            repo.count_existing(TENANT, &[drinks.id.clone(), drinks.id.clone()])
                .await
                .unwrap(),
            1
        );
        assert_eq!(repo.count_existing(TENANT, &[]).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_suppliers() {
        let db = test_db().await;
        let supplier = Supplier {
            id: uuid::Uuid::new_v4().to_string(),
            tenant_id: TENANT.to_string(),
            name: "Distribuidora Sur".to_string(),
            contact: Some("ventas@sur.example".to_string()),
            created_at: Utc::now(),
        };

        db.suppliers().insert(&supplier).await.unwrap();

        let listed = db.suppliers().list(TENANT).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].contact.as_deref(), Some("ventas@sur.example"));

        let found = db.suppliers().get_by_id(TENANT, &supplier.id).await.unwrap();
        assert_eq!(found.map(|s| s.name).as_deref(), Some("Distribuidora Sur"));
        assert!(db
            .suppliers()
            .get_by_id("someone-else", &supplier.id)
            .await
            .unwrap()
            .is_none());
    }
}
