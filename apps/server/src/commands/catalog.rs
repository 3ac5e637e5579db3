//! # Catalog Commands
//!
//! Categories, suppliers, products and discounts: the data the two pricing
//! engines read.
//!
//! ```text
//!   GET/POST  /api/categories
//!   GET/POST  /api/suppliers
//!   GET/POST  /api/products          DELETE /api/products/{id}      (soft)
//!   GET/POST  /api/discounts         DELETE /api/discounts/{id}
//!                                    POST   /api/discounts/{id}/toggle
//! ```
//!
//! Every request body is validated field by field before anything is
//! written; references to other catalog rows must belong to the caller's
//! tenant.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::ApiError;
use crate::session::Session;
use crate::state::AppState;
use ventesca_core::validation::{
    validate_code, validate_discount_targets, validate_discount_value, validate_minimum_quantity,
    validate_name, validate_price, validate_stock, validate_uuid,
};
use ventesca_core::{
    ApplicationMethod, Category, Discount, DiscountScope, DiscountType, Product, Supplier,
    ValidationError, ValidationErrors,
};
use ventesca_db::repository::product::generate_product_id;
use ventesca_db::Database;

// =============================================================================
// Request Types
// =============================================================================

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewSupplier {
    pub name: String,
    #[serde(default)]
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub code: String,
    pub name: String,
    pub cost: i64,
    pub selling_price: i64,
    pub stock: i64,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct NewDiscount {
    pub name: String,
    pub scope: DiscountScope,
    pub discount_type: DiscountType,
    pub application_method: ApplicationMethod,
    pub value: i64,
    #[serde(default = "default_minimum_quantity")]
    pub minimum_quantity: i64,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub product_ids: Vec<String>,
    #[serde(default)]
    pub category_ids: Vec<String>,
}

fn default_true() -> bool {
    true
}

fn default_minimum_quantity() -> i64 {
    1
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(validate_code(&self.code));
        errors.check(validate_name(&self.name));
        errors.check(validate_price("cost", self.cost));
        errors.check(validate_price("sellingPrice", self.selling_price));
        errors.check(validate_stock(self.stock));
        if let Some(id) = &self.category_id {
            errors.check(validate_uuid("categoryId", id));
        }
        if let Some(id) = &self.supplier_id {
            errors.check(validate_uuid("supplierId", id));
        }
        errors.into_result()
    }
}

impl NewDiscount {
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors =
            validate_discount_targets(self.scope, &self.product_ids, &self.category_ids);
        errors.check(validate_name(&self.name));
        errors.check(validate_discount_value(self.discount_type, self.value));
        errors.check(validate_minimum_quantity(self.minimum_quantity));
        errors.into_result()
    }
}

// =============================================================================
// Categories & Suppliers
// =============================================================================

/// `GET /api/categories`
pub async fn list_categories(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories().list(&session.tenant_id).await?))
}

/// `POST /api/categories`
pub async fn create_category(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<NewCategory>, JsonRejection>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let Json(input) = payload?;
    validate_name(&input.name)?;

    let category = Category {
        id: Uuid::new_v4().to_string(),
        tenant_id: session.tenant_id,
        name: input.name.trim().to_string(),
        description: input.description,
        created_at: Utc::now(),
    };

    let category = state.db.categories().insert(&category).await?;
    info!(category_id = %category.id, name = %category.name, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /api/suppliers`
pub async fn list_suppliers(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    Ok(Json(state.db.suppliers().list(&session.tenant_id).await?))
}

/// `POST /api/suppliers`
pub async fn create_supplier(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<NewSupplier>, JsonRejection>,
) -> Result<(StatusCode, Json<Supplier>), ApiError> {
    let Json(input) = payload?;
    validate_name(&input.name)?;

    let supplier = Supplier {
        id: Uuid::new_v4().to_string(),
        tenant_id: session.tenant_id,
        name: input.name.trim().to_string(),
        contact: input.contact,
        created_at: Utc::now(),
    };

    let supplier = state.db.suppliers().insert(&supplier).await?;
    info!(supplier_id = %supplier.id, "Supplier created");
    Ok((StatusCode::CREATED, Json(supplier)))
}

// =============================================================================
// Products
// =============================================================================

/// `GET /api/products` - non-deleted products, by name.
pub async fn list_products(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Product>>, ApiError> {
    Ok(Json(state.db.products().list(&session.tenant_id).await?))
}

/// `POST /api/products`
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<NewProduct>, JsonRejection>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let Json(input) = payload?;
    let product = add_product(&state.db, &session, input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

/// `DELETE /api/products/{id}` - soft delete.
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_uuid("id", &id)?;
    state.db.products().soft_delete(&session.tenant_id, &id).await?;
    info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn add_product(
    db: &Database,
    session: &Session,
    input: NewProduct,
) -> Result<Product, ApiError> {
    input.validate()?;

    if let Some(category_id) = &input.category_id {
        if db
            .categories()
            .get_by_id(&session.tenant_id, category_id)
            .await?
            .is_none()
        {
            return Err(unknown_reference("categoryId"));
        }
    }

    if let Some(supplier_id) = &input.supplier_id {
        if db
            .suppliers()
            .get_by_id(&session.tenant_id, supplier_id)
            .await?
            .is_none()
        {
            return Err(unknown_reference("supplierId"));
        }
    }

    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        tenant_id: session.tenant_id.clone(),
        code: input.code.trim().to_string(),
        name: input.name.trim().to_string(),
        cost: input.cost,
        selling_price: input.selling_price,
        stock: input.stock,
        is_active: input.is_active,
        is_deleted: false,
        category_id: input.category_id,
        supplier_id: input.supplier_id,
        created_at: now,
        updated_at: now,
    };

    let product = db.products().insert(&product).await?;
    info!(product_id = %product.id, code = %product.code, "Product created");
    Ok(product)
}

// =============================================================================
// Discounts
// =============================================================================

/// `GET /api/discounts`
pub async fn list_discounts(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Discount>>, ApiError> {
    Ok(Json(state.db.discounts().list(&session.tenant_id).await?))
}

/// `POST /api/discounts`
pub async fn create_discount(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<NewDiscount>, JsonRejection>,
) -> Result<(StatusCode, Json<Discount>), ApiError> {
    let Json(input) = payload?;
    let discount = add_discount(&state.db, &session, input).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

/// `DELETE /api/discounts/{id}`
pub async fn delete_discount(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    validate_uuid("id", &id)?;
    state.db.discounts().delete(&session.tenant_id, &id).await?;
    info!(discount_id = %id, "Discount deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/discounts/{id}/toggle`
pub async fn toggle_discount(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Json<Discount>, ApiError> {
    validate_uuid("id", &id)?;
    let discount = state
        .db
        .discounts()
        .toggle_active(&session.tenant_id, &id)
        .await?;
    info!(discount_id = %id, is_active = discount.is_active, "Discount toggled");
    Ok(Json(discount))
}

async fn add_discount(
    db: &Database,
    session: &Session,
    input: NewDiscount,
) -> Result<Discount, ApiError> {
    input.validate()?;

    // Links that don't match the scope are dropped rather than stored.
    let (product_ids, category_ids) = match input.scope {
        DiscountScope::Global => (Vec::new(), Vec::new()),
        DiscountScope::SingleProduct => (input.product_ids, Vec::new()),
        DiscountScope::Category => (Vec::new(), input.category_ids),
    };

    if !product_ids.is_empty() {
        let found = db
            .products()
            .count_existing(&session.tenant_id, &product_ids)
            .await?;
        if found != product_ids.len() {
            return Err(unknown_reference("productIds"));
        }
    }

    if !category_ids.is_empty() {
        let found = db
            .categories()
            .count_existing(&session.tenant_id, &category_ids)
            .await?;
        if found != category_ids.len() {
            return Err(unknown_reference("categoryIds"));
        }
    }

    debug!(
        products = product_ids.len(),
        categories = category_ids.len(),
        "Creating discount"
    );

    let discount = Discount {
        id: Uuid::new_v4().to_string(),
        tenant_id: session.tenant_id.clone(),
        name: input.name.trim().to_string(),
        scope: input.scope,
        discount_type: input.discount_type,
        application_method: input.application_method,
        value: input.value,
        minimum_quantity: input.minimum_quantity,
        valid_from: input.valid_from,
        valid_until: input.valid_until,
        is_active: true,
        created_at: Utc::now(),
    };

    let discount = db
        .discounts()
        .insert(&discount, &product_ids, &category_ids)
        .await?;
    info!(discount_id = %discount.id, scope = ?discount.scope, "Discount created");
    Ok(discount)
}

fn unknown_reference(field: &str) -> ApiError {
    ApiError::from(ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: "refers to an unknown record".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::{insert_product, session, test_state, TENANT};
    use crate::error::ErrorCode;

    fn product_input(code: &str) -> NewProduct {
        NewProduct {
            code: code.to_string(),
            name: "Agua mineral 500ml".to_string(),
            cost: 400,
            selling_price: 650,
            stock: 24,
            is_active: true,
            category_id: None,
            supplier_id: None,
        }
    }

    fn discount_input(scope: DiscountScope) -> NewDiscount {
        NewDiscount {
            name: "Promo".to_string(),
            scope,
            discount_type: DiscountType::Percentage,
            application_method: ApplicationMethod::ByProduct,
            value: 10,
            minimum_quantity: 1,
            valid_from: None,
            valid_until: None,
            product_ids: Vec::new(),
            category_ids: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_product() {
        let state = test_state().await;

        let product = add_product(&state.db, &session(), product_input(" AGU-001 "))
            .await
            .unwrap();
        assert_eq!(product.code, "AGU-001");
        assert_eq!(product.tenant_id, TENANT);

        let err = add_product(&state.db, &session(), product_input("AGU-001"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn test_product_validation_collects_fields() {
        let state = test_state().await;
        let mut input = product_input("bad code!");
        input.selling_price = -1;
        input.stock = -5;

        let err = add_product(&state.db, &session(), input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"code"));
        assert!(fields.contains(&"sellingPrice"));
        assert!(fields.contains(&"stock"));
        assert!(state.db.products().list(TENANT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_product_with_unknown_category_is_rejected() {
        let state = test_state().await;
        let mut input = product_input("AGU-002");
        input.category_id = Some(Uuid::new_v4().to_string());

        let err = add_product(&state.db, &session(), input).await.unwrap_err();
        assert_eq!(err.fields[0].field, "categoryId");
    }

    #[tokio::test]
    async fn test_product_supplier_must_exist() {
        let state = test_state().await;
        let supplier = Supplier {
            id: Uuid::new_v4().to_string(),
            tenant_id: TENANT.to_string(),
            name: "Distribuidora Sur".to_string(),
            contact: None,
            created_at: Utc::now(),
        };
        state.db.suppliers().insert(&supplier).await.unwrap();

        let mut input = product_input("AGU-003");
        input.supplier_id = Some(Uuid::new_v4().to_string());
        let err = add_product(&state.db, &session(), input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.fields[0].field, "supplierId");

        let mut input = product_input("AGU-003");
        input.supplier_id = Some(supplier.id.clone());
        let product = add_product(&state.db, &session(), input).await.unwrap();
        assert_eq!(product.supplier_id, Some(supplier.id));
    }

    #[tokio::test]
    async fn test_product_amounts_are_bounded() {
        let state = test_state().await;
        let mut input = product_input("AGU-004");
        input.selling_price = ventesca_core::MAX_PRICE + 1;
        input.stock = i64::MAX;

        let err = add_product(&state.db, &session(), input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"sellingPrice"));
        assert!(fields.contains(&"stock"));
    }

    #[tokio::test]
    async fn test_soft_deleted_product_leaves_the_list() {
        let state = test_state().await;
        let product = insert_product(&state.db, "X-1", 100, 1).await;

        state
            .db
            .products()
            .soft_delete(TENANT, &product.id)
            .await
            .unwrap();

        assert!(state.db.products().list(TENANT).await.unwrap().is_empty());
        assert!(state
            .db
            .products()
            .get_by_id(TENANT, &product.id)
            .await
            .unwrap()
            .is_none());
        assert_eq!(state.db.products().valuation(TENANT).await.unwrap().product_count, 0);
    }

    #[tokio::test]
    async fn test_discount_scope_decides_links() {
        let state = test_state().await;
        let product = insert_product(&state.db, "X-1", 1000, 5).await;

        let mut input = discount_input(DiscountScope::SingleProduct);
        input.product_ids = vec![product.id.clone()];
        add_discount(&state.db, &session(), input).await.unwrap();

        let discounts = state.db.discounts().for_product(&product).await.unwrap();
        assert_eq!(discounts.len(), 1);

        let err = add_discount(&state.db, &session(), discount_input(DiscountScope::Category))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.fields[0].field, "categoryIds");
    }

    #[tokio::test]
    async fn test_repeated_discount_targets_are_rejected() {
        let state = test_state().await;
        let product = insert_product(&state.db, "X-1", 1000, 5).await;

        let mut input = discount_input(DiscountScope::SingleProduct);
        input.product_ids = vec![product.id.clone(), product.id.clone()];

        let err = add_discount(&state.db, &session(), input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.fields[0].field, "productIds");
        assert!(state.db.discounts().list(TENANT).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deleted_product_is_not_a_discount_target() {
        let state = test_state().await;
        let live = insert_product(&state.db, "X-1", 1000, 5).await;
        let gone = insert_product(&state.db, "X-2", 1000, 5).await;
        state.db.products().soft_delete(TENANT, &gone.id).await.unwrap();

        let mut input = discount_input(DiscountScope::SingleProduct);
        input.product_ids = vec![live.id.clone(), gone.id.clone()];

        let err = add_discount(&state.db, &session(), input).await.unwrap_err();
        assert_eq!(err.fields[0].field, "productIds");
    }

    #[tokio::test]
    async fn test_discount_value_rules() {
        let state = test_state().await;

        let mut input = discount_input(DiscountScope::Global);
        input.value = 150;
        input.minimum_quantity = 0;

        let err = add_discount(&state.db, &session(), input).await.unwrap_err();
        let fields: Vec<&str> = err.fields.iter().map(|f| f.field.as_str()).collect();
        assert!(fields.contains(&"value"));
        assert!(fields.contains(&"minimumQuantity"));
    }

    #[tokio::test]
    async fn test_toggle_discount() {
        let state = test_state().await;
        let discount = add_discount(&state.db, &session(), discount_input(DiscountScope::Global))
            .await
            .unwrap();
        assert!(discount.is_active);

        let toggled = state
            .db
            .discounts()
            .toggle_active(TENANT, &discount.id)
            .await
            .unwrap();
        assert!(!toggled.is_active);
    }

    #[test]
    fn test_new_discount_defaults() {
        let input: NewDiscount = serde_json::from_str(
            r#"{
                "name": "Verano",
                "scope": "GLOBAL",
                "discountType": "PERCENTAGE",
                "applicationMethod": "TO_TOTAL",
                "value": 5
            }"#,
        )
        .unwrap();

        assert_eq!(input.minimum_quantity, 1);
        assert!(input.product_ids.is_empty());
        assert!(input.validate().is_ok());
    }
}
