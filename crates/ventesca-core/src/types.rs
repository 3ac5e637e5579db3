//! # Domain Types
//!
//! Core domain types used throughout Ventesca.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Catalog               Point of sale            Bulk repricing          │
//! │  ─────────────         ──────────────           ────────────────────    │
//! │  Category              Order                    BulkPriceModification   │
//! │  Supplier              ProductOrder (line)      PriceModification       │
//! │  Product               LineType                 PriceModificationSnapshot│
//! │  Discount                                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money Fields
//! Amount columns are stored as raw `i64` minor units (what the database
//! holds) and exposed as [`Money`] through accessor methods.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Catalog
// =============================================================================

/// A product category (also the unit of CATEGORY-scoped discounts and bulk changes).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub contact: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Tenant this product belongs to.
    pub tenant_id: String,

    /// Business code scanned at the register, unique per tenant.
    pub code: String,

    /// Display name shown to the cashier.
    pub name: String,

    /// Purchase cost in minor units.
    pub cost: i64,

    /// Selling price in minor units.
    pub selling_price: i64,

    /// Units on hand.
    pub stock: i64,

    /// Inactive products cannot be added to an order.
    pub is_active: bool,

    /// Soft delete flag; deleted products are never physically removed.
    pub is_deleted: bool,

    pub category_id: Option<String>,

    pub supplier_id: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn selling_price(&self) -> Money {
        Money::from_minor(self.selling_price)
    }

    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_minor(self.cost)
    }

    /// Whether `quantity` units fit in the current stock.
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }
}

// =============================================================================
// Discounts
// =============================================================================

/// Which products a discount reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountScope {
    /// Every product of the tenant.
    Global,
    /// Products of the linked categories.
    Category,
    /// The linked products only.
    SingleProduct,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// `value` is an amount in minor units.
    Fixed,
    /// `value` is a whole percent of the line's base price.
    Percentage,
}

/// How a FIXED discount is charged against a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationMethod {
    /// Flat amount, once per line.
    ToTotal,
    /// Amount per unit.
    ByProduct,
}

/// A discount definition.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Discount {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub scope: DiscountScope,
    pub discount_type: DiscountType,
    pub application_method: ApplicationMethod,
    /// Minor units for FIXED, whole percent for PERCENTAGE.
    pub value: i64,
    pub minimum_quantity: i64,
    /// Stored for reference; not checked when pricing a line.
    #[ts(as = "Option<String>")]
    pub valid_from: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Orders
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Being built at the register.
    Pending,
    Completed,
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// An order owned by one seller; only PENDING orders are edited.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub tenant_id: String,
    pub seller_id: String,
    pub status: OrderStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// The intent of an order line. Only PROMO applies its discount to the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineType {
    Sell,
    Return,
    Promo,
}

impl Default for LineType {
    fn default() -> Self {
        LineType::Sell
    }
}

/// One product entry of an order (a "line").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductOrder {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub line_type: LineType,
    /// Signed: negative for RETURN lines.
    pub total_price: i64,
    pub total_discount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl ProductOrder {
    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_minor(self.total_price)
    }

    #[inline]
    pub fn total_discount(&self) -> Money {
        Money::from_minor(self.total_discount)
    }
}

// =============================================================================
// Bulk Price Modification
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkScope {
    /// Every non-deleted product of the tenant.
    Inventory,
    /// Products of the selected categories.
    Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkStrategy {
    Percentage,
    FixedAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkDirection {
    Increase,
    Decrease,
}

/// Lifecycle of a bulk modification. REVERTED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkStatus {
    Pending,
    Executed,
    Reverted,
}

/// A staged, executed or reverted repricing across many products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BulkPriceModification {
    pub id: String,
    pub tenant_id: String,
    pub scope: BulkScope,
    /// Selected categories for CATEGORY scope; loaded from the link table.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub category_ids: Vec<String>,
    pub strategy: BulkStrategy,
    pub direction: BulkDirection,
    pub adjustment_value: i64,
    pub affected_products_count: i64,
    pub status: BulkStatus,
    pub reason: Option<String>,
    pub created_by: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub executed_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub executed_at: Option<DateTime<Utc>>,
    pub reverted_by: Option<String>,
    #[ts(as = "Option<String>")]
    pub reverted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceModificationStatus {
    Pending,
    Applied,
}

/// Whether a row records the staged change or its undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriceModificationKind {
    Adjustment,
    Reversal,
}

/// One product's line of a bulk change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceModification {
    pub id: String,
    pub bulk_modification_id: String,
    pub product_id: String,
    pub old_price: i64,
    pub new_price: i64,
    pub status: PriceModificationStatus,
    pub kind: PriceModificationKind,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl PriceModification {
    /// Absolute per-unit price movement.
    pub fn delta(&self) -> Money {
        (Money::from_minor(self.new_price) - Money::from_minor(self.old_price)).abs()
    }
}

/// Pre-execution state of one product, captured when a bulk change executes.
///
/// Display fields are denormalised so the history survives product renames
/// and deletions.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PriceModificationSnapshot {
    pub id: String,
    pub bulk_modification_id: String,
    pub price_modification_id: String,
    pub product_id: String,
    pub product_code: String,
    pub product_name: String,
    pub category_name: Option<String>,
    pub old_price: i64,
    pub new_price: i64,
    #[ts(as = "String")]
    pub captured_at: DateTime<Utc>,
}

// =============================================================================
// Reporting
// =============================================================================

/// Inventory-wide totals over non-deleted products.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventoryValuation {
    pub product_count: i64,
    pub total_units: i64,
    /// Σ selling_price × stock.
    pub total_selling_value: i64,
    /// Σ cost × stock.
    pub total_cost_value: i64,
    /// Σ (selling_price − cost) × stock.
    pub potential_profit: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
