//! # Commands Module
//!
//! Every operation the web client can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs      ◄─── You are here (shared status type)
//! ├── order.rs    ◄─── Current order + order-line intents
//! ├── bulk.rs     ◄─── Bulk price modification intents
//! ├── catalog.rs  ◄─── Categories, suppliers, products, discounts
//! └── report.rs   ◄─── Inventory valuation
//! ```
//!
//! ## How Intents Work
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Intent Dispatch                                      │
//! │                                                                         │
//! │  POST /api/orders/current                                               │
//! │  { "intent": "change-po-quantity", "lineId": "...", "quantity": 3 }     │
//! │         │                                                               │
//! │         │ serde (tag = "intent")                                        │
//! │         ▼                                                               │
//! │  OrderIntent::ChangePoQuantity { line_id, quantity }                    │
//! │         │                                                               │
//! │         │ order::dispatch(db, session, intent)                          │
//! │         ▼                                                               │
//! │  IntentOutcome { status: "over", message, line, summary }               │
//! │                                                                         │
//! │  Unknown intents and malformed payloads never reach dispatch:           │
//! │  the JSON rejection becomes a 400 VALIDATION_ERROR.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub mod bulk;
pub mod catalog;
pub mod order;
pub mod report;

/// Outcome of an intent that the cashier is expected to react to.
///
/// Only `success` and `zero-stock` mean the mutation happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum IntentStatus {
    Success,
    /// Rejected: the quantity would drop below one.
    Error,
    /// Rejected: more units than in stock.
    Over,
    /// No product with the scanned code.
    NotFound,
    /// The product exists but is not for sale.
    Inactive,
    /// Added anyway; the product has no stock.
    ZeroStock,
}

impl IntentStatus {
    pub fn is_applied(self) -> bool {
        matches!(self, IntentStatus::Success | IntentStatus::ZeroStock)
    }
}

/// Fixtures shared by the command tests.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use uuid::Uuid;
    use ventesca_core::{ApplicationMethod, Discount, DiscountScope, DiscountType, Product};
    use ventesca_db::{Database, DbConfig};

    use crate::config::ServerConfig;
    use crate::session::Session;
    use crate::state::AppState;

    pub const TENANT: &str = "00000000-0000-0000-0000-0000000000aa";
    pub const SELLER: &str = "00000000-0000-0000-0000-0000000000bb";

    pub async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(db, ServerConfig::default())
    }

    pub fn session() -> Session {
        Session {
            tenant_id: TENANT.to_string(),
            user_id: SELLER.to_string(),
        }
    }

    pub fn new_product(code: &str, price: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            tenant_id: TENANT.to_string(),
            code: code.to_string(),
            name: format!("Product {}", code),
            cost: price / 2,
            selling_price: price,
            stock,
            is_active: true,
            is_deleted: false,
            category_id: None,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub async fn insert_product(db: &Database, code: &str, price: i64, stock: i64) -> Product {
        db.products()
            .insert(&new_product(code, price, stock))
            .await
            .unwrap()
    }

    /// A product-level FIXED discount linked to `product`.
    pub async fn insert_product_discount(
        db: &Database,
        product: &Product,
        method: ApplicationMethod,
        value: i64,
        minimum_quantity: i64,
    ) -> Discount {
        let discount = Discount {
            id: Uuid::new_v4().to_string(),
            tenant_id: TENANT.to_string(),
            name: format!("{:?} {}", method, value),
            scope: DiscountScope::SingleProduct,
            discount_type: DiscountType::Fixed,
            application_method: method,
            value,
            minimum_quantity,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: Utc::now(),
        };
        db.discounts()
            .insert(&discount, &[product.id.clone()], &[])
            .await
            .unwrap()
    }
}
