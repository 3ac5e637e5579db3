//! # Order Commands
//!
//! The seller's current order and the intents that edit its lines.
//!
//! ## Line Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Order Line Lifecycle                                 │
//! │                                                                         │
//! │  add-product {code} ──► line (qty 1, SELL) or existing line qty + 1     │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  increase / decrease / change quantity ─┐                               │
//! │  change type / cycle type ──────────────┤                               │
//! │                                         ▼                               │
//! │                         reprice: candidate discounts                    │
//! │                                  → reconcile type (PROMO → SELL when    │
//! │                                    nothing is eligible)                 │
//! │                                  → calculate_totals                     │
//! │                                  → persist                              │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  delete-po ──► line removed                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every intent resolves the caller's PENDING order first; the pricing engine
//! itself never looks anything up.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use ts_rs::TS;

use crate::commands::IntentStatus;
use crate::error::ApiError;
use crate::session::Session;
use crate::state::AppState;
use ventesca_core::pricing::{
    calculate_totals, has_eligible_discount, next_line_type, reconcile_line_type, OrderSummary,
    PricedLine,
};
use ventesca_core::validation::{validate_code, validate_line_quantity, validate_uuid};
use ventesca_core::{LineType, Order, Product, ProductOrder};
use ventesca_db::repository::order::generate_line_id;
use ventesca_db::Database;

// =============================================================================
// Wire Types
// =============================================================================

/// An edit of the current order.
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "intent", rename_all = "kebab-case")]
pub enum OrderIntent {
    IncreasePoQuantity {
        #[serde(rename = "lineId")]
        line_id: String,
    },
    DecreasePoQuantity {
        #[serde(rename = "lineId")]
        line_id: String,
    },
    ChangePoQuantity {
        #[serde(rename = "lineId")]
        line_id: String,
        quantity: i64,
    },
    DeletePo {
        #[serde(rename = "lineId")]
        line_id: String,
    },
    ChangePoType {
        #[serde(rename = "lineId")]
        line_id: String,
        #[serde(rename = "lineType")]
        line_type: LineType,
    },
    CyclePoType {
        #[serde(rename = "lineId")]
        line_id: String,
    },
    AddProduct {
        code: String,
    },
}

/// Result of an order intent.
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct IntentOutcome {
    pub status: IntentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The line as stored after the intent (unchanged when rejected).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<ProductOrder>,
    pub summary: OrderSummary,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CurrentOrderView {
    pub order: Order,
    pub lines: Vec<ProductOrder>,
    pub summary: OrderSummary,
}

// =============================================================================
// Handlers
// =============================================================================

/// `GET /api/orders/current`: opens the seller's order if needed.
pub async fn get_current_order(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<CurrentOrderView>, ApiError> {
    let order = state
        .db
        .orders()
        .open_current(&session.tenant_id, &session.user_id)
        .await?;

    let lines = state.db.orders().list_lines(&order.id).await?;
    let summary = OrderSummary::from(lines.as_slice());

    Ok(Json(CurrentOrderView {
        order,
        lines,
        summary,
    }))
}

/// `POST /api/orders/current`
pub async fn post_order_intent(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Json<OrderIntent>, JsonRejection>,
) -> Result<Json<IntentOutcome>, ApiError> {
    let Json(intent) = payload?;
    let outcome = dispatch(&state.db, &session, intent).await?;
    Ok(Json(outcome))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Applies one intent to the caller's current order.
///
/// ## Returns
/// * `Ok(outcome)` - applied, or rejected by a business rule (see `status`)
/// * `Err(ApiError)` - validation failure, no current order, missing line
pub async fn dispatch(
    db: &Database,
    session: &Session,
    intent: OrderIntent,
) -> Result<IntentOutcome, ApiError> {
    debug!(intent = ?intent, seller = %session.user_id, "Dispatching order intent");

    let order = require_current_order(db, session).await?;

    let (status, message, line) = match intent {
        OrderIntent::IncreasePoQuantity { line_id } => {
            let (mut line, product) = load_line(db, session, &order, &line_id).await?;
            line.quantity += 1;
            reprice(db, &product, &mut line, reconcile_line_type).await?;
            db.orders().update_line(&line).await?;
            (IntentStatus::Success, None, Some(line))
        }

        OrderIntent::DecreasePoQuantity { line_id } => {
            let (mut line, product) = load_line(db, session, &order, &line_id).await?;
            if line.quantity - 1 < 1 {
                warn!(line_id = %line.id, quantity = line.quantity, "Decrease rejected");
                (
                    IntentStatus::Error,
                    Some("Quantity cannot be decreased any further".to_string()),
                    Some(line),
                )
            } else {
                line.quantity -= 1;
                reprice(db, &product, &mut line, reconcile_line_type).await?;
                db.orders().update_line(&line).await?;
                (IntentStatus::Success, None, Some(line))
            }
        }

        OrderIntent::ChangePoQuantity { line_id, quantity } => {
            validate_line_quantity(quantity)?;
            let (mut line, product) = load_line(db, session, &order, &line_id).await?;
            if !product.has_stock_for(quantity) {
                warn!(
                    line_id = %line.id,
                    requested = quantity,
                    stock = product.stock,
                    "Quantity over stock"
                );
                (
                    IntentStatus::Over,
                    Some(format!(
                        "Only {} unit(s) of {} in stock",
                        product.stock, product.name
                    )),
                    Some(line),
                )
            } else {
                line.quantity = quantity;
                reprice(db, &product, &mut line, reconcile_line_type).await?;
                db.orders().update_line(&line).await?;
                (IntentStatus::Success, None, Some(line))
            }
        }

        OrderIntent::DeletePo { line_id } => {
            validate_uuid("lineId", &line_id)?;
            db.orders().delete_line(&order.id, &line_id).await?;
            (IntentStatus::Success, None, None)
        }

        OrderIntent::ChangePoType { line_id, line_type } => {
            let (mut line, product) = load_line(db, session, &order, &line_id).await?;
            line.line_type = line_type;
            reprice(db, &product, &mut line, reconcile_line_type).await?;
            db.orders().update_line(&line).await?;
            (IntentStatus::Success, None, Some(line))
        }

        OrderIntent::CyclePoType { line_id } => {
            let (mut line, product) = load_line(db, session, &order, &line_id).await?;
            reprice(db, &product, &mut line, next_line_type).await?;
            db.orders().update_line(&line).await?;
            (IntentStatus::Success, None, Some(line))
        }

        OrderIntent::AddProduct { code } => add_product(db, session, &order, code.trim()).await?,
    };

    let lines = db.orders().list_lines(&order.id).await?;

    Ok(IntentOutcome {
        status,
        message,
        line,
        summary: OrderSummary::from(lines.as_slice()),
    })
}

type Applied = (IntentStatus, Option<String>, Option<ProductOrder>);

async fn add_product(
    db: &Database,
    session: &Session,
    order: &Order,
    code: &str,
) -> Result<Applied, ApiError> {
    validate_code(code)?;

    let Some(product) = db.products().get_by_code(&session.tenant_id, code).await? else {
        warn!(code = %code, "Scanned code not found");
        return Ok((
            IntentStatus::NotFound,
            Some(format!("No product with code {}", code)),
            None,
        ));
    };

    if !product.is_active {
        warn!(code = %code, "Scanned product is inactive");
        return Ok((
            IntentStatus::Inactive,
            Some(format!("{} is not available for sale", product.name)),
            None,
        ));
    }

    let line = match db.orders().find_line_by_product(&order.id, &product.id).await? {
        Some(mut line) => {
            line.quantity += 1;
            reprice(db, &product, &mut line, reconcile_line_type).await?;
            db.orders().update_line(&line).await?;
            line
        }
        None => {
            let now = Utc::now();
            let mut line = ProductOrder {
                id: generate_line_id(),
                order_id: order.id.clone(),
                product_id: product.id.clone(),
                quantity: 1,
                line_type: LineType::Sell,
                total_price: 0,
                total_discount: 0,
                created_at: now,
                updated_at: now,
            };
            reprice(db, &product, &mut line, reconcile_line_type).await?;
            db.orders().insert_line(&line).await?
        }
    };

    info!(order_id = %order.id, code = %code, quantity = line.quantity, "Product added to order");

    if product.stock <= 0 {
        return Ok((
            IntentStatus::ZeroStock,
            Some(format!("{} has no stock left", product.name)),
            Some(line),
        ));
    }

    Ok((IntentStatus::Success, None, Some(line)))
}

// =============================================================================
// Helpers
// =============================================================================

async fn require_current_order(db: &Database, session: &Session) -> Result<Order, ApiError> {
    db.orders()
        .find_current(&session.tenant_id, &session.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Pending order for seller", &session.user_id))
}

/// A line of the current order together with its product.
async fn load_line(
    db: &Database,
    session: &Session,
    order: &Order,
    line_id: &str,
) -> Result<(ProductOrder, Product), ApiError> {
    validate_uuid("lineId", line_id)?;

    let line = db
        .orders()
        .get_line(&order.id, line_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Order line", line_id))?;

    let product = db
        .products()
        .get_by_id(&session.tenant_id, &line.product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &line.product_id))?;

    Ok((line, product))
}

/// Picks the line type with `retype`, then recomputes the totals.
async fn reprice(
    db: &Database,
    product: &Product,
    line: &mut ProductOrder,
    retype: fn(LineType, bool) -> LineType,
) -> Result<(), ApiError> {
    let discounts = db.discounts().for_product(product).await?;
    let eligible = has_eligible_discount(&discounts, line.quantity);

    line.line_type = retype(line.line_type, eligible);

    let priced = PricedLine::new(line.quantity, product.selling_price(), discounts);
    let totals = calculate_totals(&priced, line.line_type);

    line.total_price = totals.total_price.minor();
    line.total_discount = totals.total_discount.minor();
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
