//! # Bulk Price Modification
//!
//! The arithmetic and lifecycle rules of a bulk repricing. Persistence and
//! the execute/revert transactions live in `ventesca-db`.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Bulk Price Modification Lifecycle                      │
//! │                                                                         │
//! │   setup ──► ┌─────────┐  execute  ┌──────────┐  revert  ┌──────────┐   │
//! │             │ PENDING │──────────►│ EXECUTED │─────────►│ REVERTED │   │
//! │             └────┬────┘           └──────────┘          └──────────┘   │
//! │                  │ cancel                                 (terminal)    │
//! │                  ▼                                                      │
//! │              (deleted)                                                  │
//! │                                                                         │
//! │  PENDING   new prices staged as PriceModification rows                  │
//! │  EXECUTED  prices written, snapshot captured, rows APPLIED              │
//! │  REVERTED  snapshot prices written back through REVERSAL rows           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ventesca_core::bulk::compute_new_price;
//! use ventesca_core::money::Money;
//! use ventesca_core::types::{BulkDirection, BulkStrategy};
//!
//! // 199 + round(19.9) = 219 → nearest 10 → 220
//! let new_price = compute_new_price(
//!     Money::from_minor(199),
//!     BulkStrategy::Percentage,
//!     BulkDirection::Increase,
//!     10,
//! )?;
//! assert_eq!(new_price.minor(), 220);
//! # Ok::<(), ventesca_core::CoreError>(())
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{
    BulkDirection, BulkScope, BulkStatus, BulkStrategy, InventoryValuation, PriceModification,
};
use crate::validation::{validate_adjustment_value, validate_bulk_scope, ValidationResult};
use crate::MAX_PRICE;

/// PERCENTAGE results are rounded to a multiple of this many minor units.
pub const PERCENTAGE_ROUNDING_STEP: i64 = 10;

// =============================================================================
// Setup Request
// =============================================================================

/// What an administrator configures before staging a bulk modification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BulkSetup {
    pub scope: BulkScope,
    /// Required for CATEGORY scope, ignored for INVENTORY.
    #[serde(default)]
    pub category_ids: Vec<String>,
    pub strategy: BulkStrategy,
    pub direction: BulkDirection,
    pub adjustment_value: i64,
    #[serde(default)]
    pub reason: Option<String>,
}

impl BulkSetup {
    /// Collects every field failure of the request.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = validate_bulk_scope(self.scope, &self.category_ids);
        errors.check(validate_adjustment_value(self.strategy, self.adjustment_value));
        if let Some(reason) = &self.reason {
            errors.check(validate_reason(reason));
        }
        errors.into_result()
    }

    /// Category ids that take part in scope selection.
    pub fn scoped_category_ids(&self) -> &[String] {
        match self.scope {
            BulkScope::Inventory => &[],
            BulkScope::Category => &self.category_ids,
        }
    }
}

fn validate_reason(reason: &str) -> ValidationResult<()> {
    if reason.len() > 500 {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: 500,
        });
    }
    Ok(())
}

// =============================================================================
// Price Arithmetic
// =============================================================================

/// The price a product moves to under a bulk adjustment.
///
/// ## Rules
/// - FIXED_AMOUNT: `change = adjustment`
/// - PERCENTAGE: `change = round_half_up(old × adjustment / 100)`
/// - INCREASE: `old + change`; DECREASE: `max(0, old − change)`
/// - PERCENTAGE results are then rounded to the nearest multiple of 10
///
/// Fails with a validation error on `adjustmentValue` when the new price
/// would exceed [`MAX_PRICE`].
pub fn compute_new_price(
    old_price: Money,
    strategy: BulkStrategy,
    direction: BulkDirection,
    adjustment: i64,
) -> CoreResult<Money> {
    let change = match strategy {
        BulkStrategy::FixedAmount => Some(Money::from_minor(adjustment)),
        BulkStrategy::Percentage => old_price.checked_percent(adjustment),
    };

    let raw = change.and_then(|change| match direction {
        BulkDirection::Increase => old_price.checked_add(change),
        BulkDirection::Decrease => old_price.checked_sub(change).map(|p| p.floor_zero()),
    });

    let new_price = match strategy {
        BulkStrategy::Percentage => raw.map(|p| p.round_to_nearest(PERCENTAGE_ROUNDING_STEP)),
        BulkStrategy::FixedAmount => raw,
    };

    match new_price {
        Some(price) if price.minor() <= MAX_PRICE => Ok(price),
        _ => Err(CoreError::Validation(
            ValidationError::InvalidFormat {
                field: "adjustmentValue".to_string(),
                reason: format!(
                    "would move a price of {} above the maximum of {}",
                    old_price.minor(),
                    MAX_PRICE
                ),
            }
            .into(),
        )),
    }
}

// =============================================================================
// Status Transitions
// =============================================================================

impl BulkStatus {
    /// Whether a modification in this status may move to `to`.
    ///
    /// Cancelling is a deletion rather than a transition, see
    /// [`BulkStatus::can_cancel`].
    pub fn can_transition_to(self, to: BulkStatus) -> bool {
        matches!(
            (self, to),
            (BulkStatus::Pending, BulkStatus::Executed) | (BulkStatus::Executed, BulkStatus::Reverted)
        )
    }

    /// Fails with [`CoreError::InvalidBulkTransition`] unless the move is allowed.
    ///
    /// ```rust
    /// use ventesca_core::types::BulkStatus;
    ///
    /// assert!(BulkStatus::Pending.ensure_transition(BulkStatus::Executed).is_ok());
    /// assert!(BulkStatus::Reverted.ensure_transition(BulkStatus::Executed).is_err());
    /// ```
    pub fn ensure_transition(self, to: BulkStatus) -> CoreResult<()> {
        if self.can_transition_to(to) {
            Ok(())
        } else {
            Err(CoreError::InvalidBulkTransition { from: self, to })
        }
    }

    /// Only staged modifications can be discarded.
    pub fn can_cancel(self) -> bool {
        self == BulkStatus::Pending
    }

    pub fn is_terminal(self) -> bool {
        self == BulkStatus::Reverted
    }
}

// =============================================================================
// Financial Projection
// =============================================================================

/// A staged row paired with the stock of its product, input to [`project`].
#[derive(Debug, Clone, Copy)]
pub struct StagedChange {
    pub old_price: Money,
    pub new_price: Money,
    pub stock: i64,
}

impl StagedChange {
    pub fn from_row(row: &PriceModification, stock: i64) -> Self {
        StagedChange {
            old_price: Money::from_minor(row.old_price),
            new_price: Money::from_minor(row.new_price),
            stock,
        }
    }
}

/// Preview of inventory value after a staged modification executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct BulkProjection {
    /// Σ |new − old| × stock.
    pub delta: Money,
    pub current_total_selling_value: Money,
    pub new_total_selling_value: Money,
    pub current_potential_profit: Money,
    pub new_potential_profit: Money,
}

/// Projects the inventory totals after the staged rows are applied.
///
/// The delta is added for INCREASE and subtracted for DECREASE. It is
/// computed from absolute differences, so a row floored at zero still moves
/// the totals in the modification's direction.
pub fn project(
    changes: &[StagedChange],
    direction: BulkDirection,
    current: &InventoryValuation,
) -> BulkProjection {
    let delta: Money = changes
        .iter()
        .map(|c| (c.new_price - c.old_price).abs().multiply_quantity(c.stock))
        .sum();

    let signed = match direction {
        BulkDirection::Increase => delta,
        BulkDirection::Decrease => -delta,
    };

    let current_selling = Money::from_minor(current.total_selling_value);
    let current_profit = Money::from_minor(current.potential_profit);

    BulkProjection {
        delta,
        current_total_selling_value: current_selling,
        new_total_selling_value: current_selling + signed,
        current_potential_profit: current_profit,
        new_potential_profit: current_profit + signed,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
