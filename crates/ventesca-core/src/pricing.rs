//! # Line-Pricing Engine
//!
//! Computes the price and discount totals of one order line, and the
//! SELL / RETURN / PROMO type rules that decide which of them is charged.
//!
//! ## Calculation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Line Pricing                                         │
//! │                                                                         │
//! │  PricedLine { quantity, selling_price, discounts }                      │
//! │        │                                                                │
//! │        ├──► eligible_discounts(quantity)                                │
//! │        │      is_active && quantity >= minimum_quantity                 │
//! │        │                                                                │
//! │        ├──► total_discount = Σ discount_amount(d)   (all stack)         │
//! │        │      FIXED + BY_PRODUCT  → quantity × value                    │
//! │        │      FIXED + TO_TOTAL    → value                               │
//! │        │      PERCENTAGE          → quantity × price × value / 100      │
//! │        │                                                                │
//! │        └──► total_price                                                 │
//! │               base = selling_price × quantity                           │
//! │               SELL   →  |base|                                          │
//! │               RETURN → -|base|                                          │
//! │               PROMO  →  |base| - total_discount   (no clamp)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine never looks anything up. The caller assembles the discount set
//! (product discounts, category discounts and active GLOBAL discounts,
//! de-duplicated with [`merge_discounts`]).
//!
//! ## Usage
//! ```rust
//! use ventesca_core::money::Money;
//! use ventesca_core::pricing::{calculate_totals, PricedLine};
//! use ventesca_core::types::LineType;
//!
//! let line = PricedLine::new(3, Money::from_minor(1000), Vec::new());
//! let totals = calculate_totals(&line, LineType::Return);
//! assert_eq!(totals.total_price.minor(), -3000);
//! assert_eq!(totals.total_discount.minor(), 0);
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{ApplicationMethod, Discount, DiscountType, LineType, ProductOrder};

// =============================================================================
// Inputs & Outputs
// =============================================================================

/// Everything the engine needs to price one line.
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub quantity: i64,
    pub selling_price: Money,
    /// Candidate discounts; eligibility is decided here, not by the caller.
    pub discounts: Vec<Discount>,
}

impl PricedLine {
    pub fn new(quantity: i64, selling_price: Money, discounts: Vec<Discount>) -> Self {
        PricedLine {
            quantity,
            selling_price,
            discounts,
        }
    }

    /// `selling_price × quantity`, unsigned by line type.
    pub fn base(&self) -> Money {
        self.selling_price.multiply_quantity(self.quantity)
    }
}

/// Computed totals of one line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineTotals {
    pub total_price: Money,
    pub total_discount: Money,
}

// =============================================================================
// Eligibility
// =============================================================================

/// Whether `discount` applies to a line of `quantity` units.
///
/// Validity dates are not consulted.
#[inline]
pub fn is_eligible(discount: &Discount, quantity: i64) -> bool {
    discount.is_active && quantity >= discount.minimum_quantity
}

/// The discounts of `discounts` that apply at `quantity`.
pub fn eligible_discounts(discounts: &[Discount], quantity: i64) -> Vec<&Discount> {
    discounts
        .iter()
        .filter(|d| is_eligible(d, quantity))
        .collect()
}

/// Whether any discount applies at `quantity`.
pub fn has_eligible_discount(discounts: &[Discount], quantity: i64) -> bool {
    discounts.iter().any(|d| is_eligible(d, quantity))
}

/// Concatenates discount sets, keeping the first occurrence of each id.
///
/// A GLOBAL discount that is also linked to the product directly must only
/// be counted once.
pub fn merge_discounts<I>(sets: I) -> Vec<Discount>
where
    I: IntoIterator<Item = Vec<Discount>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for set in sets {
        for discount in set {
            if seen.insert(discount.id.clone()) {
                merged.push(discount);
            }
        }
    }

    merged
}

// =============================================================================
// Totals
// =============================================================================

/// The amount one discount takes off a line.
pub fn discount_amount(discount: &Discount, quantity: i64, selling_price: Money) -> Money {
    match (discount.discount_type, discount.application_method) {
        (DiscountType::Fixed, ApplicationMethod::ByProduct) => {
            Money::from_minor(discount.value).multiply_quantity(quantity)
        }
        (DiscountType::Fixed, ApplicationMethod::ToTotal) => Money::from_minor(discount.value),
        (DiscountType::Percentage, _) => selling_price
            .multiply_quantity(quantity)
            .percent(discount.value),
    }
}

/// Computes `total_price` and `total_discount` for a line of the given type.
///
/// `total_discount` is reported for every line type; only PROMO subtracts it.
///
/// ```rust
/// use chrono::Utc;
/// use ventesca_core::money::Money;
/// use ventesca_core::pricing::{calculate_totals, PricedLine};
/// use ventesca_core::types::*;
///
/// let ten_off = Discount {
///     id: "d1".into(),
///     tenant_id: "t".into(),
///     name: "10% off".into(),
///     scope: DiscountScope::Global,
///     discount_type: DiscountType::Percentage,
///     application_method: ApplicationMethod::ToTotal,
///     value: 10,
///     minimum_quantity: 1,
///     valid_from: None,
///     valid_until: None,
///     is_active: true,
///     created_at: Utc::now(),
/// };
/// let line = PricedLine::new(2, Money::from_minor(1000), vec![ten_off]);
///
/// let promo = calculate_totals(&line, LineType::Promo);
/// assert_eq!(promo.total_discount.minor(), 200);
/// assert_eq!(promo.total_price.minor(), 1800);
///
/// let sell = calculate_totals(&line, LineType::Sell);
/// assert_eq!(sell.total_price.minor(), 2000);
/// ```
pub fn calculate_totals(line: &PricedLine, line_type: LineType) -> LineTotals {
    let total_discount: Money = eligible_discounts(&line.discounts, line.quantity)
        .into_iter()
        .map(|d| discount_amount(d, line.quantity, line.selling_price))
        .sum();

    let base = line.base().abs();
    let total_price = match line_type {
        LineType::Sell => base,
        LineType::Return => -base,
        LineType::Promo => base - total_discount,
    };

    LineTotals {
        total_price,
        total_discount,
    }
}

// =============================================================================
// Line Type State Machine
// =============================================================================
//
//   current   eligible discount   no eligible discount
//   ───────   ─────────────────   ────────────────────
//   SELL      RETURN              RETURN
//   RETURN    PROMO               SELL
//   PROMO     SELL                RETURN

/// The type a line moves to when the cashier cycles it.
///
/// ```rust
/// use ventesca_core::pricing::next_line_type;
/// use ventesca_core::types::LineType;
///
/// assert_eq!(next_line_type(LineType::Sell, false), LineType::Return);
/// assert_eq!(next_line_type(LineType::Return, true), LineType::Promo);
/// assert_eq!(next_line_type(LineType::Return, false), LineType::Sell);
/// ```
pub fn next_line_type(current: LineType, has_eligible: bool) -> LineType {
    match current {
        LineType::Sell => LineType::Return,
        LineType::Return if has_eligible => LineType::Promo,
        LineType::Return => LineType::Sell,
        LineType::Promo if has_eligible => LineType::Sell,
        LineType::Promo => LineType::Return,
    }
}

/// Drops a PROMO line back to SELL once its discounts no longer apply.
///
/// Run after every quantity change and explicit type change.
pub fn reconcile_line_type(current: LineType, has_eligible: bool) -> LineType {
    match current {
        LineType::Promo if !has_eligible => LineType::Sell,
        other => other,
    }
}

// =============================================================================
// Order Summary
// =============================================================================

/// Totals of a whole order, for the current-order view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub line_count: usize,
    pub total_quantity: i64,
    /// Σ total_price (RETURN lines count negatively).
    pub total_price: Money,
    pub total_discount: Money,
}

impl From<&[ProductOrder]> for OrderSummary {
    fn from(lines: &[ProductOrder]) -> Self {
        OrderSummary {
            line_count: lines.len(),
            total_quantity: lines.iter().map(|l| l.quantity).sum(),
            total_price: lines.iter().map(|l| l.total_price()).sum(),
            total_discount: lines.iter().map(|l| l.total_discount()).sum(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiscountScope;
    use chrono::Utc;

    fn discount(
        id: &str,
        discount_type: DiscountType,
        method: ApplicationMethod,
        value: i64,
        minimum_quantity: i64,
    ) -> Discount {
        Discount {
            id: id.to_string(),
            tenant_id: "tenant".to_string(),
            name: format!("Discount {}", id),
            scope: DiscountScope::SingleProduct,
            discount_type,
            application_method: method,
            value,
            minimum_quantity,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn line(quantity: i64, price: i64, discounts: Vec<Discount>) -> PricedLine {
        PricedLine::new(quantity, Money::from_minor(price), discounts)
    }

    #[test]
    fn test_sell_line_is_positive_base() {
        let totals = calculate_totals(&line(3, 450, vec![]), LineType::Sell);
        assert_eq!(totals.total_price.minor(), 1350);
        assert_eq!(totals.total_discount.minor(), 0);
    }

    #[test]
    fn test_return_line_is_negative_base() {
        let d = discount("d", DiscountType::Fixed, ApplicationMethod::ToTotal, 100, 1);
        let totals = calculate_totals(&line(3, 450, vec![d]), LineType::Return);
        assert_eq!(totals.total_price.minor(), -1350);
        // discount is still reported, never charged
        assert_eq!(totals.total_discount.minor(), 100);
    }

    #[test]
    fn test_sell_and_return_ignore_discount() {
        let discounts = vec![
            discount("a", DiscountType::Percentage, ApplicationMethod::ToTotal, 25, 1),
            discount("b", DiscountType::Fixed, ApplicationMethod::ByProduct, 50, 1),
        ];
        for qty in [0, 1, 4, 17] {
            let l = line(qty, 799, discounts.clone());
            let base = 799 * qty;
            assert_eq!(calculate_totals(&l, LineType::Sell).total_price.minor(), base);
            assert_eq!(calculate_totals(&l, LineType::Return).total_price.minor(), -base);
        }
    }

    #[test]
    fn test_promo_subtracts_discount() {
        let discounts = vec![
            discount("a", DiscountType::Percentage, ApplicationMethod::ToTotal, 10, 1),
            discount("b", DiscountType::Fixed, ApplicationMethod::ByProduct, 20, 1),
        ];
        let l = line(5, 1000, discounts);
        let sell = calculate_totals(&l, LineType::Sell);
        let promo = calculate_totals(&l, LineType::Promo);

        // 10% of 5000 = 500, plus 5 × 20 = 100
        assert_eq!(promo.total_discount.minor(), 600);
        assert_eq!(promo.total_price, sell.total_price - promo.total_discount);
    }

    #[test]
    fn test_discount_total_ignores_evaluation_order() {
        let discounts = vec![
            discount("a", DiscountType::Percentage, ApplicationMethod::ToTotal, 15, 1),
            discount("b", DiscountType::Fixed, ApplicationMethod::ByProduct, 35, 1),
            discount("c", DiscountType::Percentage, ApplicationMethod::ByProduct, 7, 2),
            discount("d", DiscountType::Fixed, ApplicationMethod::ToTotal, 120, 1),
            discount("e", DiscountType::Fixed, ApplicationMethod::ByProduct, 10, 9),
        ];
        let expected = calculate_totals(&line(3, 333, discounts.clone()), LineType::Promo);
        // 15% of 999 = 149.85 → 150, 3 × 35, 7% of 999 = 69.93 → 70, 120; e not eligible
        assert_eq!(expected.total_discount.minor(), 150 + 105 + 70 + 120);

        let mut reversed = discounts.clone();
        reversed.reverse();
        let mut orders = vec![reversed];
        for shift in 1..discounts.len() {
            let mut rotated = discounts.clone();
            rotated.rotate_left(shift);
            orders.push(rotated);
        }
        let mut swapped = discounts.clone();
        swapped.swap(0, 3);
        swapped.swap(1, 4);
        orders.push(swapped);

        for order in orders {
            let totals = calculate_totals(&line(3, 333, order), LineType::Promo);
            assert_eq!(totals, expected);
        }
    }

    #[test]
    fn test_fixed_to_total_and_by_product() {
        let to_total = discount("t", DiscountType::Fixed, ApplicationMethod::ToTotal, 300, 1);
        let by_product = discount("p", DiscountType::Fixed, ApplicationMethod::ByProduct, 300, 1);

        let totals = calculate_totals(&line(4, 1000, vec![to_total]), LineType::Promo);
        assert_eq!(totals.total_discount.minor(), 300);

        let totals = calculate_totals(&line(4, 1000, vec![by_product]), LineType::Promo);
        assert_eq!(totals.total_discount.minor(), 1200);
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        // 3 × 333 = 999, 15% = 149.85 → 150
        let d = discount("p", DiscountType::Percentage, ApplicationMethod::ByProduct, 15, 1);
        let totals = calculate_totals(&line(3, 333, vec![d]), LineType::Promo);
        assert_eq!(totals.total_discount.minor(), 150);
        assert_eq!(totals.total_price.minor(), 849);
    }

    #[test]
    fn test_promo_may_go_negative() {
        let d = discount("big", DiscountType::Fixed, ApplicationMethod::ToTotal, 5000, 1);
        let totals = calculate_totals(&line(1, 1000, vec![d]), LineType::Promo);
        assert_eq!(totals.total_price.minor(), -4000);
    }

    #[test]
    fn test_minimum_quantity_gates_discount() {
        let d = discount("m", DiscountType::Fixed, ApplicationMethod::ToTotal, 100, 3);
        assert_eq!(
            calculate_totals(&line(2, 500, vec![d.clone()]), LineType::Promo).total_discount,
            Money::zero()
        );
        assert_eq!(
            calculate_totals(&line(3, 500, vec![d]), LineType::Promo)
                .total_discount
                .minor(),
            100
        );
    }

    #[test]
    fn test_inactive_discount_is_not_eligible() {
        let mut d = discount("x", DiscountType::Fixed, ApplicationMethod::ToTotal, 100, 1);
        d.is_active = false;
        assert!(!is_eligible(&d, 10));
        assert!(!has_eligible_discount(&[d], 10));
    }

    #[test]
    fn test_expired_discount_still_applies() {
        let mut d = discount("old", DiscountType::Fixed, ApplicationMethod::ToTotal, 100, 1);
        d.valid_until = Some(Utc::now() - chrono::Duration::days(30));
        assert!(is_eligible(&d, 1));
    }

    #[test]
    fn test_next_line_type_cycle() {
        assert_eq!(next_line_type(LineType::Sell, true), LineType::Return);
        assert_eq!(next_line_type(LineType::Sell, false), LineType::Return);
        assert_eq!(next_line_type(LineType::Return, true), LineType::Promo);
        assert_eq!(next_line_type(LineType::Return, false), LineType::Sell);
        assert_eq!(next_line_type(LineType::Promo, true), LineType::Sell);
        assert_eq!(next_line_type(LineType::Promo, false), LineType::Return);
    }

    #[test]
    fn test_cycle_without_discount_never_reaches_promo() {
        let mut current = LineType::Sell;
        for _ in 0..10 {
            current = next_line_type(current, false);
            assert_ne!(current, LineType::Promo);
        }
    }

    #[test]
    fn test_reconcile_line_type() {
        assert_eq!(reconcile_line_type(LineType::Promo, false), LineType::Sell);
        assert_eq!(reconcile_line_type(LineType::Promo, true), LineType::Promo);
        assert_eq!(reconcile_line_type(LineType::Return, false), LineType::Return);
        assert_eq!(reconcile_line_type(LineType::Sell, false), LineType::Sell);
    }

    #[test]
    fn test_merge_discounts_dedupes_by_id() {
        let a = discount("a", DiscountType::Fixed, ApplicationMethod::ToTotal, 100, 1);
        let b = discount("b", DiscountType::Fixed, ApplicationMethod::ToTotal, 200, 1);

        let merged = merge_discounts(vec![vec![a.clone(), b.clone()], vec![a.clone()]]);
        assert_eq!(merged.len(), 2);

        let totals = calculate_totals(&line(1, 1000, merged), LineType::Promo);
        assert_eq!(totals.total_discount.minor(), 300);
    }

    #[test]
    fn test_order_summary() {
        let now = Utc::now();
        let make = |qty: i64, price: i64, discount: i64| ProductOrder {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: "o".to_string(),
            product_id: "p".to_string(),
            quantity: qty,
            line_type: LineType::Sell,
            total_price: price,
            total_discount: discount,
            created_at: now,
            updated_at: now,
        };
        let lines = vec![make(2, 2000, 0), make(1, -500, 0), make(3, 2700, 300)];

        let summary = OrderSummary::from(lines.as_slice());
        assert_eq!(summary.line_count, 3);
        assert_eq!(summary.total_quantity, 6);
        assert_eq!(summary.total_price.minor(), 4200);
        assert_eq!(summary.total_discount.minor(), 300);
    }
}
