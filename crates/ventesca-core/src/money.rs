//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  A 10% bulk increase on 199 computed in floats:                         │
//! │    199 * 1.1 = 218.90000000000003  ❌                                   │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units with explicit rounding               │
//! │    change = round_half_up(199 * 10 / 100) = 20                          │
//! │    new    = 199 + 20 = 219 → nearest 10 → 220                           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every price, discount and order total in Ventesca is a whole number of the
//! currency's smallest unit. Rounding only ever happens in [`Money::percent`]
//! and [`Money::round_to_nearest`], both half-up.
//!
//! ## Usage
//! ```rust
//! use ventesca_core::money::Money;
//!
//! let price = Money::from_minor(1990);
//! let line = price.multiply_quantity(3);
//! assert_eq!(line.minor(), 5970);
//!
//! // 15% of 5970 = 895.5 → 896 (half-up)
//! assert_eq!(line.percent(15).minor(), 896);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: RETURN lines carry negative totals, PROMO lines may
///   be discounted below zero
/// - **Single field tuple struct**: Zero-cost abstraction over i64
///
/// ## Where Money Flows
/// ```text
/// Product.selling_price ──► PricedLine ──► LineTotals.total_price
///                                     └──► LineTotals.total_discount
///
/// PriceModification.old_price ──► bulk::compute_new_price ──► new_price
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use ventesca_core::money::Money;
    ///
    /// let price = Money::from_minor(1099);
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    ///
    /// ```rust
    /// use ventesca_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(-550).abs().minor(), 550);
    /// ```
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    ///
    /// Validated prices and quantities never reach the bounds.
    ///
    /// ```rust
    /// use ventesca_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(299);
    /// assert_eq!(unit_price.multiply_quantity(3).minor(), 897);
    /// assert_eq!(unit_price.multiply_quantity(i64::MAX).minor(), i64::MAX);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Money> {
        match self.0.checked_add(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Subtracts `other`, or `None` on overflow.
    #[inline]
    pub const fn checked_sub(&self, other: Money) -> Option<Money> {
        match self.0.checked_sub(other.0) {
            Some(v) => Some(Money(v)),
            None => None,
        }
    }

    /// Returns `pct` percent of this amount, rounded half-up to the minor unit.
    ///
    /// Halves round away from zero, so the result for a negative amount is
    /// the mirror of the positive one.
    ///
    /// ```rust
    /// use ventesca_core::money::Money;
    ///
    /// // 199 * 10 / 100 = 19.9 → 20
    /// assert_eq!(Money::from_minor(199).percent(10).minor(), 20);
    /// // 25 * 10 / 100 = 2.5 → 3
    /// assert_eq!(Money::from_minor(25).percent(10).minor(), 3);
    /// ```
    pub fn percent(&self, pct: i64) -> Money {
        Money(saturate(self.percent_wide(pct)))
    }

    /// Like [`Money::percent`], or `None` when the result leaves i64.
    ///
    /// ```rust
    /// use ventesca_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1000).checked_percent(15), Some(Money::from_minor(150)));
    /// assert_eq!(Money::from_minor(1000).checked_percent(1_000_000_000_000_000_000), None);
    /// ```
    pub fn checked_percent(&self, pct: i64) -> Option<Money> {
        i64::try_from(self.percent_wide(pct)).ok().map(Money)
    }

    fn percent_wide(&self, pct: i64) -> i128 {
        // i128 keeps large inventories from overflowing the intermediate product
        div_round_half_up(self.0 as i128 * pct as i128, 100)
    }

    /// Rounds to the nearest multiple of `step` (half-up).
    ///
    /// ```rust
    /// use ventesca_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(219).round_to_nearest(10).minor(), 220);
    /// assert_eq!(Money::from_minor(214).round_to_nearest(10).minor(), 210);
    /// assert_eq!(Money::from_minor(215).round_to_nearest(10).minor(), 220);
    /// ```
    pub fn round_to_nearest(&self, step: i64) -> Money {
        if step <= 1 {
            return *self;
        }
        let units = div_round_half_up(self.0 as i128, step as i128);
        Money(saturate(units * step as i128))
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn floor_zero(&self) -> Money {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }
}

/// Narrows to i64, clamping at the bounds.
fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

/// Integer division rounding halves away from zero.
fn div_round_half_up(numerator: i128, denominator: i128) -> i128 {
    let half = denominator / 2;
    if numerator >= 0 {
        (numerator + half) / denominator
    } else {
        -((-numerator + half) / denominator)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the raw amount with a currency sign; UI formatting lives in the client.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}", sign, self.0.abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(1099)), "$1099");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-$550");
        assert_eq!(format!("{}", Money::zero()), "$0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);
        assert_eq!((-a).minor(), -1000);
    }

    #[test]
    fn test_percent_rounds_half_up() {
        assert_eq!(Money::from_minor(1000).percent(10).minor(), 100);
        assert_eq!(Money::from_minor(199).percent(10).minor(), 20);
        assert_eq!(Money::from_minor(15).percent(10).minor(), 2); // 1.5 → 2
        assert_eq!(Money::from_minor(14).percent(10).minor(), 1); // 1.4 → 1
        assert_eq!(Money::from_minor(-15).percent(10).minor(), -2);
    }

    #[test]
    fn test_percent_large_amount_does_not_overflow() {
        let huge = Money::from_minor(i64::MAX / 50);
        assert!(huge.percent(100).is_positive());
    }

    #[test]
    fn test_overflowing_arithmetic_is_caught() {
        let price = Money::from_minor(1000);

        // saturates instead of panicking
        assert_eq!(price.multiply_quantity(100_000_000_000_000_000).minor(), i64::MAX);
        assert_eq!(price.checked_add(Money::from_minor(i64::MAX)), None);
        assert_eq!(Money::from_minor(i64::MIN).checked_sub(price), None);
        assert_eq!(price.checked_percent(1_000_000_000_000_000_000), None);
        assert_eq!(price.percent(1_000_000_000_000_000_000).minor(), i64::MAX);
        assert_eq!(
            Money::from_minor(i64::MAX).round_to_nearest(10).minor(),
            i64::MAX
        );
    }

    #[test]
    fn test_round_to_nearest() {
        assert_eq!(Money::from_minor(219).round_to_nearest(10).minor(), 220);
        assert_eq!(Money::from_minor(204).round_to_nearest(10).minor(), 200);
        assert_eq!(Money::from_minor(205).round_to_nearest(10).minor(), 210);
        assert_eq!(Money::from_minor(0).round_to_nearest(10).minor(), 0);
        assert_eq!(Money::from_minor(7).round_to_nearest(1).minor(), 7);
    }

    #[test]
    fn test_floor_zero() {
        assert_eq!(Money::from_minor(-10).floor_zero(), Money::zero());
        assert_eq!(Money::from_minor(10).floor_zero().minor(), 10);
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 250, -50]
            .into_iter()
            .map(Money::from_minor)
            .sum();
        assert_eq!(total.minor(), 300);
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_minor(1).is_positive());
        assert!(Money::from_minor(-1).is_negative());
    }
}
