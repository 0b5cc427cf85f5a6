//! # Money Module
//!
//! Provides the `Money` type for final, rounded monetary values.
//!
//! ## Two Number Types, One Boundary
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    2.5 × 120 × 1.8 + 1.2 × 150 × 1.8 = 863.9999999999999  ❌           │
//! │                                                                         │
//! │  OUR SOLUTION:                                                          │
//! │    Quantities & unit costs ──► rust_decimal::Decimal (exact base 10)    │
//! │    Sum of all terms         ──► rounded ONCE, half away from zero       │
//! │    Stored / compared price  ──► Money (integer cents)                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cotiza_core::money::Money;
//! use rust_decimal_macros::dec;
//!
//! let price = Money::from_decimal(dec!(935.995)).unwrap(); // rounds half away from zero
//! assert_eq!(price.cents(), 93600);
//! assert_eq!(price.to_string(), "$936.00");
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in cents.
///
/// ## Design Decisions
/// - **i64 (signed)**: Differences between two prices can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Only built from Decimal by rounding**: there is no `from_f64`
///
/// ## Where Money is Used
/// ```text
/// compute_price(...) ──► Money ──► quotation_items.stored_price_cents
///                          │
///                          └──► check_discrepancy(stored, ...)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::money::Money;
    ///
    /// let price = Money::from_cents(93600); // $936.00
    /// assert_eq!(price.cents(), 93600);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Rounds a decimal amount to cents, half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use cotiza_core::money::Money;
    /// use rust_decimal_macros::dec;
    ///
    /// assert_eq!(Money::from_decimal(dec!(0.005)).unwrap().cents(), 1);
    /// assert_eq!(Money::from_decimal(dec!(-0.005)).unwrap().cents(), -1);
    /// assert_eq!(Money::from_decimal(dec!(12.344)).unwrap().cents(), 1234);
    /// ```
    ///
    /// ## Errors
    /// [`CoreError::PriceOverflow`] if the amount does not fit in i64 cents.
    pub fn from_decimal(amount: Decimal) -> CoreResult<Self> {
        amount
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.trunc().to_i64())
            .map(Money)
            .ok_or_else(|| CoreError::PriceOverflow {
                term: format!("{amount} in cents"),
            })
    }

    /// Returns the value as an exact decimal with 2 places.
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
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

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Adds two values, `None` on overflow.
    #[inline]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money with a `$` sign and two decimals.
///
/// ## Note
/// This is for logs and debugging. The frontend owns localized formatting.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
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

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(93600)), "$936.00");
        assert_eq!(format!("{}", Money::from_cents(90)), "$0.90");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::zero()), "$0.00");
    }

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(dec!(1.005)).unwrap().cents(), 101);
        assert_eq!(Money::from_decimal(dec!(1.015)).unwrap().cents(), 102);
        assert_eq!(Money::from_decimal(dec!(-1.005)).unwrap().cents(), -101);
        assert_eq!(Money::from_decimal(dec!(1.0049)).unwrap().cents(), 100);
    }

    #[test]
    fn test_from_decimal_integer_and_short_scales() {
        assert_eq!(Money::from_decimal(dec!(936)).unwrap().cents(), 93600);
        assert_eq!(Money::from_decimal(dec!(0.9)).unwrap().cents(), 90);
        assert_eq!(Money::from_decimal(Decimal::ZERO).unwrap(), Money::zero());
    }

    #[test]
    fn test_from_decimal_out_of_range_is_an_error() {
        // i64::MAX cents is about 9.2e16 in major units.
        let err = Money::from_decimal(dec!(100000000000000000)).unwrap_err();
        assert!(matches!(err, CoreError::PriceOverflow { .. }));
        assert!(Money::from_decimal(dec!(-100000000000000000)).is_err());
        assert!(Money::from_decimal(Decimal::MAX).is_err());

        let largest = Money::from_decimal(dec!(92233720368547758.07)).unwrap();
        assert_eq!(largest.cents(), i64::MAX);
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_cents(1000);
        assert_eq!(a.checked_add(a), Some(Money::from_cents(2000)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(Money::from_cents(1)), None);
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Money::from_cents(93600).to_decimal(), dec!(936.00));
        assert_eq!(Money::from_cents(-1).to_decimal(), dec!(-0.01));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(1500);

        assert_eq!((b - a).cents(), 500);
        assert_eq!((a - b).abs().cents(), 500);
        assert!((a - b).is_negative());

        let total: Money = vec![a, b, Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), 2501);
    }
}
