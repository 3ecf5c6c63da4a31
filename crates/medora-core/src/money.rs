//! # Money Module
//!
//! The `Money` type for invoice and purchase order amounts.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  0.1 + 0.2 = 0.30000000000000004   (f64)                                │
//! │  10  + 20  = 30                    (i64 minor units)                    │
//! │                                                                         │
//! │  Every price, line total, discount and invoice total is stored as an   │
//! │  i64 count of minor units (paisa / cents). Only the client formats     │
//! │  them as "Rs. 12.50".                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Sub;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::validation::ValidationResult;

/// A monetary value in the smallest currency unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use medora_core::money::Money;
    ///
    /// let mrp = Money::from_cents(4550); // 45.50
    /// assert_eq!(mrp.cents(), 4550);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
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

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Fails with [`ValidationError::AmountOverflow`] instead of wrapping.
    ///
    /// ```rust
    /// use medora_core::money::Money;
    ///
    /// let strip = Money::from_cents(1250);
    /// assert_eq!(strip.multiply_quantity(3).unwrap().cents(), 3750);
    /// assert!(Money::from_cents(i64::MAX).multiply_quantity(2).is_err());
    /// ```
    pub fn multiply_quantity(&self, qty: i64) -> ValidationResult<Self> {
        self.0
            .checked_mul(qty)
            .map(Money)
            .ok_or_else(|| overflow("lineTotal"))
    }

    /// Adds two amounts, failing instead of wrapping.
    pub fn checked_add(self, other: Money) -> ValidationResult<Self> {
        self.0
            .checked_add(other.0)
            .map(Money)
            .ok_or_else(|| overflow("total"))
    }

    /// Sums amounts, failing on the first overflow.
    ///
    /// ```rust
    /// use medora_core::money::Money;
    ///
    /// let lines = [Money::from_cents(1000), Money::from_cents(500)];
    /// assert_eq!(Money::try_sum(lines).unwrap().cents(), 1500);
    /// ```
    pub fn try_sum(amounts: impl IntoIterator<Item = Money>) -> ValidationResult<Self> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }

    /// Clamps a value into `[0, max]`.
    ///
    /// Used for invoice discounts: a discount can neither be negative
    /// nor exceed the subtotal it applies to.
    ///
    /// ```rust
    /// use medora_core::money::Money;
    ///
    /// let subtotal = Money::from_cents(1000);
    /// assert_eq!(Money::from_cents(1500).clamp_to(subtotal), subtotal);
    /// assert_eq!(Money::from_cents(-20).clamp_to(subtotal), Money::zero());
    /// ```
    pub fn clamp_to(self, max: Money) -> Money {
        Money(self.0.clamp(0, max.0.max(0)))
    }

    /// Formats with a currency symbol, e.g. `Rs. 45.50`.
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        format!("{} {}", symbol, self)
    }
}

/// Plain decimal rendering (`45.50`, `-3.05`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

fn overflow(field: &str) -> ValidationError {
    ValidationError::AmountOverflow {
        field: field.to_string(),
    }
}

/// Only used for `subtotal - clamped discount`, which cannot underflow.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parts() {
        let money = Money::from_cents(4550);
        assert_eq!(money.major(), 45);
        assert_eq!(money.minor(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(4550).to_string(), "45.50");
        assert_eq!(Money::from_cents(5).to_string(), "0.05");
        assert_eq!(Money::from_cents(-305).to_string(), "-3.05");
        assert_eq!(Money::from_cents(1250).format_with_symbol("Rs."), "Rs. 12.50");
    }

    #[test]
    fn test_sum_of_line_totals() {
        let lines = [
            Money::from_cents(1250).multiply_quantity(2).unwrap(),
            Money::from_cents(300).multiply_quantity(5).unwrap(),
        ];
        assert_eq!(Money::try_sum(lines).unwrap().cents(), 4000);
    }

    #[test]
    fn test_overflow_is_an_error() {
        assert!(matches!(
            Money::from_cents(i64::MAX).multiply_quantity(2),
            Err(ValidationError::AmountOverflow { .. })
        ));
        assert!(Money::from_cents(i64::MAX)
            .checked_add(Money::from_cents(1))
            .is_err());
        assert!(Money::try_sum([Money::from_cents(i64::MAX), Money::from_cents(1)]).is_err());
    }

    #[test]
    fn test_clamp_to_zero_subtotal() {
        assert_eq!(Money::from_cents(100).clamp_to(Money::zero()), Money::zero());
    }
}
