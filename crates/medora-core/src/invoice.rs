//! # Invoice Rules
//!
//! Invoice numbering and totals.
//!
//! ## Number Format
//! ```text
//! INV 20261019 0007
//! ─┬─ ───┬──── ──┬─
//!  │     │       └── daily sequence, zero-padded to 4 (1-based)
//!  │     └────────── store-local date
//!  └──────────────── fixed prefix
//! ```
//!
//! The sequence restarts every store-local day. It is the number of
//! invoices already carrying today's prefix plus one.

use chrono::NaiveDate;

use crate::money::Money;
use crate::validation::ValidationResult;
use crate::{INVOICE_PREFIX, INVOICE_SEQUENCE_WIDTH};

/// The day prefix shared by all invoices issued on `date`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use medora_core::invoice::invoice_prefix;
///
/// let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
/// assert_eq!(invoice_prefix(date), "INV20260105");
/// ```
pub fn invoice_prefix(date: NaiveDate) -> String {
    format!("{}{}", INVOICE_PREFIX, date.format("%Y%m%d"))
}

/// Full invoice number for the `sequence`-th invoice of `date`.
///
/// Sequences wider than four digits are printed in full.
pub fn format_invoice_number(date: NaiveDate, sequence: u32) -> String {
    format!(
        "{}{:0width$}",
        invoice_prefix(date),
        sequence,
        width = INVOICE_SEQUENCE_WIDTH
    )
}

/// Computed totals for a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvoiceTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

impl InvoiceTotals {
    /// Sums line totals and applies a discount clamped into `[0, subtotal]`.
    ///
    /// ```rust
    /// use medora_core::invoice::InvoiceTotals;
    /// use medora_core::Money;
    ///
    /// let totals = InvoiceTotals::compute(
    ///     [Money::from_cents(1000), Money::from_cents(500)],
    ///     Money::from_cents(200),
    /// )
    /// .unwrap();
    /// assert_eq!(totals.total.cents(), 1300);
    /// ```
    pub fn compute(
        line_totals: impl IntoIterator<Item = Money>,
        discount: Money,
    ) -> ValidationResult<Self> {
        let subtotal = Money::try_sum(line_totals)?;
        let discount = discount.clamp_to(subtotal);

        Ok(InvoiceTotals {
            subtotal,
            discount,
            total: subtotal - discount,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_invoice_number() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert_eq!(format_invoice_number(date, 1), "INV202610190001");
        assert_eq!(format_invoice_number(date, 42), "INV202610190042");
        assert_eq!(format_invoice_number(date, 12345), "INV2026101912345");
    }

    #[test]
    fn test_totals_without_discount() {
        let totals = InvoiceTotals::compute([Money::from_cents(250)], Money::zero()).unwrap();
        assert_eq!(totals.subtotal, totals.total);
        assert!(totals.discount.is_zero());
    }

    #[test]
    fn test_discount_clamped_to_subtotal() {
        let totals = InvoiceTotals::compute([Money::from_cents(800)], Money::from_cents(1000)).unwrap();
        assert_eq!(totals.discount.cents(), 800);
        assert!(totals.total.is_zero());
    }

    #[test]
    fn test_negative_discount_ignored() {
        let totals = InvoiceTotals::compute([Money::from_cents(800)], Money::from_cents(-50)).unwrap();
        assert_eq!(totals.discount, Money::zero());
        assert_eq!(totals.total.cents(), 800);
    }

    #[test]
    fn test_subtotal_overflow_rejected() {
        let lines = [Money::from_cents(i64::MAX), Money::from_cents(1)];
        assert!(InvoiceTotals::compute(lines, Money::zero()).is_err());
    }
}
