//! # Inventory Rules
//!
//! Batch selection and stock arithmetic.
//!
//! ## FEFO (First-Expired, First-Out)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Paracetamol 500mg, today = 2026-10-19, bill asks for 15                │
//! │                                                                         │
//! │  B-07  qty 20  exp 2026-09-30   ✗ expired                              │
//! │  B-09  qty  0  exp 2026-11-01   ✗ empty                                │
//! │  B-11  qty  8  exp 2026-10-19   ✓ take 8   (expires today, still ok)   │
//! │  B-12  qty 40  exp 2027-03-31   ✓ take 7                               │
//! │                                                                         │
//! │  Sellable batches are sorted by expiry ascending and drained in order. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Never Goes Negative
//! Every deduction is clamped at zero. A batch that shows 3 on the shelf but
//! gets a removal of 5 ends at 0, not -2.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Batch;

// =============================================================================
// Adjustment Types
// =============================================================================

/// Why a batch quantity was changed by hand.
///
/// `Add` and `Return` put stock back on the shelf, everything else takes
/// it off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum AdjustmentType {
    /// Found stock, recount surplus.
    #[serde(alias = "addition")]
    Add,
    /// Recount shortfall.
    Remove,
    Damage,
    Expired,
    /// Customer return.
    Return,
}

impl AdjustmentType {
    /// Whether this adjustment increases the batch quantity.
    #[inline]
    pub fn is_increase(&self) -> bool {
        matches!(self, AdjustmentType::Add | AdjustmentType::Return)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Add => "add",
            AdjustmentType::Remove => "remove",
            AdjustmentType::Damage => "damage",
            AdjustmentType::Expired => "expired",
            AdjustmentType::Return => "return",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Stock Arithmetic
// =============================================================================

/// Quantity after applying an adjustment, clamped at zero.
///
/// ```rust
/// use medora_core::inventory::{adjusted_quantity, AdjustmentType};
///
/// assert_eq!(adjusted_quantity(10, AdjustmentType::Return, 2), 12);
/// assert_eq!(adjusted_quantity(3, AdjustmentType::Damage, 5), 0);
/// ```
pub fn adjusted_quantity(current: i64, kind: AdjustmentType, quantity: i64) -> i64 {
    if kind.is_increase() {
        current.saturating_add(quantity)
    } else {
        deducted_quantity(current, quantity)
    }
}

/// Quantity after selling `sold` units, clamped at zero.
#[inline]
pub fn deducted_quantity(current: i64, sold: i64) -> i64 {
    current.saturating_sub(sold).max(0)
}

/// Low stock when the total across batches is at or below the reorder level.
#[inline]
pub fn is_low_stock(total_stock: i64, reorder_level: i64) -> bool {
    total_stock <= reorder_level
}

// =============================================================================
// FEFO Selection
// =============================================================================

/// Sellable batches of one medicine in FEFO order.
///
/// Expired and empty batches are dropped. Ties on expiry are broken by
/// batch number, matching `ORDER BY expiry_date, batch_number`.
pub fn fefo_available(batches: &[Batch], today: NaiveDate) -> Vec<&Batch> {
    let mut available: Vec<&Batch> = batches.iter().filter(|b| b.is_available(today)).collect();
    available.sort_by(|a, b| {
        a.expiry_date
            .cmp(&b.expiry_date)
            .then_with(|| a.batch_number.cmp(&b.batch_number))
    });
    available
}

/// A slice of a requested quantity taken from one batch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchAllocation<'a> {
    pub batch: &'a Batch,
    pub quantity: i64,
}

/// Splits `requested` units across sellable batches, earliest expiry first.
///
/// ## Errors
/// [`CoreError::InsufficientStock`] when the sellable total is below the
/// request. Nothing is allocated in that case.
pub fn allocate_fefo<'a>(
    batches: &'a [Batch],
    medicine: &str,
    requested: i64,
    today: NaiveDate,
) -> CoreResult<Vec<BatchAllocation<'a>>> {
    let available = fefo_available(batches, today);
    let total: i64 = available.iter().map(|b| b.quantity).sum();

    if total < requested {
        return Err(CoreError::InsufficientStock {
            medicine: medicine.to_string(),
            available: total,
            requested,
        });
    }

    let mut remaining = requested;
    let mut allocations = Vec::new();

    for batch in available {
        if remaining == 0 {
            break;
        }
        let take = remaining.min(batch.quantity);
        allocations.push(BatchAllocation {
            batch,
            quantity: take,
        });
        remaining -= take;
    }

    Ok(allocations)
}

// =============================================================================
// Unit Tests
// =============================================================================
