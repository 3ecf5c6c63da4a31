//! # medora-core: Pure Business Logic for Medora POS
//!
//! Pharmacy rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Medora POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Mobile client (out of this repo)                │   │
//! │  │    Medicines ──► Billing ──► Stock ──► Dashboard               │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON over HTTP                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    medora-server (axum)                         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ medora-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ inventory │  │  invoice  │  │  purchase │  │   │
//! │  │   │ Medicine  │  │   FEFO    │  │  numbers  │  │   status  │  │   │
//! │  │   │  Batch    │  │ adjusting │  │  totals   │  │  machine  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK READS • PURE FUNCTIONS       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    medora-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records (Medicine, Batch, Invoice, User, ...)
//! - [`money`] - Integer money in minor units
//! - [`calendar`] - Store-local dates for "today" decisions
//! - [`inventory`] - FEFO selection, allocation, adjustment math, low stock
//! - [`invoice`] - Invoice numbers and totals
//! - [`purchase`] - Purchase order status machine
//! - [`policy`] - Role-based permissions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::NaiveDate;
//! use medora_core::invoice::format_invoice_number;
//!
//! let date = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
//! assert_eq!(format_invoice_number(date, 7), "INV202610190007");
//! ```

pub mod calendar;
pub mod error;
pub mod inventory;
pub mod invoice;
pub mod money;
pub mod policy;
pub mod purchase;
pub mod types;
pub mod validation;

pub use calendar::StoreCalendar;
pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use policy::{Action, Role};
pub use purchase::PurchaseOrderStatus;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of every sales invoice number (`INV20261019` + sequence).
pub const INVOICE_PREFIX: &str = "INV";

/// Width of the zero-padded daily invoice sequence.
pub const INVOICE_SEQUENCE_WIDTH: usize = 4;

/// Days ahead that count as "expiring soon" on the dashboard.
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Number of low-stock / expiring rows previewed on the dashboard.
pub const DASHBOARD_PREVIEW_LIMIT: usize = 5;

/// Maximum rows returned by a medicine search.
pub const SEARCH_RESULT_LIMIT: i64 = 50;

/// Default page size for the audit log.
pub const DEFAULT_AUDIT_LOG_LIMIT: i64 = 100;

/// Reorder level applied when a medicine is created without one.
pub const DEFAULT_REORDER_LEVEL: i64 = 10;

/// Maximum line items on a single invoice.
pub const MAX_INVOICE_ITEMS: usize = 100;

/// Maximum quantity on a single line or adjustment.
///
/// Catches typos like 10000 instead of 100 at the counter.
pub const MAX_ITEM_QUANTITY: i64 = 9_999;

/// Maximum unit price in minor units (one billion major units).
///
/// `MAX_PRICE_CENTS * MAX_ITEM_QUANTITY * MAX_INVOICE_ITEMS` stays well
/// inside `i64`, so bill and order totals cannot overflow.
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;
