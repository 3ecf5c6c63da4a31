//! # Validation Module
//!
//! Input validation for Medora POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Mobile client                                                │
//! │  ├── Required fields, obvious typos                                    │
//! │  └── Immediate feedback at the counter                                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: medora-server handler                                        │
//! │  ├── JSON deserialization (types, enums)                               │
//! │  └── THIS MODULE: field rules                                          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── NOT NULL / CHECK (quantity >= 0)                                  │
//! │  ├── UNIQUE (username, barcode, invoice_number, batch per medicine)    │
//! │  └── Foreign keys                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use medora_core::validation::{validate_batch_number, validate_quantity};
//!
//! validate_batch_number("PCM-2406").unwrap();
//! validate_quantity(30).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::{NewBatch, NewInvoiceItem, NewMedicine, NewPurchaseOrderItem};
use crate::{MAX_INVOICE_ITEMS, MAX_ITEM_QUANTITY, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length for staff accounts.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Highest reorder level accepted.
pub const MAX_REORDER_LEVEL: i64 = 100_000;

// =============================================================================
// String Validators
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required(field));
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a medicine, supplier or category name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
///
/// ```rust
/// use medora_core::validation::validate_name;
///
/// assert!(validate_name("Paracetamol 500mg").is_ok());
/// assert!(validate_name("   ").is_err());
/// ```
pub fn validate_name(name: &str) -> ValidationResult<()> {
    required_text("name", name, 200)
}

/// Validates a barcode (EAN-8/13, UPC-A or an in-house code).
///
/// ## Rules
/// - 4 to 32 characters
/// - Letters, digits and hyphens only
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::required("barcode"));
    }

    if barcode.len() < 4 {
        return Err(ValidationError::TooShort {
            field: "barcode".to_string(),
            min: 4,
        });
    }

    if barcode.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 32,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters, digits and hyphens".to_string(),
        });
    }

    Ok(())
}

/// Validates a manufacturer lot number.
///
/// ## Rules
/// - Must not be empty, at most 50 characters
/// - Letters, digits, `-`, `/` and `_`
pub fn validate_batch_number(batch_number: &str) -> ValidationResult<()> {
    required_text("batchNumber", batch_number, 50)?;

    if !batch_number
        .trim()
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '/' | '_'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "batchNumber".to_string(),
            reason: "must contain only letters, digits, '-', '/' and '_'".to_string(),
        });
    }

    Ok(())
}

/// Validates a login name.
///
/// ## Rules
/// - 3 to 32 characters
/// - Lowercase ASCII letters, digits, `.` and `_`
pub fn validate_username(username: &str) -> ValidationResult<()> {
    if username.is_empty() {
        return Err(ValidationError::required("username"));
    }

    if username.len() < 3 {
        return Err(ValidationError::TooShort {
            field: "username".to_string(),
            min: 3,
        });
    }

    if username.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 32,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only lowercase letters, digits, '.' and '_'".to_string(),
        });
    }

    Ok(())
}

/// Validates a new password. Only length is enforced.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LENGTH,
        });
    }

    if password.len() > 128 {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: 128,
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a settings key such as `store.name`.
pub fn validate_setting_key(key: &str) -> ValidationResult<()> {
    required_text("key", key, 64)?;

    if !key
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err(ValidationError::InvalidFormat {
            field: "key".to_string(),
            reason: "must contain only letters, digits, '.', '_' and '-'".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line or adjustment quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed [`MAX_ITEM_QUANTITY`]
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Billing: add Amoxicillin 250mg                                         │
/// │                                                                         │
/// │  Cashier types quantity: 21                                            │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(21) ← THIS FUNCTION                                 │
/// │       │                                                                 │
/// │       ├── qty <= 0?    → "quantity must be positive"                   │
/// │       ├── qty > 9999?  → "quantity must be between 1 and 9999"         │
/// │       └── OK           → FEFO allocation                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a stock level that may be zero (batch receipt, manual set).
pub fn validate_stock_level(qty: i64) -> ValidationResult<()> {
    if qty < 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a price in cents.
///
/// ```rust
/// use medora_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(4550).is_ok());
/// assert!(validate_price_cents(0).is_ok());     // free sample
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

pub fn validate_reorder_level(level: i64) -> ValidationResult<()> {
    if !(0..=MAX_REORDER_LEVEL).contains(&level) {
        return Err(ValidationError::OutOfRange {
            field: "reorderLevel".to_string(),
            min: 0,
            max: MAX_REORDER_LEVEL,
        });
    }

    Ok(())
}

/// Validates the look-ahead window of an expiry query.
pub fn validate_expiry_window(days: i64) -> ValidationResult<()> {
    if !(0..=3650).contains(&days) {
        return Err(ValidationError::OutOfRange {
            field: "days".to_string(),
            min: 0,
            max: 3650,
        });
    }

    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string.
///
/// ```rust
/// use medora_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::required("id"));
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a medicine before insert.
pub fn validate_new_medicine(input: &NewMedicine) -> ValidationResult<()> {
    validate_name(&input.name)?;
    if let Some(barcode) = &input.barcode {
        validate_barcode(barcode)?;
    }
    validate_price_cents(input.unit_price_cents)?;
    if let Some(level) = input.reorder_level {
        validate_reorder_level(level)?;
    }
    Ok(())
}

/// Validates a received batch. Manufacture date, when given, must precede
/// expiry.
pub fn validate_new_batch(input: &NewBatch) -> ValidationResult<()> {
    validate_uuid(&input.medicine_id)?;
    validate_batch_number(&input.batch_number)?;
    validate_stock_level(input.quantity)?;
    validate_price_cents(input.purchase_price_cents)?;
    validate_price_cents(input.selling_price_cents)?;

    if let Some(made) = input.manufacture_date {
        if made > input.expiry_date {
            return Err(ValidationError::InvalidFormat {
                field: "manufactureDate".to_string(),
                reason: "must not be after expiryDate".to_string(),
            });
        }
    }

    Ok(())
}

/// Validates the line items of an invoice.
///
/// ## Rules
/// - At least one item, at most [`MAX_INVOICE_ITEMS`]
/// - Every quantity passes [`validate_quantity`]
/// - Explicit unit prices are non-negative
pub fn validate_invoice_items(items: &[NewInvoiceItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    if items.len() > MAX_INVOICE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_INVOICE_ITEMS as i64,
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
        if let Some(price) = item.unit_price_cents {
            validate_price_cents(price)?;
        }
    }

    Ok(())
}

/// Validates the line items of a purchase order.
pub fn validate_purchase_order_items(items: &[NewPurchaseOrderItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::required("items"));
    }

    if items.len() > MAX_INVOICE_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_INVOICE_ITEMS as i64,
        });
    }

    for item in items {
        validate_quantity(item.quantity)?;
        validate_price_cents(item.unit_cost_cents)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8901234567890").is_ok());
        assert!(validate_barcode("MED-0001").is_ok());

        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("12").is_err());
        assert!(validate_barcode("8901 2345").is_err());
        assert!(validate_barcode(&"9".repeat(40)).is_err());
    }

    #[test]
    fn test_validate_batch_number() {
        assert!(validate_batch_number("PCM-2406").is_ok());
        assert!(validate_batch_number("AB/24/117").is_ok());
        assert!(validate_batch_number(" ").is_err());
        assert!(validate_batch_number("LOT 7").is_err());
    }

    #[test]
    fn test_validate_username() {
        assert!(validate_username("asha.k").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("Asha").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("secret1").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(9_999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(10_000).is_err());
    }

    #[test]
    fn test_validate_price_cents_cap() {
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(validate_price_cents(MAX_PRICE_CENTS + 1).is_err());
        assert!(validate_price_cents(i64::MAX).is_err());

        // The largest legal bill still fits in i64.
        let largest = MAX_PRICE_CENTS
            .checked_mul(MAX_ITEM_QUANTITY)
            .and_then(|line| line.checked_mul(MAX_INVOICE_ITEMS as i64));
        assert!(largest.is_some());
    }

    #[test]
    fn test_validate_reorder_level() {
        assert!(validate_reorder_level(0).is_ok());
        assert!(validate_reorder_level(-1).is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }

    #[test]
    fn test_validate_new_batch_dates() {
        let mut batch = NewBatch {
            medicine_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
            batch_number: "PCM-2406".to_string(),
            quantity: 100,
            expiry_date: NaiveDate::from_ymd_opt(2027, 6, 30).unwrap(),
            manufacture_date: NaiveDate::from_ymd_opt(2025, 6, 30),
            purchase_price_cents: 120,
            selling_price_cents: 200,
            supplier_id: None,
        };
        assert!(validate_new_batch(&batch).is_ok());

        batch.manufacture_date = NaiveDate::from_ymd_opt(2028, 1, 1);
        assert!(validate_new_batch(&batch).is_err());
    }

    #[test]
    fn test_validate_invoice_items() {
        assert!(validate_invoice_items(&[]).is_err());

        let item = NewInvoiceItem {
            medicine_id: "m1".to_string(),
            batch_id: None,
            quantity: 2,
            unit_price_cents: Some(-5),
        };
        assert!(validate_invoice_items(&[item.clone()]).is_err());

        let overpriced = NewInvoiceItem {
            unit_price_cents: Some(i64::MAX),
            ..item.clone()
        };
        assert!(validate_invoice_items(&[overpriced]).is_err());

        let ok = NewInvoiceItem {
            unit_price_cents: None,
            ..item
        };
        assert!(validate_invoice_items(&[ok]).is_ok());
    }
}
