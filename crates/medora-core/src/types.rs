//! # Domain Types
//!
//! Records and inputs shared by the database layer and the API.
//!
//! ## Entity Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Category ──< Medicine ──< Batch >── Supplier                           │
//! │                  │           │                                          │
//! │                  │           ├──< StockAdjustment                       │
//! │                  │           │                                          │
//! │                  └──< InvoiceItem >── Invoice                           │
//! │                                                                         │
//! │  Supplier ──< PurchaseOrder ──< PurchaseOrderItem >── Medicine          │
//! │                                                                         │
//! │  User ──< AuditLog        Setting (key/value)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - `id`: UUID v4 string
//! - `*_cents`: integer minor units (see [`Money`])
//! - timestamps are UTC, expiry/manufacture dates are plain calendar dates
//! - JSON field names are camelCase for the mobile client

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

use crate::inventory::AdjustmentType;
use crate::money::Money;
use crate::policy::Role;
use crate::purchase::PurchaseOrderStatus;

// =============================================================================
// Users
// =============================================================================

/// A staff account.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Display name.
    pub name: String,
    pub role: Role,
    /// Argon2 PHC string. Never leaves the server.
    #[serde(skip_serializing, default)]
    #[ts(skip)]
    pub password_hash: String,
    pub phone: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user. The password is plain text until hashed
/// by the user repository.
#[derive(Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("role", &self.role)
            .finish()
    }
}

/// Partial user update. `None` leaves the column untouched; a password
/// is re-hashed only when present.
#[derive(Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
}

impl fmt::Debug for UserUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserUpdate")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("is_active", &self.is_active)
            .finish()
    }
}

// =============================================================================
// Suppliers & Categories
// =============================================================================

/// A wholesaler or distributor.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    /// PAN / VAT registration number.
    pub tax_id: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct SupplierUpdate {
    pub name: Option<String>,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub tax_id: Option<String>,
    pub is_active: Option<bool>,
}

/// Therapeutic or shelf category (e.g. "Analgesics").
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

// =============================================================================
// Medicines
// =============================================================================

/// A catalog entry. Stock lives on its batches.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Medicine {
    pub id: String,
    /// Trade name shown at the counter.
    pub name: String,
    /// INN / salt name, e.g. "Paracetamol".
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<String>,
    /// Tablet, syrup, injection...
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    /// Default selling price when a batch carries none.
    pub unit_price_cents: i64,
    /// Low-stock threshold (inclusive).
    pub reorder_level: i64,
    pub requires_prescription: bool,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Medicine {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct NewMedicine {
    pub name: String,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub unit_price_cents: i64,
    /// Falls back to [`crate::DEFAULT_REORDER_LEVEL`].
    pub reorder_level: Option<i64>,
    pub requires_prescription: bool,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct MedicineUpdate {
    pub name: Option<String>,
    pub generic_name: Option<String>,
    pub brand: Option<String>,
    pub barcode: Option<String>,
    pub category_id: Option<String>,
    pub dosage_form: Option<String>,
    pub strength: Option<String>,
    pub unit_price_cents: Option<i64>,
    pub reorder_level: Option<i64>,
    pub requires_prescription: Option<bool>,
    pub is_active: Option<bool>,
}

/// A medicine with its total quantity across all batches.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MedicineStock {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub medicine: Medicine,
    pub total_stock: i64,
}

// =============================================================================
// Batches
// =============================================================================

/// A received lot of a medicine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Batch {
    pub id: String,
    pub medicine_id: String,
    /// Manufacturer's lot number as printed on the strip.
    pub batch_number: String,
    /// Units on hand. Never negative.
    pub quantity: i64,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub manufacture_date: Option<NaiveDate>,
    pub purchase_price_cents: i64,
    pub selling_price_cents: i64,
    pub supplier_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Batch {
    /// A batch expiring today is still sellable today.
    #[inline]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date < today
    }

    /// Sellable under FEFO: in stock and not expired.
    #[inline]
    pub fn is_available(&self, today: NaiveDate) -> bool {
        self.quantity >= 1 && !self.is_expired(today)
    }
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewBatch {
    pub medicine_id: String,
    pub batch_number: String,
    pub quantity: i64,
    #[ts(as = "String")]
    pub expiry_date: NaiveDate,
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub manufacture_date: Option<NaiveDate>,
    #[serde(default)]
    pub purchase_price_cents: i64,
    #[serde(default)]
    pub selling_price_cents: i64,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

/// A batch close to expiry, with the medicine's display fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ExpiringBatch {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub batch: Batch,
    pub medicine_name: String,
    pub brand: Option<String>,
}

// =============================================================================
// Invoices
// =============================================================================

/// How the customer paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    /// Wallet / QR payments.
    Online,
    /// Sold on account.
    Credit,
}

/// A sales invoice (bill).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Invoice {
    pub id: String,
    /// `INV<YYYYMMDD><NNNN>`.
    pub invoice_number: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Cashier who issued the bill.
    pub user_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Invoice {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// Invoice header input. Totals are computed from the items.
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct NewInvoice {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub discount_cents: i64,
    pub payment_method: PaymentMethod,
    pub user_id: Option<String>,
}

/// A requested invoice line.
///
/// Without `batch_id` the quantity is allocated across batches in FEFO
/// order. Without `unit_price_cents` the batch selling price (or the
/// medicine price when the batch has none) is used.
#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewInvoiceItem {
    pub medicine_id: String,
    #[serde(default)]
    pub batch_id: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub unit_price_cents: Option<i64>,
}

/// A stored invoice line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceItem {
    pub id: String,
    pub invoice_id: String,
    pub medicine_id: String,
    pub batch_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

/// An invoice line joined with the names printed on the bill.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceLine {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub item: InvoiceItem,
    pub medicine_name: String,
    pub brand: Option<String>,
    pub batch_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct InvoiceWithItems {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub items: Vec<InvoiceLine>,
}

/// Sales summary for one store-local day.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DailySales {
    pub total_bills: i64,
    pub total_revenue_cents: i64,
    pub total_discount_cents: i64,
    pub avg_bill_value_cents: i64,
}

// =============================================================================
// Purchase Orders
// =============================================================================

/// An order placed with a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub supplier_id: String,
    pub status: PurchaseOrderStatus,
    pub total_cents: i64,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub received_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct NewPurchaseOrder {
    pub supplier_id: String,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewPurchaseOrderItem {
    pub medicine_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub unit_cost_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrderItem {
    pub id: String,
    pub purchase_order_id: String,
    pub medicine_id: String,
    pub quantity: i64,
    pub unit_cost_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PurchaseOrderWithItems {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

// =============================================================================
// Stock Adjustments
// =============================================================================

/// A manual correction applied to a batch.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockAdjustment {
    pub id: String,
    pub batch_id: String,
    pub medicine_id: String,
    pub adjustment_type: AdjustmentType,
    /// Always positive; the type decides the direction.
    pub quantity: i64,
    pub reason: Option<String>,
    pub user_id: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct NewStockAdjustment {
    pub batch_id: String,
    pub adjustment_type: AdjustmentType,
    pub quantity: i64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// The stored adjustment plus the batch quantity it produced.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AppliedAdjustment {
    pub adjustment: StockAdjustment,
    pub batch_quantity: i64,
}

// =============================================================================
// Audit Log
// =============================================================================

/// Append-only record of a user action.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuditLog {
    pub id: String,
    pub user_id: Option<String>,
    /// Verb such as `invoice.create` or `stock.adjust`.
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    /// Free-form JSON or text.
    pub details: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct NewAuditLog {
    pub user_id: Option<String>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<String>,
    pub details: Option<String>,
}

/// Audit row joined with the acting user's display name.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AuditLogEntry {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub log: AuditLog,
    pub user_name: Option<String>,
}

// =============================================================================
// Settings & Dashboard
// =============================================================================

/// A store-level key/value setting.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Setting {
    pub key: String,
    pub value: String,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Summary shown on the home screen.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    pub today_sales: DailySales,
    /// Revenue over the last 7 days (rolling).
    pub weekly_sales_cents: i64,
    /// Revenue over the last 30 days (rolling).
    pub monthly_sales_cents: i64,
    pub low_stock_count: i64,
    pub low_stock_items: Vec<MedicineStock>,
    pub expiring_count: i64,
    pub expiring_items: Vec<ExpiringBatch>,
    pub total_medicines: i64,
    pub total_suppliers: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(quantity: i64, expiry: NaiveDate) -> Batch {
        let now = Utc::now();
        Batch {
            id: "b".to_string(),
            medicine_id: "m".to_string(),
            batch_number: "LOT-1".to_string(),
            quantity,
            expiry_date: expiry,
            manufacture_date: None,
            purchase_price_cents: 0,
            selling_price_cents: 0,
            supplier_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_batch_expiring_today_is_available() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        assert!(batch(5, today).is_available(today));
        assert!(!batch(5, today.pred_opt().unwrap()).is_available(today));
        assert!(!batch(0, today.succ_opt().unwrap()).is_available(today));
    }

    #[test]
    fn test_user_password_hash_not_serialized() {
        let now = Utc::now();
        let user = User {
            id: "u1".to_string(),
            username: "asha".to_string(),
            name: "Asha".to_string(),
            role: Role::Owner,
            password_hash: "$argon2id$secret".to_string(),
            phone: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"isActive\":true"));
    }

    #[test]
    fn test_new_user_debug_redacts_password() {
        let input: NewUser =
            serde_json::from_str(r#"{"username":"ram","name":"Ram","password":"hunter22"}"#)
                .unwrap();
        assert_eq!(input.role, Role::Staff);
        assert!(!format!("{:?}", input).contains("hunter22"));
    }

    #[test]
    fn test_invoice_item_defaults() {
        let item: NewInvoiceItem =
            serde_json::from_str(r#"{"medicineId":"m1","quantity":3}"#).unwrap();
        assert!(item.batch_id.is_none());
        assert!(item.unit_price_cents.is_none());
    }
}
