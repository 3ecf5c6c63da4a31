//! # Repository Module
//!
//! Database repository implementations for Medora POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  axum handler                                                          │
//! │       │                                                                 │
//! │       │  db.batches().available(&medicine_id)                          │
//! │       ▼                                                                 │
//! │  BatchRepository                                                       │
//! │  ├── list_by_medicine(&self, medicine_id)                              │
//! │  ├── available(&self, medicine_id)        ← FEFO                       │
//! │  ├── expiring(&self, days)                                             │
//! │  └── set_quantity(&self, id, quantity)                                 │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conventions
//! - `get*` returns `Ok(None)` when the row is missing
//! - `update` returns `Ok(None)` when the row is missing
//! - `*_at(.., now)` variants take the clock as an argument; the plain
//!   variants call them with `Utc::now()`
//!
//! ## Available Repositories
//!
//! - [`UserRepository`] - Staff accounts, password hashing
//! - [`SupplierRepository`] / [`CategoryRepository`] - Catalog reference data
//! - [`MedicineRepository`] - Catalog, search, low stock
//! - [`BatchRepository`] - Lots, FEFO, expiry
//! - [`InvoiceRepository`] - Billing (transactional), daily sales
//! - [`PurchaseOrderRepository`] - Supplier orders, status machine
//! - [`StockAdjustmentRepository`] - Manual corrections (transactional)
//! - [`AuditLogRepository`] - Append-only action log
//! - [`SettingRepository`] - Key/value store settings
//! - [`DashboardRepository`] - Read-only aggregates

pub mod audit_log;
pub mod batch;
pub mod category;
pub mod dashboard;
pub mod invoice;
pub mod medicine;
pub mod purchase_order;
pub mod setting;
pub mod stock_adjustment;
pub mod supplier;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;

pub use audit_log::AuditLogRepository;
pub use batch::BatchRepository;
pub use category::CategoryRepository;
pub use dashboard::{DashboardOptions, DashboardRepository};
pub use invoice::InvoiceRepository;
pub use medicine::MedicineRepository;
pub use purchase_order::PurchaseOrderRepository;
pub use setting::SettingRepository;
pub use stock_adjustment::StockAdjustmentRepository;
pub use supplier::SupplierRepository;
pub use user::UserRepository;

/// Generates a new entity ID.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
