//! # medora-db: Database Layer for Medora POS
//!
//! SQLite storage for the pharmacy through sqlx. Every multi-statement
//! write (invoice, purchase order, stock adjustment) runs in a single
//! transaction owned by this crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Medora POS Data Flow                             │
//! │                                                                         │
//! │  axum handler (POST /api/invoices)                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    medora-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (invoice.rs)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ InvoiceRepo   │    │ 001_initial_ │  │   │
//! │  │   │ StoreCalendar │◄───│ BatchRepo     │    │   schema.sql │  │   │
//! │  │   │               │    │ DashboardRepo │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (WAL)                       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool, store calendar, repository accessors
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per entity plus the dashboard
//!
//! ## Usage
//!
//! ```rust,ignore
//! use medora_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("medora.db")).await?;
//!
//! let lots = db.batches().available(&medicine_id).await?;
//! let stats = db.dashboard().stats(Default::default()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::{
    AuditLogRepository, BatchRepository, CategoryRepository, DashboardOptions,
    DashboardRepository, InvoiceRepository, MedicineRepository, PurchaseOrderRepository,
    SettingRepository, StockAdjustmentRepository, SupplierRepository, UserRepository,
};
