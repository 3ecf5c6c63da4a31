//! # medora-server: REST API for Medora POS
//!
//! JSON over HTTP for the pharmacy mobile client.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/invoices   X-User-Id: 7f3c…                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TraceLayer (request span) ──► Router                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Actor extractor ── users.get_by_id ── 401 if missing/inactive         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  actor.require(Action::CreateInvoice) ── 403 on denial                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  db.invoices().create(..)   (one transaction)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  actor.audit("invoice.create", ..) ──► 201 { invoice + items }         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Layered `ServerConfig` (defaults, TOML, `MEDORA_*`)
//! - [`state`] - Shared `AppState`
//! - [`actor`] - `X-User-Id` extractor, role checks, audit entries
//! - [`error`] - `ApiError` and its HTTP mapping
//! - `routes` - Handlers grouped by area

pub mod actor;
pub mod config;
pub mod error;
mod routes;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::AppState;

/// Builds the full application router.
pub fn build_router(state: AppState) -> Router {
    routes::router()
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
