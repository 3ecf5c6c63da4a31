//! # Routes
//!
//! ```text
//! /health                         liveness + DB ping
//! /api/auth/*                     login, first-owner registration
//! /api/users                      owner only
//! /api/suppliers, /api/categories catalog reference data
//! /api/medicines, /api/batches    catalog, FEFO, expiry
//! /api/invoices, /api/sales       billing
//! /api/purchase-orders            supplier orders
//! /api/stock-adjustments          manual corrections
//! /api/audit-logs, /api/settings  owner administration
//! /api/dashboard                  home-screen summary
//! ```

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::json;

use crate::state::AppState;

mod admin;
mod auth;
mod catalog;
mod inventory;
mod purchasing;
mod sales;
mod users;

pub fn router() -> Router<AppState> {
    let api = Router::new()
        .merge(auth::router())
        .merge(users::router())
        .merge(catalog::router())
        .merge(inventory::router())
        .merge(sales::router())
        .merge(purchasing::router())
        .merge(admin::router());

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = state.db.health_check().await;
    let status = if database {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(json!({
            "status": if database { "ok" } else { "degraded" },
            "database": database,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}
