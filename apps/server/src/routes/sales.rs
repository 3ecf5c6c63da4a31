//! Billing, daily sales and the dashboard.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{NaiveDate, Utc};
use medora_core::{
    Action, DailySales, DashboardStats, Invoice, InvoiceWithItems, NewInvoice, NewInvoiceItem,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::actor::Actor;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices).post(create_invoice))
        .route("/invoices/next-number", get(next_number))
        .route("/invoices/{id}", get(get_invoice))
        .route("/sales/daily", get(daily_sales))
        .route("/dashboard", get(dashboard))
}

// =============================================================================
// Invoices
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    #[serde(flatten)]
    pub invoice: NewInvoice,
    pub items: Vec<NewInvoiceItem>,
}

async fn list_invoices(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<Vec<Invoice>>> {
    Ok(Json(state.db.invoices().list().await?))
}

async fn get_invoice(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<InvoiceWithItems>> {
    state
        .db
        .invoices()
        .get_with_items(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Invoice", &id))
}

/// Bills the items and deducts stock in one transaction.
async fn create_invoice(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreateInvoiceRequest>,
) -> ApiResult<(StatusCode, Json<InvoiceWithItems>)> {
    actor.require(Action::CreateInvoice)?;

    let CreateInvoiceRequest { mut invoice, items } = payload;
    invoice.user_id = Some(actor.user.id.clone());

    let created = state.db.invoices().create(&invoice, &items).await?;

    info!(
        invoice_number = %created.invoice.invoice_number,
        total_cents = created.invoice.total_cents,
        cashier = %actor.user.username,
        "Invoice issued"
    );
    actor
        .audit(
            &state,
            "invoice.create",
            "invoice",
            &created.invoice.id,
            Some(created.invoice.invoice_number.clone()),
        )
        .await;

    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextNumberResponse {
    pub invoice_number: String,
}

/// Preview only; the number is assigned again when the invoice is saved.
async fn next_number(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<NextNumberResponse>> {
    let invoice_number = state.db.invoices().next_number().await?;
    Ok(Json(NextNumberResponse { invoice_number }))
}

// =============================================================================
// Reports
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    /// Store-local date; today when omitted.
    pub date: Option<NaiveDate>,
}

async fn daily_sales(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<DailyQuery>,
) -> ApiResult<Json<DailySales>> {
    let date = query
        .date
        .unwrap_or_else(|| state.db.calendar().local_date(Utc::now()));

    Ok(Json(state.db.invoices().daily_sales(date).await?))
}

async fn dashboard(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<DashboardStats>> {
    let options = state.config.dashboard_options();
    Ok(Json(state.db.dashboard().stats(options).await?))
}
