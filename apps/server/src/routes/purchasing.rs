//! Purchase orders.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use medora_core::{
    Action, NewPurchaseOrder, NewPurchaseOrderItem, PurchaseOrder, PurchaseOrderStatus,
    PurchaseOrderWithItems,
};
use serde::Deserialize;

use crate::actor::Actor;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/purchase-orders", get(list).post(create))
        .route("/purchase-orders/{id}", get(get_one))
        .route("/purchase-orders/{id}/status", patch(update_status))
}

#[derive(Debug, Deserialize)]
pub struct CreatePurchaseOrderRequest {
    #[serde(flatten)]
    pub order: NewPurchaseOrder,
    pub items: Vec<NewPurchaseOrderItem>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PurchaseOrderStatus,
}

async fn list(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<Vec<PurchaseOrder>>> {
    Ok(Json(state.db.purchase_orders().list().await?))
}

async fn get_one(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<PurchaseOrderWithItems>> {
    state
        .db
        .purchase_orders()
        .get_with_items(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Purchase order", &id))
}

async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<CreatePurchaseOrderRequest>,
) -> ApiResult<(StatusCode, Json<PurchaseOrderWithItems>)> {
    actor.require(Action::ManagePurchaseOrders)?;

    let CreatePurchaseOrderRequest { mut order, items } = payload;
    order.created_by = Some(actor.user.id.clone());

    let created = state.db.purchase_orders().create(&order, &items).await?;
    actor
        .audit(
            &state,
            "purchase_order.create",
            "purchase_order",
            &created.order.id,
            Some(format!("total_cents={}", created.order.total_cents)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_status(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<PurchaseOrder>> {
    actor.require(Action::ManagePurchaseOrders)?;

    let order = state
        .db
        .purchase_orders()
        .update_status(&id, payload.status)
        .await?
        .ok_or_else(|| ApiError::not_found("Purchase order", &id))?;
    actor
        .audit(
            &state,
            "purchase_order.status",
            "purchase_order",
            &id,
            Some(order.status.to_string()),
        )
        .await;

    Ok(Json(order))
}
