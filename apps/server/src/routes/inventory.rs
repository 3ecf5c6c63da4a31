//! Medicines, batches and stock adjustments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use medora_core::validation::{validate_expiry_window, validate_search_query};
use medora_core::{
    Action, AppliedAdjustment, Batch, ExpiringBatch, Medicine, MedicineStock, MedicineUpdate,
    NewBatch, NewMedicine, NewStockAdjustment, StockAdjustment,
};
use serde::Deserialize;

use crate::actor::Actor;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/medicines", get(list_medicines).post(create_medicine))
        .route("/medicines/low-stock", get(low_stock))
        .route("/medicines/barcode/{code}", get(get_by_barcode))
        .route("/medicines/{id}", get(get_medicine).patch(update_medicine))
        .route("/medicines/{id}/batches", get(list_batches))
        .route("/medicines/{id}/batches/available", get(available_batches))
        .route("/batches", post(create_batch))
        .route("/batches/expiring", get(expiring_batches))
        .route("/batches/{id}", get(get_batch))
        .route("/batches/{id}/quantity", put(set_batch_quantity))
        .route("/stock-adjustments", get(list_adjustments).post(create_adjustment))
}

// =============================================================================
// Medicines
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Lists the catalog, or searches it when `q` is given.
async fn list_medicines(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Medicine>>> {
    let medicines = state.db.medicines();

    match query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
        Some(q) => {
            let q = validate_search_query(q).map_err(|e| ApiError::validation(e.to_string()))?;
            Ok(Json(medicines.search(&q).await?))
        }
        None => Ok(Json(medicines.list().await?)),
    }
}

async fn get_medicine(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<Medicine>> {
    state
        .db
        .medicines()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Medicine", &id))
}

async fn get_by_barcode(
    State(state): State<AppState>,
    _actor: Actor,
    Path(code): Path<String>,
) -> ApiResult<Json<Medicine>> {
    state
        .db
        .medicines()
        .get_by_barcode(&code)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Medicine", &code))
}

async fn low_stock(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<Vec<MedicineStock>>> {
    Ok(Json(state.db.medicines().low_stock().await?))
}

async fn create_medicine(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<NewMedicine>,
) -> ApiResult<(StatusCode, Json<Medicine>)> {
    actor.require(Action::ManageCatalog)?;

    let medicine = state.db.medicines().create(&payload).await?;
    actor
        .audit(&state, "medicine.create", "medicine", &medicine.id, Some(medicine.name.clone()))
        .await;

    Ok((StatusCode::CREATED, Json(medicine)))
}

async fn update_medicine(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<MedicineUpdate>,
) -> ApiResult<Json<Medicine>> {
    actor.require(Action::ManageCatalog)?;

    let medicine = state
        .db
        .medicines()
        .update(&id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Medicine", &id))?;
    actor.audit(&state, "medicine.update", "medicine", &id, None).await;

    Ok(Json(medicine))
}

// =============================================================================
// Batches
// =============================================================================

async fn list_batches(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Batch>>> {
    Ok(Json(state.db.batches().list_by_medicine(&id).await?))
}

/// Sellable batches in FEFO order.
async fn available_batches(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Batch>>> {
    Ok(Json(state.db.batches().available(&id).await?))
}

async fn get_batch(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<Batch>> {
    state
        .db
        .batches()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Batch", &id))
}

async fn create_batch(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<NewBatch>,
) -> ApiResult<(StatusCode, Json<Batch>)> {
    actor.require(Action::ManageCatalog)?;

    let batch = state.db.batches().create(&payload).await?;
    actor
        .audit(
            &state,
            "batch.create",
            "batch",
            &batch.id,
            Some(format!("{} x{}", batch.batch_number, batch.quantity)),
        )
        .await;

    Ok((StatusCode::CREATED, Json(batch)))
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

async fn set_batch_quantity(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<SetQuantityRequest>,
) -> ApiResult<Json<Batch>> {
    actor.require(Action::AdjustStock)?;

    let batch = state
        .db
        .batches()
        .set_quantity(&id, payload.quantity)
        .await?
        .ok_or_else(|| ApiError::not_found("Batch", &id))?;
    actor
        .audit(&state, "batch.set_quantity", "batch", &id, Some(format!("quantity={}", batch.quantity)))
        .await;

    Ok(Json(batch))
}

#[derive(Debug, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

async fn expiring_batches(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<ExpiringQuery>,
) -> ApiResult<Json<Vec<ExpiringBatch>>> {
    let days = query.days.unwrap_or(state.config.inventory.expiry_warning_days);
    validate_expiry_window(days).map_err(|e| ApiError::validation(e.to_string()))?;

    Ok(Json(state.db.batches().expiring(days).await?))
}

// =============================================================================
// Stock Adjustments
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentQuery {
    pub medicine_id: Option<String>,
}

async fn list_adjustments(
    State(state): State<AppState>,
    _actor: Actor,
    Query(query): Query<AdjustmentQuery>,
) -> ApiResult<Json<Vec<StockAdjustment>>> {
    let adjustments = state.db.stock_adjustments();

    let list = match query.medicine_id {
        Some(medicine_id) => adjustments.list_by_medicine(&medicine_id).await?,
        None => adjustments.list().await?,
    };
    Ok(Json(list))
}

async fn create_adjustment(
    State(state): State<AppState>,
    actor: Actor,
    Json(mut payload): Json<NewStockAdjustment>,
) -> ApiResult<(StatusCode, Json<AppliedAdjustment>)> {
    actor.require(Action::AdjustStock)?;

    payload.user_id = Some(actor.user.id.clone());
    let applied = state.db.stock_adjustments().create(&payload).await?;

    actor
        .audit(
            &state,
            "stock.adjust",
            "batch",
            &applied.adjustment.batch_id,
            Some(format!(
                "{} {} -> {}",
                applied.adjustment.adjustment_type, applied.adjustment.quantity, applied.batch_quantity
            )),
        )
        .await;

    Ok((StatusCode::CREATED, Json(applied)))
}
