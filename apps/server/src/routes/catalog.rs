//! Suppliers and categories.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use medora_core::{Action, Category, NewCategory, NewSupplier, Supplier, SupplierUpdate};

use crate::actor::Actor;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/suppliers", get(list_suppliers).post(create_supplier))
        .route("/suppliers/{id}", get(get_supplier).patch(update_supplier))
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/{id}", get(get_category))
}

// =============================================================================
// Suppliers
// =============================================================================

async fn list_suppliers(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<Vec<Supplier>>> {
    Ok(Json(state.db.suppliers().list().await?))
}

async fn get_supplier(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<Supplier>> {
    state
        .db
        .suppliers()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Supplier", &id))
}

async fn create_supplier(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<NewSupplier>,
) -> ApiResult<(StatusCode, Json<Supplier>)> {
    actor.require(Action::ManageSuppliers)?;

    let supplier = state.db.suppliers().create(&payload).await?;
    actor
        .audit(&state, "supplier.create", "supplier", &supplier.id, Some(supplier.name.clone()))
        .await;

    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn update_supplier(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<SupplierUpdate>,
) -> ApiResult<Json<Supplier>> {
    actor.require(Action::ManageSuppliers)?;

    let supplier = state
        .db
        .suppliers()
        .update(&id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("Supplier", &id))?;
    actor.audit(&state, "supplier.update", "supplier", &id, None).await;

    Ok(Json(supplier))
}

// =============================================================================
// Categories
// =============================================================================

async fn list_categories(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<Vec<Category>>> {
    Ok(Json(state.db.categories().list().await?))
}

async fn get_category(
    State(state): State<AppState>,
    _actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<Category>> {
    state
        .db
        .categories()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Category", &id))
}

async fn create_category(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<NewCategory>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    actor.require(Action::ManageCatalog)?;

    let category = state.db.categories().create(&payload).await?;
    actor
        .audit(&state, "category.create", "category", &category.id, Some(category.name.clone()))
        .await;

    Ok((StatusCode::CREATED, Json(category)))
}
