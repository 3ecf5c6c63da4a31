//! Audit log and store settings.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use medora_core::{Action, AuditLogEntry, Setting};
use serde::Deserialize;

use crate::actor::Actor;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/audit-logs", get(list_audit_logs))
        .route("/settings", get(list_settings))
        .route("/settings/{key}", get(get_setting).put(put_setting))
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

async fn list_audit_logs(
    State(state): State<AppState>,
    actor: Actor,
    Query(query): Query<AuditQuery>,
) -> ApiResult<Json<Vec<AuditLogEntry>>> {
    actor.require(Action::ViewAuditLog)?;
    Ok(Json(state.db.audit_logs().list(query.limit).await?))
}

async fn list_settings(State(state): State<AppState>, _actor: Actor) -> ApiResult<Json<Vec<Setting>>> {
    Ok(Json(state.db.settings().list().await?))
}

async fn get_setting(
    State(state): State<AppState>,
    _actor: Actor,
    Path(key): Path<String>,
) -> ApiResult<Json<Setting>> {
    state
        .db
        .settings()
        .get(&key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Setting", &key))
}

#[derive(Debug, Deserialize)]
pub struct SettingValue {
    pub value: String,
}

async fn put_setting(
    State(state): State<AppState>,
    actor: Actor,
    Path(key): Path<String>,
    Json(payload): Json<SettingValue>,
) -> ApiResult<Json<Setting>> {
    actor.require(Action::ManageSettings)?;

    let setting = state.db.settings().set(&key, &payload.value).await?;
    actor
        .audit(&state, "setting.set", "setting", &key, Some(payload.value))
        .await;

    Ok(Json(setting))
}
