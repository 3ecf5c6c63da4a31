use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use medora_core::{Action, NewUser, User, UserUpdate};

use crate::actor::Actor;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(list).post(create))
        .route("/users/{id}", get(get_one).patch(update))
}

async fn list(State(state): State<AppState>, actor: Actor) -> ApiResult<Json<Vec<User>>> {
    actor.require(Action::ManageUsers)?;
    Ok(Json(state.db.users().list().await?))
}

async fn get_one(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    actor.require(Action::ManageUsers)?;
    state
        .db
        .users()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("User", &id))
}

async fn create(
    State(state): State<AppState>,
    actor: Actor,
    Json(payload): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    actor.require(Action::ManageUsers)?;

    let user = state.db.users().create(&payload).await?;
    actor
        .audit(&state, "user.create", "user", &user.id, Some(format!("role={}", user.role)))
        .await;

    Ok((StatusCode::CREATED, Json(user)))
}

async fn update(
    State(state): State<AppState>,
    actor: Actor,
    Path(id): Path<String>,
    Json(payload): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    actor.require(Action::ManageUsers)?;

    let user = state
        .db
        .users()
        .update(&id, &payload)
        .await?
        .ok_or_else(|| ApiError::not_found("User", &id))?;

    let details = payload.password.is_some().then(|| "password changed".to_string());
    actor.audit(&state, "user.update", "user", &user.id, details).await;

    Ok(Json(user))
}
