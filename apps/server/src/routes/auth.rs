//! Login and first-owner registration. No `X-User-Id` required.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use medora_core::{NewUser, User};
use serde::Deserialize;
use tracing::{info, warn};

use crate::actor::record;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<User>> {
    if payload.username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::validation("Username and password are required"));
    }

    match state
        .db
        .users()
        .verify_credentials(&payload.username, &payload.password)
        .await?
    {
        Some(user) => {
            info!(user_id = %user.id, "User logged in");
            record(&state, Some(&user.id), "auth.login", "user", &user.id, None).await;
            Ok(Json(user))
        }
        None => {
            warn!(username = %payload.username, "Failed login attempt");
            Err(ApiError::unauthorized("Invalid username or password"))
        }
    }
}

/// Creates the first account, always as owner. Closed once any user exists.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state
        .db
        .users()
        .create_first_owner(&payload)
        .await?
        .ok_or_else(|| {
            ApiError::forbidden("Registration is closed; ask the owner for an account")
        })?;

    info!(user_id = %user.id, username = %user.username, "Owner account registered");
    record(&state, Some(&user.id), "user.register", "user", &user.id, None).await;

    Ok((StatusCode::CREATED, Json(user)))
}
