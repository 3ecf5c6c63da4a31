//! # Acting User
//!
//! Every `/api` route except login/register runs on behalf of a user named
//! by the `X-User-Id` header.
//!
//! ```text
//! X-User-Id: 7f3c…      ──► users.get_by_id ──► active? ──► Actor
//!   (missing)            ──► 401
//!   (unknown/inactive)   ──► 401
//! actor.require(Action)  ──► Role::permits ──► 403 on denial
//! ```
//!
//! Mutating handlers call [`Actor::audit`] after a successful write.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use medora_core::{Action, NewAuditLog, User};
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;

pub const USER_ID_HEADER: &str = "x-user-id";

#[derive(Debug, Clone)]
pub struct Actor {
    pub user: User,
}

impl Actor {
    /// Fails with 403 unless the actor's role permits `action`.
    pub fn require(&self, action: Action) -> Result<(), ApiError> {
        self.user.role.require(action).map_err(|e| {
            warn!(user_id = %self.user.id, role = %self.user.role, %action, "Permission denied");
            ApiError::from(e)
        })
    }

    /// Appends an audit entry for a completed mutation.
    ///
    /// The write has already committed, so a failure here is logged and
    /// does not fail the request.
    pub async fn audit(
        &self,
        state: &AppState,
        action: &str,
        entity_type: &str,
        entity_id: &str,
        details: Option<String>,
    ) {
        record(state, Some(&self.user.id), action, entity_type, entity_id, details).await;
    }
}

/// Audit entry helper shared with the unauthenticated auth routes.
pub async fn record(
    state: &AppState,
    user_id: Option<&str>,
    action: &str,
    entity_type: &str,
    entity_id: &str,
    details: Option<String>,
) {
    let entry = NewAuditLog {
        user_id: user_id.map(str::to_string),
        action: action.to_string(),
        entity_type: Some(entity_type.to_string()),
        entity_id: Some(entity_id.to_string()),
        details,
    };

    if let Err(e) = state.db.audit_logs().append(&entry).await {
        warn!(error = %e, action, entity_id, "Failed to write audit log");
    }
}

impl FromRequestParts<AppState> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Missing X-User-Id header"))?;

        let user = state
            .db
            .users()
            .get_by_id(user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| ApiError::unauthorized("Unknown or inactive user"))?;

        Ok(Actor { user })
    }
}
