//! # Audit Log Repository
//!
//! Append-only. Rows are never updated or deleted.

use chrono::Utc;
use medora_core::{AuditLog, AuditLogEntry, NewAuditLog, ValidationError, DEFAULT_AUDIT_LOG_LIMIT};
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

impl AuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        AuditLogRepository { pool }
    }

    pub async fn append(&self, entry: &NewAuditLog) -> DbResult<AuditLog> {
        if entry.action.trim().is_empty() {
            return Err(ValidationError::required("action").into());
        }

        let log = AuditLog {
            id: generate_id(),
            user_id: entry.user_id.clone(),
            action: entry.action.clone(),
            entity_type: entry.entity_type.clone(),
            entity_id: entry.entity_id.clone(),
            details: entry.details.clone(),
            created_at: Utc::now(),
        };

        debug!(
            action = %log.action,
            entity_type = ?log.entity_type,
            entity_id = ?log.entity_id,
            "Appending audit log"
        );

        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, user_id, action, entity_type, entity_id, details, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(&log.action)
        .bind(&log.entity_type)
        .bind(&log.entity_id)
        .bind(&log.details)
        .bind(log.created_at)
        .execute(&self.pool)
        .await?;

        Ok(log)
    }

    /// Newest entries first, with the acting user's name. `None` uses the
    /// default limit of 100.
    pub async fn list(&self, limit: Option<i64>) -> DbResult<Vec<AuditLogEntry>> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_AUDIT_LOG_LIMIT);

        let entries = sqlx::query_as::<_, AuditLogEntry>(
            r#"
            SELECT a.*, u.name AS user_name
            FROM audit_logs a
            LEFT JOIN users u ON u.id = a.user_id
            ORDER BY a.created_at DESC, a.rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
