//! # Stock Adjustment Repository
//!
//! Manual corrections to a batch: recount surplus, breakage, expiry
//! write-offs, customer returns.
//!
//! ## Apply Flow
//! ```text
//! BEGIN
//!  ├── SELECT batch            (missing → NotFound)
//!  ├── INSERT stock_adjustments (medicine_id copied from the batch)
//!  ├── UPDATE batches
//!  │     add / return          → quantity + n
//!  │     remove/damage/expired → MAX(quantity - n, 0)
//!  └── SELECT quantity
//! COMMIT
//! ```

use chrono::{DateTime, Utc};
use medora_core::inventory::adjusted_quantity;
use medora_core::validation::validate_quantity;
use medora_core::{AppliedAdjustment, Batch, NewStockAdjustment, StockAdjustment};
use sqlx::SqlitePool;
use tracing::info;

use super::generate_id;
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct StockAdjustmentRepository {
    pool: SqlitePool,
}

impl StockAdjustmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        StockAdjustmentRepository { pool }
    }

    /// All adjustments, newest first.
    pub async fn list(&self) -> DbResult<Vec<StockAdjustment>> {
        let adjustments = sqlx::query_as::<_, StockAdjustment>(
            "SELECT * FROM stock_adjustments ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(adjustments)
    }

    /// Adjustments of one medicine, newest first.
    pub async fn list_by_medicine(&self, medicine_id: &str) -> DbResult<Vec<StockAdjustment>> {
        let adjustments = sqlx::query_as::<_, StockAdjustment>(
            "SELECT * FROM stock_adjustments WHERE medicine_id = ?1 ORDER BY created_at DESC",
        )
        .bind(medicine_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(adjustments)
    }

    pub async fn create(&self, input: &NewStockAdjustment) -> DbResult<AppliedAdjustment> {
        self.create_at(input, Utc::now()).await
    }

    /// Records an adjustment and applies it to the batch atomically.
    ///
    /// ## Errors
    /// - `NotFound` for an unknown batch
    /// - `Core(Validation)` for a non-positive quantity
    pub async fn create_at(
        &self,
        input: &NewStockAdjustment,
        now: DateTime<Utc>,
    ) -> DbResult<AppliedAdjustment> {
        validate_quantity(input.quantity)?;

        let mut tx = self.pool.begin().await?;

        let batch = sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = ?1")
            .bind(&input.batch_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Batch", input.batch_id.clone()))?;

        let adjustment = StockAdjustment {
            id: generate_id(),
            batch_id: batch.id.clone(),
            medicine_id: batch.medicine_id.clone(),
            adjustment_type: input.adjustment_type,
            quantity: input.quantity,
            reason: input.reason.clone(),
            user_id: input.user_id.clone(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO stock_adjustments (
                id, batch_id, medicine_id, adjustment_type,
                quantity, reason, user_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&adjustment.id)
        .bind(&adjustment.batch_id)
        .bind(&adjustment.medicine_id)
        .bind(adjustment.adjustment_type)
        .bind(adjustment.quantity)
        .bind(&adjustment.reason)
        .bind(&adjustment.user_id)
        .bind(adjustment.created_at)
        .execute(&mut *tx)
        .await?;

        let update = if adjustment.adjustment_type.is_increase() {
            "UPDATE batches SET quantity = quantity + ?2, updated_at = ?3 WHERE id = ?1"
        } else {
            "UPDATE batches SET quantity = MAX(quantity - ?2, 0), updated_at = ?3 WHERE id = ?1"
        };

        sqlx::query(update)
            .bind(&batch.id)
            .bind(adjustment.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        let batch_quantity: i64 = sqlx::query_scalar("SELECT quantity FROM batches WHERE id = ?1")
            .bind(&batch.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            batch_id = %batch.id,
            kind = %adjustment.adjustment_type,
            quantity = adjustment.quantity,
            before = batch.quantity,
            after = batch_quantity,
            "Stock adjusted"
        );
        debug_assert_eq!(
            batch_quantity,
            adjusted_quantity(batch.quantity, adjustment.adjustment_type, adjustment.quantity)
        );

        Ok(AppliedAdjustment {
            adjustment,
            batch_quantity,
        })
    }
}
