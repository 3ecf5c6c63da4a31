//! # Batch Repository
//!
//! Lots of a medicine, each with its own quantity and expiry date.
//!
//! ## Expiry Windows
//! ```text
//!            today                      today + days
//!  ────────────┼─────────────────────────────┼──────────────►  expiry_date
//!   expired    │  expiring (qty > 0)          │   fine
//!   (not sold) │  sellable, flagged on        │
//!              │  the dashboard               │
//! ```
//! "Today" is the store-local date from the [`StoreCalendar`]. A batch whose
//! expiry date is today is still available.

use chrono::{Duration, NaiveDate, Utc};
use medora_core::validation::{validate_expiry_window, validate_new_batch};
use medora_core::{Batch, ExpiringBatch, NewBatch, StoreCalendar};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::generate_id;
use crate::error::{DbError, DbResult};

/// Repository for batch database operations.
#[derive(Debug, Clone)]
pub struct BatchRepository {
    pool: SqlitePool,
    calendar: StoreCalendar,
}

impl BatchRepository {
    pub fn new(pool: SqlitePool, calendar: StoreCalendar) -> Self {
        BatchRepository { pool, calendar }
    }

    fn today(&self) -> NaiveDate {
        self.calendar.local_date(Utc::now())
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Batch>> {
        let batch = sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(batch)
    }

    /// Every batch of a medicine in FEFO order, including expired and
    /// empty ones.
    pub async fn list_by_medicine(&self, medicine_id: &str) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(
            "SELECT * FROM batches WHERE medicine_id = ?1 ORDER BY expiry_date, batch_number",
        )
        .bind(medicine_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Sellable batches of a medicine in FEFO order.
    pub async fn available(&self, medicine_id: &str) -> DbResult<Vec<Batch>> {
        self.available_on(medicine_id, self.today()).await
    }

    /// Sellable batches as of `today`: quantity ≥ 1 and expiry ≥ today,
    /// earliest expiry first.
    pub async fn available_on(&self, medicine_id: &str, today: NaiveDate) -> DbResult<Vec<Batch>> {
        let batches = sqlx::query_as::<_, Batch>(
            r#"
            SELECT * FROM batches
            WHERE medicine_id = ?1
              AND quantity >= 1
              AND expiry_date >= ?2
            ORDER BY expiry_date, batch_number
            "#,
        )
        .bind(medicine_id)
        .bind(today)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }

    /// Receives a new batch.
    ///
    /// ## Errors
    /// - `Core(Validation)` for bad lot numbers, negative quantities or
    ///   a manufacture date after expiry
    /// - `UniqueViolation` when the lot number exists for this medicine
    /// - `ForeignKeyViolation` for an unknown medicine or supplier
    pub async fn create(&self, input: &NewBatch) -> DbResult<Batch> {
        validate_new_batch(input)?;

        let now = Utc::now();
        let batch = Batch {
            id: generate_id(),
            medicine_id: input.medicine_id.clone(),
            batch_number: input.batch_number.trim().to_string(),
            quantity: input.quantity,
            expiry_date: input.expiry_date,
            manufacture_date: input.manufacture_date,
            purchase_price_cents: input.purchase_price_cents,
            selling_price_cents: input.selling_price_cents,
            supplier_id: input.supplier_id.clone(),
            created_at: now,
            updated_at: now,
        };

        debug!(
            id = %batch.id,
            medicine_id = %batch.medicine_id,
            batch_number = %batch.batch_number,
            quantity = batch.quantity,
            expiry = %batch.expiry_date,
            "Creating batch"
        );

        sqlx::query(
            r#"
            INSERT INTO batches (
                id, medicine_id, batch_number, quantity, expiry_date,
                manufacture_date, purchase_price_cents, selling_price_cents,
                supplier_id, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&batch.id)
        .bind(&batch.medicine_id)
        .bind(&batch.batch_number)
        .bind(batch.quantity)
        .bind(batch.expiry_date)
        .bind(batch.manufacture_date)
        .bind(batch.purchase_price_cents)
        .bind(batch.selling_price_cents)
        .bind(&batch.supplier_id)
        .bind(batch.created_at)
        .bind(batch.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::duplicate("batch_number", batch.batch_number.clone())
            }
            other => other,
        })?;

        Ok(batch)
    }

    /// Sets a batch quantity after a physical count. Negative input is
    /// stored as zero. Returns `Ok(None)` for an unknown batch.
    pub async fn set_quantity(&self, id: &str, quantity: i64) -> DbResult<Option<Batch>> {
        let quantity = quantity.max(0);

        info!(id = %id, quantity, "Setting batch quantity");

        let result = sqlx::query("UPDATE batches SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(quantity)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// In-stock batches expiring within `days` of today.
    pub async fn expiring(&self, days: i64) -> DbResult<Vec<ExpiringBatch>> {
        self.expiring_on(self.today(), days).await
    }

    /// In-stock batches with `today <= expiry <= today + days`, soonest
    /// first, with the medicine name and brand.
    pub async fn expiring_on(&self, today: NaiveDate, days: i64) -> DbResult<Vec<ExpiringBatch>> {
        validate_expiry_window(days)?;
        let horizon = today + Duration::days(days);

        let batches = sqlx::query_as::<_, ExpiringBatch>(
            r#"
            SELECT b.*, m.name AS medicine_name, m.brand AS brand
            FROM batches b
            INNER JOIN medicines m ON m.id = b.medicine_id
            WHERE b.quantity > 0
              AND b.expiry_date >= ?1
              AND b.expiry_date <= ?2
            ORDER BY b.expiry_date, m.name
            "#,
        )
        .bind(today)
        .bind(horizon)
        .fetch_all(&self.pool)
        .await?;

        Ok(batches)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{batch, date, medicine, test_db};

    #[tokio::test]
    async fn test_available_is_fefo_and_skips_expired_and_empty() {
        let db = test_db().await;
        let med = medicine(&db, "Paracetamol 500mg", 10).await;
        let today = date(2026, 10, 19);

        batch(&db, &med.id, "B-12", 40, date(2027, 3, 31)).await;
        batch(&db, &med.id, "B-07", 20, date(2026, 9, 30)).await;
        batch(&db, &med.id, "B-09", 0, date(2026, 11, 1)).await;
        batch(&db, &med.id, "B-11", 8, today).await;

        let available = db.batches().available_on(&med.id, today).await.unwrap();
        let numbers: Vec<&str> = available.iter().map(|b| b.batch_number.as_str()).collect();

        assert_eq!(numbers, vec!["B-11", "B-12"]);
        assert!(available.iter().all(|b| b.quantity >= 1 && b.expiry_date >= today));

        let all = db.batches().list_by_medicine(&med.id).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].batch_number, "B-07");
    }

    #[tokio::test]
    async fn test_expiring_window() {
        let db = test_db().await;
        let med = medicine(&db, "Amoxicillin 250mg", 10).await;
        let today = date(2026, 10, 19);

        batch(&db, &med.id, "SOON", 5, date(2026, 11, 10)).await;
        batch(&db, &med.id, "EDGE", 5, date(2026, 11, 18)).await;
        batch(&db, &med.id, "LATER", 5, date(2026, 11, 19)).await;
        batch(&db, &med.id, "GONE", 5, date(2026, 10, 18)).await;
        batch(&db, &med.id, "EMPTY", 0, date(2026, 11, 1)).await;

        let expiring = db.batches().expiring_on(today, 30).await.unwrap();
        let numbers: Vec<&str> = expiring.iter().map(|b| b.batch.batch_number.as_str()).collect();

        assert_eq!(numbers, vec!["SOON", "EDGE"]);
        assert_eq!(expiring[0].medicine_name, "Amoxicillin 250mg");
    }

    #[tokio::test]
    async fn test_set_quantity_clamps() {
        let db = test_db().await;
        let med = medicine(&db, "ORS", 10).await;
        let created = batch(&db, &med.id, "ORS-1", 10, date(2030, 1, 1)).await;

        let updated = db.batches().set_quantity(&created.id, -3).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 0);

        let updated = db.batches().set_quantity(&created.id, 25).await.unwrap().unwrap();
        assert_eq!(updated.quantity, 25);

        assert!(db.batches().set_quantity("missing", 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_batch_number_per_medicine() {
        let db = test_db().await;
        let med = medicine(&db, "Zinc", 10).await;
        let other = medicine(&db, "Iron", 10).await;

        batch(&db, &med.id, "LOT-1", 10, date(2030, 1, 1)).await;
        batch(&db, &other.id, "LOT-1", 10, date(2030, 1, 1)).await;

        let err = db
            .batches()
            .create(&NewBatch {
                medicine_id: med.id.clone(),
                batch_number: "LOT-1".to_string(),
                quantity: 1,
                expiry_date: date(2030, 1, 1),
                manufacture_date: None,
                purchase_price_cents: 0,
                selling_price_cents: 0,
                supplier_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_medicine_rejected() {
        let db = test_db().await;
        let err = db
            .batches()
            .create(&NewBatch {
                medicine_id: "550e8400-e29b-41d4-a716-446655440000".to_string(),
                batch_number: "X-1".to_string(),
                quantity: 1,
                expiry_date: date(2030, 1, 1),
                manufacture_date: None,
                purchase_price_cents: 0,
                selling_price_cents: 0,
                supplier_id: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }
}
