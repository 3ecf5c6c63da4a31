//! # Medicine Repository
//!
//! Catalog CRUD, counter search and the low-stock report.
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Query "para"                                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name LIKE '%para%'          ── "Paracip 500"                          │
//! │  generic_name LIKE '%para%'  ── "Calpol" (Paracetamol)                 │
//! │  brand LIKE '%para%'                                                   │
//! │  barcode = 'para'            ── scanner input matches exactly          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ORDER BY name LIMIT 50                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! LIKE is case-insensitive for ASCII in SQLite. `%` and `_` typed by the
//! user are escaped and match literally.

use chrono::Utc;
use medora_core::validation::{
    validate_barcode, validate_name, validate_new_medicine, validate_price_cents,
    validate_reorder_level, validate_search_query,
};
use medora_core::{
    Medicine, MedicineStock, MedicineUpdate, NewMedicine, DEFAULT_REORDER_LEVEL,
    SEARCH_RESULT_LIMIT,
};
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};

/// Repository for medicine database operations.
#[derive(Debug, Clone)]
pub struct MedicineRepository {
    pool: SqlitePool,
}

impl MedicineRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MedicineRepository { pool }
    }

    /// All medicines ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Medicine>> {
        let medicines = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(medicines)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Medicine>> {
        let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(medicine)
    }

    /// Exact barcode lookup for the scanner.
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Medicine>> {
        let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE barcode = ?1")
            .bind(barcode.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(medicine)
    }

    /// Case-insensitive substring search over name, generic name and brand,
    /// or an exact barcode match. At most 50 rows.
    pub async fn search(&self, query: &str) -> DbResult<Vec<Medicine>> {
        let query = validate_search_query(query)?;

        if query.is_empty() {
            return Ok(Vec::new());
        }

        let pattern = format!("%{}%", escape_like(&query));

        debug!(query = %query, "Searching medicines");

        let medicines = sqlx::query_as::<_, Medicine>(
            r#"
            SELECT * FROM medicines
            WHERE name LIKE ?1 ESCAPE '\'
               OR generic_name LIKE ?1 ESCAPE '\'
               OR brand LIKE ?1 ESCAPE '\'
               OR barcode = ?2
            ORDER BY name
            LIMIT ?3
            "#,
        )
        .bind(&pattern)
        .bind(&query)
        .bind(SEARCH_RESULT_LIMIT)
        .fetch_all(&self.pool)
        .await?;

        Ok(medicines)
    }

    pub async fn create(&self, input: &NewMedicine) -> DbResult<Medicine> {
        validate_new_medicine(input)?;

        let now = Utc::now();
        let medicine = Medicine {
            id: generate_id(),
            name: input.name.trim().to_string(),
            generic_name: input.generic_name.clone(),
            brand: input.brand.clone(),
            barcode: input.barcode.as_deref().map(|b| b.trim().to_string()),
            category_id: input.category_id.clone(),
            dosage_form: input.dosage_form.clone(),
            strength: input.strength.clone(),
            unit_price_cents: input.unit_price_cents,
            reorder_level: input.reorder_level.unwrap_or(DEFAULT_REORDER_LEVEL),
            requires_prescription: input.requires_prescription,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %medicine.id, name = %medicine.name, "Creating medicine");

        sqlx::query(
            r#"
            INSERT INTO medicines (
                id, name, generic_name, brand, barcode, category_id,
                dosage_form, strength, unit_price_cents, reorder_level,
                requires_prescription, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&medicine.id)
        .bind(&medicine.name)
        .bind(&medicine.generic_name)
        .bind(&medicine.brand)
        .bind(&medicine.barcode)
        .bind(&medicine.category_id)
        .bind(&medicine.dosage_form)
        .bind(&medicine.strength)
        .bind(medicine.unit_price_cents)
        .bind(medicine.reorder_level)
        .bind(medicine.requires_prescription)
        .bind(medicine.is_active)
        .bind(medicine.created_at)
        .bind(medicine.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| barcode_conflict(e, medicine.barcode.as_deref()))?;

        Ok(medicine)
    }

    /// Partial update. Nullable columns cannot be cleared through this call.
    pub async fn update(&self, id: &str, update: &MedicineUpdate) -> DbResult<Option<Medicine>> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }
        if let Some(barcode) = &update.barcode {
            validate_barcode(barcode)?;
        }
        if let Some(price) = update.unit_price_cents {
            validate_price_cents(price)?;
        }
        if let Some(level) = update.reorder_level {
            validate_reorder_level(level)?;
        }

        debug!(id = %id, "Updating medicine");

        let result = sqlx::query(
            r#"
            UPDATE medicines SET
                name = COALESCE(?2, name),
                generic_name = COALESCE(?3, generic_name),
                brand = COALESCE(?4, brand),
                barcode = COALESCE(?5, barcode),
                category_id = COALESCE(?6, category_id),
                dosage_form = COALESCE(?7, dosage_form),
                strength = COALESCE(?8, strength),
                unit_price_cents = COALESCE(?9, unit_price_cents),
                reorder_level = COALESCE(?10, reorder_level),
                requires_prescription = COALESCE(?11, requires_prescription),
                is_active = COALESCE(?12, is_active),
                updated_at = ?13
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.generic_name)
        .bind(&update.brand)
        .bind(update.barcode.as_deref().map(str::trim))
        .bind(&update.category_id)
        .bind(&update.dosage_form)
        .bind(&update.strength)
        .bind(update.unit_price_cents)
        .bind(update.reorder_level)
        .bind(update.requires_prescription)
        .bind(update.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| barcode_conflict(e, update.barcode.as_deref()))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Active medicines whose total batch quantity is at or below their
    /// reorder level, lowest stock first.
    pub async fn low_stock(&self) -> DbResult<Vec<MedicineStock>> {
        let rows = sqlx::query_as::<_, MedicineStock>(
            r#"
            SELECT m.*, COALESCE(SUM(b.quantity), 0) AS total_stock
            FROM medicines m
            LEFT JOIN batches b ON b.medicine_id = m.id
            WHERE m.is_active = 1
            GROUP BY m.id
            HAVING COALESCE(SUM(b.quantity), 0) <= m.reorder_level
            ORDER BY total_stock ASC, m.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Total quantity across all batches of one medicine.
    pub async fn total_stock(&self, id: &str) -> DbResult<i64> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM batches WHERE medicine_id = ?1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;

        Ok(total)
    }

    /// Active medicines, for the dashboard.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn barcode_conflict(err: sqlx::Error, barcode: Option<&str>) -> DbError {
    match DbError::from(err) {
        DbError::UniqueViolation { field, .. } => {
            DbError::duplicate(field, barcode.unwrap_or_default())
        }
        other => other,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{batch, date, medicine, test_db};

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[tokio::test]
    async fn test_create_defaults_reorder_level() {
        let db = test_db().await;
        let created = db
            .medicines()
            .create(&NewMedicine {
                name: "Cetirizine 10mg".to_string(),
                unit_price_cents: 250,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(created.reorder_level, DEFAULT_REORDER_LEVEL);
        assert!(created.is_active);
    }

    #[tokio::test]
    async fn test_search_matches_name_generic_brand_and_barcode() {
        let db = test_db().await;
        let medicines = db.medicines();

        medicines
            .create(&NewMedicine {
                name: "Calpol 500".to_string(),
                generic_name: Some("Paracetamol".to_string()),
                brand: Some("GSK".to_string()),
                barcode: Some("8901234567890".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        medicines
            .create(&NewMedicine {
                name: "Amoxil 250".to_string(),
                generic_name: Some("Amoxicillin".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(medicines.search("PARACET").await.unwrap().len(), 1);
        assert_eq!(medicines.search("gsk").await.unwrap().len(), 1);
        assert_eq!(medicines.search("8901234567890").await.unwrap().len(), 1);
        assert_eq!(medicines.search("0").await.unwrap().len(), 2);
        assert!(medicines.search("%").await.unwrap().is_empty());
        assert!(medicines.search("  ").await.unwrap().is_empty());

        let found = medicines.get_by_barcode("8901234567890").await.unwrap().unwrap();
        assert_eq!(found.name, "Calpol 500");
    }

    #[tokio::test]
    async fn test_low_stock_threshold() {
        let db = test_db().await;
        let low = medicine(&db, "Low Med", 5).await;
        let ok = medicine(&db, "Fine Med", 5).await;
        let empty = medicine(&db, "Empty Med", 5).await;

        batch(&db, &low.id, "L-1", 4, date(2030, 1, 1)).await;
        batch(&db, &ok.id, "F-1", 6, date(2030, 1, 1)).await;

        let report = db.medicines().low_stock().await.unwrap();
        let ids: Vec<&str> = report.iter().map(|r| r.medicine.id.as_str()).collect();

        assert_eq!(ids, vec![empty.id.as_str(), low.id.as_str()]);
        assert_eq!(report[0].total_stock, 0);
        assert_eq!(report[1].total_stock, 4);
    }

    #[tokio::test]
    async fn test_low_stock_skips_inactive() {
        let db = test_db().await;
        let retired = medicine(&db, "Retired", 5).await;

        db.medicines()
            .update(
                &retired.id,
                &MedicineUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(db.medicines().low_stock().await.unwrap().is_empty());
        assert_eq!(db.medicines().count_active().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_update_partial() {
        let db = test_db().await;
        let med = medicine(&db, "Omeprazole 20mg", 10).await;

        let updated = db
            .medicines()
            .update(
                &med.id,
                &MedicineUpdate {
                    unit_price_cents: Some(1200),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.unit_price_cents, 1200);
        assert_eq!(updated.name, "Omeprazole 20mg");
        assert!(db
            .medicines()
            .update("missing", &MedicineUpdate::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_barcode() {
        let db = test_db().await;
        let input = NewMedicine {
            name: "Pantop 40".to_string(),
            barcode: Some("PANT-40".to_string()),
            ..Default::default()
        };
        db.medicines().create(&input).await.unwrap();

        let err = db.medicines().create(&input).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
