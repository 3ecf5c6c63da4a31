//! # Supplier Repository

use chrono::Utc;
use medora_core::validation::validate_name;
use medora_core::{NewSupplier, Supplier, SupplierUpdate};
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::DbResult;

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// All suppliers (active or not) ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Supplier>> {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(suppliers)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let supplier = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    pub async fn create(&self, input: &NewSupplier) -> DbResult<Supplier> {
        validate_name(&input.name)?;

        let now = Utc::now();
        let supplier = Supplier {
            id: generate_id(),
            name: input.name.trim().to_string(),
            contact_person: input.contact_person.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            tax_id: input.tax_id.clone(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %supplier.id, name = %supplier.name, "Creating supplier");

        sqlx::query(
            r#"
            INSERT INTO suppliers (
                id, name, contact_person, phone, email, address, tax_id,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.tax_id)
        .bind(supplier.is_active)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(supplier)
    }

    /// Partial update; `None` fields keep their value.
    pub async fn update(&self, id: &str, update: &SupplierUpdate) -> DbResult<Option<Supplier>> {
        if let Some(name) = &update.name {
            validate_name(name)?;
        }

        debug!(id = %id, "Updating supplier");

        let result = sqlx::query(
            r#"
            UPDATE suppliers SET
                name = COALESCE(?2, name),
                contact_person = COALESCE(?3, contact_person),
                phone = COALESCE(?4, phone),
                email = COALESCE(?5, email),
                address = COALESCE(?6, address),
                tax_id = COALESCE(?7, tax_id),
                is_active = COALESCE(?8, is_active),
                updated_at = ?9
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(update.name.as_deref().map(str::trim))
        .bind(&update.contact_person)
        .bind(&update.phone)
        .bind(&update.email)
        .bind(&update.address)
        .bind(&update.tax_id)
        .bind(update.is_active)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_by_id(id).await
    }

    /// Active suppliers, for the dashboard.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
