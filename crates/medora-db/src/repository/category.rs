//! # Category Repository

use chrono::Utc;
use medora_core::validation::validate_name;
use medora_core::{Category, NewCategory};
use sqlx::SqlitePool;
use tracing::debug;

use super::generate_id;
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    /// Creates a category. Names are unique.
    pub async fn create(&self, input: &NewCategory) -> DbResult<Category> {
        validate_name(&input.name)?;

        let category = Category {
            id: generate_id(),
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            created_at: Utc::now(),
        };

        debug!(id = %category.id, name = %category.name, "Creating category");

        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, category.name.clone()),
            other => other,
        })?;

        Ok(category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::test_db;

    #[tokio::test]
    async fn test_create_and_list_sorted() {
        let db = test_db().await;
        let categories = db.categories();

        for name in ["Vitamins", "Analgesics", "Antibiotics"] {
            categories
                .create(&NewCategory {
                    name: name.to_string(),
                    description: None,
                })
                .await
                .unwrap();
        }

        let names: Vec<String> = categories.list().await.unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Analgesics", "Antibiotics", "Vitamins"]);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = test_db().await;
        let input = NewCategory {
            name: "Antacids".to_string(),
            description: None,
        };
        db.categories().create(&input).await.unwrap();

        let err = db.categories().create(&input).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }
}
