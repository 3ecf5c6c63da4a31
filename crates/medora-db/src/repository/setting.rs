//! # Setting Repository
//!
//! Key/value store settings (`store.name`, `receipt.footer`, ...). Values
//! are opaque strings; callers decide the format.

use chrono::Utc;
use medora_core::validation::validate_setting_key;
use medora_core::Setting;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct SettingRepository {
    pool: SqlitePool,
}

impl SettingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingRepository { pool }
    }

    pub async fn list(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>("SELECT * FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;

        Ok(settings)
    }

    pub async fn get(&self, key: &str) -> DbResult<Option<Setting>> {
        let setting = sqlx::query_as::<_, Setting>("SELECT * FROM settings WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(setting)
    }

    /// Inserts or replaces a setting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<Setting> {
        validate_setting_key(key)?;

        let setting = Setting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        };

        debug!(key = %key, "Saving setting");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(&setting.key)
        .bind(&setting.value)
        .bind(setting.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(setting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::test_db;

    #[tokio::test]
    async fn test_set_is_upsert() {
        let db = test_db().await;
        let settings = db.settings();

        settings.set("store.name", "Old Name").await.unwrap();
        settings.set("store.name", "Medora Pharmacy").await.unwrap();
        settings.set("receipt.footer", "Get well soon").await.unwrap();

        let stored = settings.get("store.name").await.unwrap().unwrap();
        assert_eq!(stored.value, "Medora Pharmacy");

        let keys: Vec<String> = settings.list().await.unwrap().into_iter().map(|s| s.key).collect();
        assert_eq!(keys, vec!["receipt.footer", "store.name"]);
        assert!(settings.get("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bad_key_rejected() {
        let db = test_db().await;
        assert!(db.settings().set("bad key", "x").await.is_err());
    }
}
