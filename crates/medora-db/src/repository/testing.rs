//! Fixtures shared by the repository tests.

use chrono::NaiveDate;
use medora_core::{Batch, Medicine, NewBatch, NewMedicine};

use crate::pool::{Database, DbConfig};

pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) async fn medicine(db: &Database, name: &str, reorder_level: i64) -> Medicine {
    db.medicines()
        .create(&NewMedicine {
            name: name.to_string(),
            unit_price_cents: 500,
            reorder_level: Some(reorder_level),
            ..Default::default()
        })
        .await
        .unwrap()
}

pub(crate) async fn batch(
    db: &Database,
    medicine_id: &str,
    batch_number: &str,
    quantity: i64,
    expiry_date: NaiveDate,
) -> Batch {
    db.batches()
        .create(&NewBatch {
            medicine_id: medicine_id.to_string(),
            batch_number: batch_number.to_string(),
            quantity,
            expiry_date,
            manufacture_date: None,
            purchase_price_cents: 300,
            selling_price_cents: 450,
            supplier_id: None,
        })
        .await
        .unwrap()
}
