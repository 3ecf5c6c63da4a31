//! # Dashboard Repository
//!
//! Read-only composition of the other repositories into the home-screen
//! summary.
//!
//! ```text
//! stats_at(now)
//!   ├── invoices.daily_sales(local today)
//!   ├── invoices.revenue_since(now, 7) / (now, 30)
//!   ├── medicines.low_stock()          → count + first N
//!   ├── batches.expiring_on(today, d)  → count + first N
//!   └── medicines.count_active() / suppliers.count_active()
//! ```

use chrono::{DateTime, Utc};
use medora_core::{DashboardStats, StoreCalendar, DASHBOARD_PREVIEW_LIMIT, EXPIRY_WARNING_DAYS};
use sqlx::SqlitePool;
use tracing::debug;

use super::{BatchRepository, InvoiceRepository, MedicineRepository, SupplierRepository};
use crate::error::DbResult;

/// Knobs for the dashboard, usually taken from the `[inventory]` config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardOptions {
    /// Batches expiring within this many days are flagged.
    pub expiry_warning_days: i64,
    /// Rows kept in each preview list.
    pub preview_limit: usize,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        DashboardOptions {
            expiry_warning_days: EXPIRY_WARNING_DAYS,
            preview_limit: DASHBOARD_PREVIEW_LIMIT,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
    calendar: StoreCalendar,
}

impl DashboardRepository {
    pub fn new(pool: SqlitePool, calendar: StoreCalendar) -> Self {
        DashboardRepository { pool, calendar }
    }

    pub async fn stats(&self, options: DashboardOptions) -> DbResult<DashboardStats> {
        self.stats_at(Utc::now(), options).await
    }

    pub async fn stats_at(
        &self,
        now: DateTime<Utc>,
        options: DashboardOptions,
    ) -> DbResult<DashboardStats> {
        let today = self.calendar.local_date(now);

        let invoices = InvoiceRepository::new(self.pool.clone(), self.calendar);
        let medicines = MedicineRepository::new(self.pool.clone());
        let batches = BatchRepository::new(self.pool.clone(), self.calendar);
        let suppliers = SupplierRepository::new(self.pool.clone());

        let today_sales = invoices.daily_sales(today).await?;
        let weekly_sales_cents = invoices.revenue_since(now, 7).await?;
        let monthly_sales_cents = invoices.revenue_since(now, 30).await?;

        let mut low_stock_items = medicines.low_stock().await?;
        let low_stock_count = low_stock_items.len() as i64;
        low_stock_items.truncate(options.preview_limit);

        let mut expiring_items = batches.expiring_on(today, options.expiry_warning_days).await?;
        let expiring_count = expiring_items.len() as i64;
        expiring_items.truncate(options.preview_limit);

        let total_medicines = medicines.count_active().await?;
        let total_suppliers = suppliers.count_active().await?;

        debug!(
            %today,
            bills = today_sales.total_bills,
            low_stock_count,
            expiring_count,
            "Dashboard stats computed"
        );

        Ok(DashboardStats {
            today_sales,
            weekly_sales_cents,
            monthly_sales_cents,
            low_stock_count,
            low_stock_items,
            expiring_count,
            expiring_items,
            total_medicines,
            total_suppliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::testing::{batch, date, medicine, test_db};
    use chrono::TimeZone;
    use medora_core::{NewInvoice, NewInvoiceItem, NewSupplier};

    #[tokio::test]
    async fn test_empty_store() {
        let db = test_db().await;
        let stats = db.dashboard().stats(DashboardOptions::default()).await.unwrap();

        assert_eq!(stats.today_sales.total_bills, 0);
        assert_eq!(stats.weekly_sales_cents, 0);
        assert_eq!(stats.low_stock_count, 0);
        assert_eq!(stats.expiring_count, 0);
        assert_eq!(stats.total_medicines, 0);
    }

    #[tokio::test]
    async fn test_counts_match_full_lists() {
        let db = test_db().await;
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
        let today = date(2026, 10, 19);

        db.suppliers()
            .create(&NewSupplier {
                name: "Himalaya Distributors".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        // Three low-stock medicines, each with a batch expiring soon.
        for (i, name) in ["Amoxicillin", "Cetirizine", "Omeprazole"].iter().enumerate() {
            let med = medicine(&db, name, 10).await;
            batch(&db, &med.id, &format!("LOT-{i}"), 4, date(2026, 11, 1)).await;
        }
        // Healthy stock, expiring far out.
        let healthy = medicine(&db, "Vitamin C", 5).await;
        batch(&db, &healthy.id, "VC-1", 100, date(2028, 1, 1)).await;

        db.invoices()
            .create_at(
                &NewInvoice::default(),
                &[NewInvoiceItem {
                    medicine_id: healthy.id.clone(),
                    batch_id: None,
                    quantity: 2,
                    unit_price_cents: None,
                }],
                now,
            )
            .await
            .unwrap();

        let options = DashboardOptions {
            expiry_warning_days: 30,
            preview_limit: 2,
        };
        let stats = db.dashboard().stats_at(now, options).await.unwrap();

        assert_eq!(stats.low_stock_count, 3);
        assert_eq!(stats.low_stock_items.len(), 2);
        assert_eq!(stats.expiring_count, 3);
        assert_eq!(stats.expiring_items.len(), 2);

        let full_low = db.medicines().low_stock().await.unwrap();
        let full_expiring = db.batches().expiring_on(today, 30).await.unwrap();
        assert_eq!(stats.low_stock_count, full_low.len() as i64);
        assert_eq!(stats.expiring_count, full_expiring.len() as i64);

        assert_eq!(stats.today_sales.total_bills, 1);
        assert_eq!(stats.today_sales.total_revenue_cents, 900);
        assert_eq!(stats.weekly_sales_cents, 900);
        assert_eq!(stats.monthly_sales_cents, 900);
        assert_eq!(stats.total_medicines, 4);
        assert_eq!(stats.total_suppliers, 1);
    }
}
