//! # Invoice Repository
//!
//! Billing. Creating an invoice is one transaction: number, resolve lines,
//! deduct stock, write header and items.
//!
//! ## Invoice Creation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create(invoice, items)                               │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │   │                                                                     │
//! │   ├── 1. number  = INV<store date> + (count of today's prefix + 1)     │
//! │   │                                                                     │
//! │   ├── 2. for each item                                                 │
//! │   │      ├── batchId given? → that batch (must belong to medicine)     │
//! │   │      └── otherwise      → FEFO allocation over sellable batches    │
//! │   │      price = item price | batch selling price | medicine price     │
//! │   │      UPDATE batches SET quantity = MAX(quantity - n, 0)            │
//! │   │                                                                     │
//! │   ├── 3. totals: subtotal, discount clamped to [0, subtotal], total    │
//! │   ├── 4. INSERT invoices                                               │
//! │   └── 5. INSERT invoice_items (one row per batch touched)              │
//! │   │                                                                     │
//! │  COMMIT   (any error before this point rolls everything back)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use medora_core::inventory::{allocate_fefo, deducted_quantity};
use medora_core::invoice::{format_invoice_number, invoice_prefix, InvoiceTotals};
use medora_core::validation::validate_invoice_items;
use medora_core::{
    Batch, CoreError, DailySales, Invoice, InvoiceItem, InvoiceLine, InvoiceWithItems, Medicine,
    Money, NewInvoice, NewInvoiceItem, StoreCalendar,
};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};

use super::generate_id;
use crate::error::DbResult;

/// Repository for invoice database operations.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
    calendar: StoreCalendar,
}

/// A line after batch resolution, before it is written.
struct ResolvedLine {
    medicine: Medicine,
    batch: Batch,
    quantity: i64,
    unit_price_cents: i64,
}

impl InvoiceRepository {
    pub fn new(pool: SqlitePool, calendar: StoreCalendar) -> Self {
        InvoiceRepository { pool, calendar }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All invoices, newest first.
    pub async fn list(&self) -> DbResult<Vec<Invoice>> {
        let invoices = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(invoices)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let invoice = sqlx::query_as::<_, Invoice>("SELECT * FROM invoices WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// An invoice with its lines, each joined with the medicine name, brand
    /// and batch number.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<InvoiceWithItems>> {
        let Some(invoice) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, InvoiceLine>(
            r#"
            SELECT ii.*, m.name AS medicine_name, m.brand AS brand, b.batch_number AS batch_number
            FROM invoice_items ii
            INNER JOIN medicines m ON m.id = ii.medicine_id
            INNER JOIN batches b ON b.id = ii.batch_id
            WHERE ii.invoice_id = ?1
            ORDER BY ii.rowid
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(InvoiceWithItems { invoice, items }))
    }

    /// The number the next invoice would receive right now.
    ///
    /// Only a preview: the number is assigned again inside the creating
    /// transaction.
    pub async fn next_number(&self) -> DbResult<String> {
        self.next_number_at(Utc::now()).await
    }

    pub async fn next_number_at(&self, now: DateTime<Utc>) -> DbResult<String> {
        let date = self.calendar.local_date(now);
        let count = count_with_prefix(&self.pool, &invoice_prefix(date)).await?;
        Ok(format_invoice_number(date, sequence_after(count)))
    }

    /// Bill count, revenue, discount and average bill for a store-local day.
    pub async fn daily_sales(&self, date: NaiveDate) -> DbResult<DailySales> {
        let (start, end) = self.calendar.day_bounds(date);

        let sales = sqlx::query_as::<_, DailySales>(
            r#"
            SELECT
                COUNT(*) AS total_bills,
                COALESCE(SUM(total_cents), 0) AS total_revenue_cents,
                COALESCE(SUM(discount_cents), 0) AS total_discount_cents,
                CAST(COALESCE(ROUND(AVG(total_cents)), 0) AS INTEGER) AS avg_bill_value_cents
            FROM invoices
            WHERE created_at >= ?1 AND created_at < ?2
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_one(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Revenue of the rolling window `[now - days, now]`.
    pub async fn revenue_since(&self, now: DateTime<Utc>, days: i64) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0) FROM invoices WHERE created_at >= ?1 AND created_at <= ?2",
        )
        .bind(now - Duration::days(days))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    // =========================================================================
    // Create
    // =========================================================================

    /// Creates an invoice and deducts its stock atomically.
    pub async fn create(
        &self,
        invoice: &NewInvoice,
        items: &[NewInvoiceItem],
    ) -> DbResult<InvoiceWithItems> {
        self.create_at(invoice, items, Utc::now()).await
    }

    /// [`create`](Self::create) with an explicit clock.
    ///
    /// ## Errors
    /// - `Core(Validation)` for an empty item list, bad quantities or
    ///   prices, or totals that do not fit in `i64`
    /// - `Core(MedicineNotFound | BatchNotFound | BatchMedicineMismatch)`
    /// - `Core(InsufficientStock)` when FEFO allocation cannot cover a line
    /// - `UniqueViolation` if a concurrent bill took the same number
    pub async fn create_at(
        &self,
        invoice: &NewInvoice,
        items: &[NewInvoiceItem],
        now: DateTime<Utc>,
    ) -> DbResult<InvoiceWithItems> {
        validate_invoice_items(items)?;

        let today = self.calendar.local_date(now);
        let mut tx = self.pool.begin().await?;

        let count = count_with_prefix(&mut *tx, &invoice_prefix(today)).await?;
        let invoice_number = format_invoice_number(today, sequence_after(count));

        debug!(invoice_number = %invoice_number, items = items.len(), "Creating invoice");

        let mut lines: Vec<ResolvedLine> = Vec::with_capacity(items.len());
        for item in items {
            let resolved = resolve_item(&mut tx, item, today).await?;
            for line in &resolved {
                deduct(&mut tx, &line.batch, line.quantity, now).await?;
            }
            lines.extend(resolved);
        }

        let line_totals = lines
            .iter()
            .map(|l| Money::from_cents(l.unit_price_cents).multiply_quantity(l.quantity))
            .collect::<Result<Vec<_>, _>>()?;
        let totals = InvoiceTotals::compute(
            line_totals.iter().copied(),
            Money::from_cents(invoice.discount_cents),
        )?;

        let header = Invoice {
            id: generate_id(),
            invoice_number,
            customer_name: invoice.customer_name.clone(),
            customer_phone: invoice.customer_phone.clone(),
            subtotal_cents: totals.subtotal.cents(),
            discount_cents: totals.discount.cents(),
            total_cents: totals.total.cents(),
            payment_method: invoice.payment_method,
            user_id: invoice.user_id.clone(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO invoices (
                id, invoice_number, customer_name, customer_phone,
                subtotal_cents, discount_cents, total_cents,
                payment_method, user_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&header.id)
        .bind(&header.invoice_number)
        .bind(&header.customer_name)
        .bind(&header.customer_phone)
        .bind(header.subtotal_cents)
        .bind(header.discount_cents)
        .bind(header.total_cents)
        .bind(header.payment_method)
        .bind(&header.user_id)
        .bind(header.created_at)
        .execute(&mut *tx)
        .await?;

        let mut written = Vec::with_capacity(lines.len());
        for (line, line_total) in lines.into_iter().zip(line_totals) {
            let item = InvoiceItem {
                id: generate_id(),
                invoice_id: header.id.clone(),
                medicine_id: line.medicine.id.clone(),
                batch_id: line.batch.id.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                line_total_cents: line_total.cents(),
            };

            sqlx::query(
                r#"
                INSERT INTO invoice_items (
                    id, invoice_id, medicine_id, batch_id,
                    quantity, unit_price_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
            )
            .bind(&item.id)
            .bind(&item.invoice_id)
            .bind(&item.medicine_id)
            .bind(&item.batch_id)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .execute(&mut *tx)
            .await?;

            written.push(InvoiceLine {
                item,
                medicine_name: line.medicine.name,
                brand: line.medicine.brand,
                batch_number: line.batch.batch_number,
            });
        }

        tx.commit().await?;

        info!(
            id = %header.id,
            invoice_number = %header.invoice_number,
            total_cents = header.total_cents,
            lines = written.len(),
            "Invoice created"
        );

        Ok(InvoiceWithItems {
            invoice: header,
            items: written,
        })
    }
}

// =============================================================================
// Transaction Helpers
// =============================================================================

fn sequence_after(count: i64) -> u32 {
    u32::try_from(count.saturating_add(1)).unwrap_or(u32::MAX)
}

async fn count_with_prefix<'e, E>(executor: E, prefix: &str) -> DbResult<i64>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM invoices WHERE invoice_number LIKE ?1")
        .bind(format!("{}%", prefix))
        .fetch_one(executor)
        .await?;

    Ok(count)
}

/// Turns a requested item into one or more batch lines.
async fn resolve_item(
    tx: &mut Transaction<'_, Sqlite>,
    item: &NewInvoiceItem,
    today: NaiveDate,
) -> DbResult<Vec<ResolvedLine>> {
    let medicine = sqlx::query_as::<_, Medicine>("SELECT * FROM medicines WHERE id = ?1")
        .bind(&item.medicine_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| CoreError::MedicineNotFound(item.medicine_id.clone()))?;

    let price_for = |batch: &Batch| -> i64 {
        item.unit_price_cents.unwrap_or(if batch.selling_price_cents > 0 {
            batch.selling_price_cents
        } else {
            medicine.unit_price_cents
        })
    };

    if let Some(batch_id) = &item.batch_id {
        let batch = sqlx::query_as::<_, Batch>("SELECT * FROM batches WHERE id = ?1")
            .bind(batch_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| CoreError::BatchNotFound(batch_id.clone()))?;

        if batch.medicine_id != medicine.id {
            return Err(CoreError::BatchMedicineMismatch {
                batch_id: batch.id.clone(),
                medicine_id: medicine.id.clone(),
            }
            .into());
        }

        if batch.quantity < item.quantity {
            warn!(
                batch_id = %batch.id,
                on_hand = batch.quantity,
                requested = item.quantity,
                "Selling more than recorded stock; batch will be clamped at zero"
            );
        }
        if batch.is_expired(today) {
            warn!(batch_id = %batch.id, expiry = %batch.expiry_date, "Selling from an expired batch");
        }

        let unit_price_cents = price_for(&batch);
        return Ok(vec![ResolvedLine {
            medicine,
            batch,
            quantity: item.quantity,
            unit_price_cents,
        }]);
    }

    let batches = sqlx::query_as::<_, Batch>(
        "SELECT * FROM batches WHERE medicine_id = ?1 ORDER BY expiry_date, batch_number",
    )
    .bind(&medicine.id)
    .fetch_all(&mut **tx)
    .await?;

    let allocations = allocate_fefo(&batches, &medicine.name, item.quantity, today)?;

    let lines = allocations
        .into_iter()
        .map(|allocation| ResolvedLine {
            medicine: medicine.clone(),
            batch: allocation.batch.clone(),
            quantity: allocation.quantity,
            unit_price_cents: price_for(allocation.batch),
        })
        .collect();

    Ok(lines)
}

/// Atomic clamped deduction.
async fn deduct(
    tx: &mut Transaction<'_, Sqlite>,
    batch: &Batch,
    quantity: i64,
    now: DateTime<Utc>,
) -> DbResult<()> {
    debug!(
        batch_id = %batch.id,
        quantity,
        expected_after = deducted_quantity(batch.quantity, quantity),
        "Deducting stock"
    );

    sqlx::query("UPDATE batches SET quantity = MAX(quantity - ?2, 0), updated_at = ?3 WHERE id = ?1")
        .bind(&batch.id)
        .bind(quantity)
        .bind(now)
        .execute(&mut **tx)
        .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::testing::{batch, date, medicine, test_db};
    use chrono::TimeZone;
    use medora_core::PaymentMethod;

    fn item(medicine_id: &str, batch_id: Option<&str>, quantity: i64) -> NewInvoiceItem {
        NewInvoiceItem {
            medicine_id: medicine_id.to_string(),
            batch_id: batch_id.map(str::to_string),
            quantity,
            unit_price_cents: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_explicit_batch_deducts_stock() {
        let db = test_db().await;
        let med = medicine(&db, "Paracetamol 500mg", 5).await;
        let lot = batch(&db, &med.id, "PCM-1", 10, date(2030, 1, 1)).await;

        let created = db
            .invoices()
            .create(&NewInvoice::default(), &[item(&med.id, Some(&lot.id), 3)])
            .await
            .unwrap();

        let after = db.batches().get_by_id(&lot.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 7);

        assert_eq!(created.items.len(), 1);
        assert_eq!(created.items[0].item.unit_price_cents, 450);
        assert_eq!(created.invoice.subtotal_cents, 1350);
        assert_eq!(created.invoice.total_cents, 1350);
        assert_eq!(created.invoice.payment_method, PaymentMethod::Cash);
    }

    #[tokio::test]
    async fn test_sequential_numbers_per_day() {
        let db = test_db().await;
        let med = medicine(&db, "Cetirizine", 5).await;
        let lot = batch(&db, &med.id, "CTZ-1", 100, date(2030, 1, 1)).await;
        let invoices = db.invoices();
        let lines = [item(&med.id, Some(&lot.id), 1)];

        let first = invoices
            .create_at(&NewInvoice::default(), &lines, at(2026, 10, 19, 9))
            .await
            .unwrap();
        let second = invoices
            .create_at(&NewInvoice::default(), &lines, at(2026, 10, 19, 15))
            .await
            .unwrap();
        let next_day = invoices
            .create_at(&NewInvoice::default(), &lines, at(2026, 10, 20, 9))
            .await
            .unwrap();

        assert_eq!(first.invoice.invoice_number, "INV202610190001");
        assert_eq!(second.invoice.invoice_number, "INV202610190002");
        assert_eq!(next_day.invoice.invoice_number, "INV202610200001");
        assert_eq!(
            invoices.next_number_at(at(2026, 10, 19, 20)).await.unwrap(),
            "INV202610190003"
        );
    }

    #[tokio::test]
    async fn test_number_follows_store_calendar() {
        let calendar = StoreCalendar::from_offset_minutes(345).unwrap();
        let db = Database::new(DbConfig::in_memory().calendar(calendar)).await.unwrap();
        let med = medicine(&db, "Cetirizine", 5).await;
        let lot = batch(&db, &med.id, "CTZ-1", 100, date(2030, 1, 1)).await;

        // 18:45Z on the 19th is already 00:30 on the 20th at UTC+05:45.
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 18, 45, 0).unwrap();
        let created = db
            .invoices()
            .create_at(&NewInvoice::default(), &[item(&med.id, Some(&lot.id), 1)], now)
            .await
            .unwrap();

        assert_eq!(created.invoice.invoice_number, "INV202610200001");
        let sales = db.invoices().daily_sales(date(2026, 10, 20)).await.unwrap();
        assert_eq!(sales.total_bills, 1);
        let sales = db.invoices().daily_sales(date(2026, 10, 19)).await.unwrap();
        assert_eq!(sales.total_bills, 0);
    }

    #[tokio::test]
    async fn test_fefo_allocation_splits_lines() {
        let db = test_db().await;
        let med = medicine(&db, "Amoxicillin 250mg", 5).await;
        let early = batch(&db, &med.id, "AMX-EARLY", 8, date(2030, 1, 1)).await;
        let late = batch(&db, &med.id, "AMX-LATE", 40, date(2031, 1, 1)).await;

        let created = db
            .invoices()
            .create(&NewInvoice::default(), &[item(&med.id, None, 15)])
            .await
            .unwrap();

        assert_eq!(created.items.len(), 2);
        assert_eq!(created.items[0].batch_number, "AMX-EARLY");
        assert_eq!(created.items[0].item.quantity, 8);
        assert_eq!(created.items[1].item.quantity, 7);

        let early = db.batches().get_by_id(&early.id).await.unwrap().unwrap();
        let late = db.batches().get_by_id(&late.id).await.unwrap().unwrap();
        assert_eq!(early.quantity, 0);
        assert_eq!(late.quantity, 33);
    }

    #[tokio::test]
    async fn test_two_fefo_lines_same_medicine_see_earlier_deduction() {
        let db = test_db().await;
        let med = medicine(&db, "ORS", 5).await;
        let first = batch(&db, &med.id, "ORS-A", 5, date(2030, 1, 1)).await;
        batch(&db, &med.id, "ORS-B", 5, date(2031, 1, 1)).await;

        let created = db
            .invoices()
            .create(
                &NewInvoice::default(),
                &[item(&med.id, None, 4), item(&med.id, None, 4)],
            )
            .await
            .unwrap();

        let batches: Vec<&str> = created.items.iter().map(|l| l.batch_number.as_str()).collect();
        assert_eq!(batches, vec!["ORS-A", "ORS-A", "ORS-B"]);
        assert_eq!(db.batches().get_by_id(&first.id).await.unwrap().unwrap().quantity, 0);
        assert_eq!(db.medicines().total_stock(&med.id).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_failing_item_rolls_back_everything() {
        let db = test_db().await;
        let med = medicine(&db, "Metformin 500mg", 5).await;
        let lot = batch(&db, &med.id, "MET-1", 10, date(2030, 1, 1)).await;

        let err = db
            .invoices()
            .create(
                &NewInvoice::default(),
                &[
                    item(&med.id, Some(&lot.id), 3),
                    item(&med.id, Some("no-such-batch"), 1),
                ],
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::BatchNotFound(_))));

        let after = db.batches().get_by_id(&lot.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 10);
        assert!(db.invoices().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back() {
        let db = test_db().await;
        let med = medicine(&db, "Losartan", 5).await;
        let lot = batch(&db, &med.id, "LOS-1", 4, date(2030, 1, 1)).await;

        let err = db
            .invoices()
            .create(&NewInvoice::default(), &[item(&med.id, None, 5)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Core(CoreError::InsufficientStock {
                available: 4,
                requested: 5,
                ..
            })
        ));
        assert_eq!(db.batches().get_by_id(&lot.id).await.unwrap().unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn test_oversized_price_rejected_without_writes() {
        let db = test_db().await;
        let med = medicine(&db, "Insulin Glargine", 5).await;
        let lot = batch(&db, &med.id, "INS-1", 10, date(2030, 1, 1)).await;

        let line = NewInvoiceItem {
            unit_price_cents: Some(i64::MAX),
            ..item(&med.id, Some(&lot.id), 2)
        };
        let err = db
            .invoices()
            .create(&NewInvoice::default(), &[line])
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert_eq!(db.batches().get_by_id(&lot.id).await.unwrap().unwrap().quantity, 10);
        assert!(db.invoices().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_largest_price_bills_without_overflow() {
        let db = test_db().await;
        let med = medicine(&db, "Insulin Glargine", 5).await;
        let lot = batch(&db, &med.id, "INS-1", 9_999, date(2030, 1, 1)).await;

        let line = NewInvoiceItem {
            unit_price_cents: Some(medora_core::MAX_PRICE_CENTS),
            ..item(&med.id, Some(&lot.id), 9_999)
        };
        let created = db
            .invoices()
            .create(&NewInvoice::default(), &[line])
            .await
            .unwrap();

        assert_eq!(
            created.invoice.total_cents,
            medora_core::MAX_PRICE_CENTS * 9_999
        );
    }

    #[tokio::test]
    async fn test_explicit_batch_oversell_clamps_to_zero() {
        let db = test_db().await;
        let med = medicine(&db, "Vitamin C", 5).await;
        let lot = batch(&db, &med.id, "VC-1", 2, date(2030, 1, 1)).await;

        db.invoices()
            .create(&NewInvoice::default(), &[item(&med.id, Some(&lot.id), 5)])
            .await
            .unwrap();

        assert_eq!(db.batches().get_by_id(&lot.id).await.unwrap().unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_batch_of_other_medicine_rejected() {
        let db = test_db().await;
        let med = medicine(&db, "Aspirin", 5).await;
        let other = medicine(&db, "Ibuprofen", 5).await;
        let lot = batch(&db, &other.id, "IBU-1", 10, date(2030, 1, 1)).await;

        let err = db
            .invoices()
            .create(&NewInvoice::default(), &[item(&med.id, Some(&lot.id), 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::BatchMedicineMismatch { .. })));
    }

    #[tokio::test]
    async fn test_discount_clamped_and_prices_default() {
        let db = test_db().await;
        let med = medicine(&db, "Syrup", 5).await;
        let unpriced = db
            .batches()
            .create(&medora_core::NewBatch {
                medicine_id: med.id.clone(),
                batch_number: "SY-1".to_string(),
                quantity: 10,
                expiry_date: date(2030, 1, 1),
                manufacture_date: None,
                purchase_price_cents: 100,
                selling_price_cents: 0,
                supplier_id: None,
            })
            .await
            .unwrap();

        let created = db
            .invoices()
            .create(
                &NewInvoice {
                    discount_cents: 5_000,
                    ..Default::default()
                },
                &[item(&med.id, Some(&unpriced.id), 2)],
            )
            .await
            .unwrap();

        // medicine price (500) used when the batch has no selling price
        assert_eq!(created.invoice.subtotal_cents, 1000);
        assert_eq!(created.invoice.discount_cents, 1000);
        assert_eq!(created.invoice.total_cents, 0);
    }

    #[tokio::test]
    async fn test_get_with_items_and_daily_sales() {
        let db = test_db().await;
        let med = medicine(&db, "Azithromycin", 5).await;
        let lot = batch(&db, &med.id, "AZ-1", 50, date(2030, 1, 1)).await;
        let invoices = db.invoices();

        let mut line = item(&med.id, Some(&lot.id), 2);
        line.unit_price_cents = Some(1000);
        let first = invoices
            .create_at(
                &NewInvoice {
                    discount_cents: 200,
                    customer_name: Some("Walk-in".to_string()),
                    ..Default::default()
                },
                &[line.clone()],
                at(2026, 10, 19, 10),
            )
            .await
            .unwrap();
        invoices
            .create_at(&NewInvoice::default(), &[line], at(2026, 10, 19, 11))
            .await
            .unwrap();

        let loaded = invoices.get_with_items(&first.invoice.id).await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].medicine_name, "Azithromycin");
        assert_eq!(loaded.items[0].batch_number, "AZ-1");

        let sales = invoices.daily_sales(date(2026, 10, 19)).await.unwrap();
        assert_eq!(
            sales,
            DailySales {
                total_bills: 2,
                total_revenue_cents: 3800,
                total_discount_cents: 200,
                avg_bill_value_cents: 1900,
            }
        );

        let list = invoices.list().await.unwrap();
        assert_ne!(list[0].id, first.invoice.id);
        assert!(invoices.get_with_items("missing").await.unwrap().is_none());
    }
}
