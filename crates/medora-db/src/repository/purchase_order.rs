//! # Purchase Order Repository
//!
//! Orders placed with suppliers. The header and its lines are written in
//! one transaction; status changes go through the transition rules in
//! [`medora_core::purchase`].

use chrono::{DateTime, Utc};
use medora_core::validation::validate_purchase_order_items;
use medora_core::{
    Money, NewPurchaseOrder, NewPurchaseOrderItem, PurchaseOrder, PurchaseOrderItem,
    PurchaseOrderStatus, PurchaseOrderWithItems, ValidationError,
};
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::generate_id;
use crate::error::DbResult;

/// Repository for purchase order database operations.
#[derive(Debug, Clone)]
pub struct PurchaseOrderRepository {
    pool: SqlitePool,
}

impl PurchaseOrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PurchaseOrderRepository { pool }
    }

    /// All purchase orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<PurchaseOrder>> {
        let orders = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PurchaseOrder>> {
        let order = sqlx::query_as::<_, PurchaseOrder>("SELECT * FROM purchase_orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(order)
    }

    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<PurchaseOrderWithItems>> {
        let Some(order) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            "SELECT * FROM purchase_order_items WHERE purchase_order_id = ?1 ORDER BY rowid",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(PurchaseOrderWithItems { order, items }))
    }

    /// Creates an order in `pending` with its lines. The total is the sum of
    /// `quantity * unit_cost` over the lines.
    pub async fn create(
        &self,
        order: &NewPurchaseOrder,
        items: &[NewPurchaseOrderItem],
    ) -> DbResult<PurchaseOrderWithItems> {
        if order.supplier_id.trim().is_empty() {
            return Err(ValidationError::required("supplierId").into());
        }
        validate_purchase_order_items(items)?;

        let now = Utc::now();
        let order_id = generate_id();

        let lines = items
            .iter()
            .map(|item| -> DbResult<PurchaseOrderItem> {
                let line_total =
                    Money::from_cents(item.unit_cost_cents).multiply_quantity(item.quantity)?;
                Ok(PurchaseOrderItem {
                    id: generate_id(),
                    purchase_order_id: order_id.clone(),
                    medicine_id: item.medicine_id.clone(),
                    quantity: item.quantity,
                    unit_cost_cents: item.unit_cost_cents,
                    line_total_cents: line_total.cents(),
                })
            })
            .collect::<DbResult<Vec<_>>>()?;

        let total = Money::try_sum(lines.iter().map(|l| Money::from_cents(l.line_total_cents)))?;

        let header = PurchaseOrder {
            id: order_id,
            supplier_id: order.supplier_id.clone(),
            status: PurchaseOrderStatus::Pending,
            total_cents: total.cents(),
            notes: order.notes.clone(),
            created_by: order.created_by.clone(),
            created_at: now,
            updated_at: now,
            received_at: None,
        };

        debug!(id = %header.id, supplier_id = %header.supplier_id, lines = lines.len(), "Creating purchase order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO purchase_orders (
                id, supplier_id, status, total_cents, notes,
                created_by, created_at, updated_at, received_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&header.id)
        .bind(&header.supplier_id)
        .bind(header.status)
        .bind(header.total_cents)
        .bind(&header.notes)
        .bind(&header.created_by)
        .bind(header.created_at)
        .bind(header.updated_at)
        .bind(header.received_at)
        .execute(&mut *tx)
        .await?;

        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_order_items (
                    id, purchase_order_id, medicine_id,
                    quantity, unit_cost_cents, line_total_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&line.id)
            .bind(&line.purchase_order_id)
            .bind(&line.medicine_id)
            .bind(line.quantity)
            .bind(line.unit_cost_cents)
            .bind(line.line_total_cents)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(id = %header.id, total_cents = header.total_cents, "Purchase order created");

        Ok(PurchaseOrderWithItems {
            order: header,
            items: lines,
        })
    }

    /// Moves an order to `status`. Returns `Ok(None)` for an unknown id.
    pub async fn update_status(
        &self,
        id: &str,
        status: PurchaseOrderStatus,
    ) -> DbResult<Option<PurchaseOrder>> {
        self.update_status_at(id, status, Utc::now()).await
    }

    /// Moving to `received` stamps `received_at`.
    ///
    /// ## Errors
    /// `Core(InvalidStatusTransition)` when the move is not allowed,
    /// including setting the current status again.
    pub async fn update_status_at(
        &self,
        id: &str,
        status: PurchaseOrderStatus,
        now: DateTime<Utc>,
    ) -> DbResult<Option<PurchaseOrder>> {
        let mut tx = self.pool.begin().await?;

        let current: Option<PurchaseOrderStatus> =
            sqlx::query_scalar("SELECT status FROM purchase_orders WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let next = current.transition(status)?;
        let received_at = (next == PurchaseOrderStatus::Received).then_some(now);

        sqlx::query(
            r#"
            UPDATE purchase_orders SET
                status = ?2,
                updated_at = ?3,
                received_at = COALESCE(?4, received_at)
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(next)
        .bind(now)
        .bind(received_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(id = %id, from = %current, to = %next, "Purchase order status changed");

        self.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::repository::testing::{medicine, test_db};
    use crate::pool::Database;
    use medora_core::{CoreError, NewSupplier};

    async fn supplier(db: &Database) -> String {
        db.suppliers()
            .create(&NewSupplier {
                name: "Everest Pharma".to_string(),
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    async fn order(db: &Database) -> PurchaseOrderWithItems {
        let supplier_id = supplier(db).await;
        let med = medicine(db, "Paracetamol 500mg", 10).await;

        db.purchase_orders()
            .create(
                &NewPurchaseOrder {
                    supplier_id,
                    notes: Some("Monthly restock".to_string()),
                    created_by: None,
                },
                &[
                    NewPurchaseOrderItem {
                        medicine_id: med.id.clone(),
                        quantity: 100,
                        unit_cost_cents: 120,
                    },
                    NewPurchaseOrderItem {
                        medicine_id: med.id,
                        quantity: 10,
                        unit_cost_cents: 50,
                    },
                ],
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_computes_total() {
        let db = test_db().await;
        let created = order(&db).await;

        assert_eq!(created.order.status, PurchaseOrderStatus::Pending);
        assert_eq!(created.order.total_cents, 12_500);
        assert_eq!(created.items.len(), 2);

        let loaded = db
            .purchase_orders()
            .get_with_items(&created.order.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.items[0].line_total_cents, 12_000);
    }

    #[tokio::test]
    async fn test_receive_stamps_received_at() {
        let db = test_db().await;
        let created = order(&db).await;
        let orders = db.purchase_orders();

        let ordered = orders
            .update_status(&created.order.id, PurchaseOrderStatus::Ordered)
            .await
            .unwrap()
            .unwrap();
        assert!(ordered.received_at.is_none());

        let received = orders
            .update_status(&created.order.id, PurchaseOrderStatus::Received)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(received.status, PurchaseOrderStatus::Received);
        assert!(received.received_at.is_some());
    }

    #[tokio::test]
    async fn test_invalid_transition_rejected() {
        let db = test_db().await;
        let created = order(&db).await;
        let orders = db.purchase_orders();

        orders
            .update_status(&created.order.id, PurchaseOrderStatus::Cancelled)
            .await
            .unwrap();

        let err = orders
            .update_status(&created.order.id, PurchaseOrderStatus::Received)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Core(CoreError::InvalidStatusTransition { .. })));

        let unchanged = orders.get_by_id(&created.order.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, PurchaseOrderStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let db = test_db().await;
        let result = db
            .purchase_orders()
            .update_status("missing", PurchaseOrderStatus::Ordered)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_oversized_unit_cost_rejected() {
        let db = test_db().await;
        let supplier_id = supplier(&db).await;
        let med = medicine(&db, "Ranitidine", 10).await;

        let err = db
            .purchase_orders()
            .create(
                &NewPurchaseOrder {
                    supplier_id,
                    ..Default::default()
                },
                &[NewPurchaseOrderItem {
                    medicine_id: med.id,
                    quantity: 2,
                    unit_cost_cents: i64::MAX,
                }],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::Core(CoreError::Validation(_))));
        assert!(db.purchase_orders().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_supplier_rolls_back() {
        let db = test_db().await;
        let med = medicine(&db, "Ranitidine", 10).await;

        let err = db
            .purchase_orders()
            .create(
                &NewPurchaseOrder {
                    supplier_id: "no-such-supplier".to_string(),
                    ..Default::default()
                },
                &[NewPurchaseOrderItem {
                    medicine_id: med.id,
                    quantity: 5,
                    unit_cost_cents: 10,
                }],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert!(db.purchase_orders().list().await.unwrap().is_empty());
    }
}
