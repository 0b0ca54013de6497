//! Order repository: the webhook's writes and all order reads.
//!
//! Orders are written exactly once, by the webhook handler, keyed on the
//! gateway order id. Duplicate webhook deliveries (a normal occurrence for
//! payment gateways) land on the `gateway_order_id` unique constraint and are
//! reported as [`RecordOutcome::AlreadyRecorded`] rather than as errors.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use canteen_core::{Cart, GatewayOrderId, ItemId, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, OrderLine};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    gateway_order_id: String,
    user_id: String,
    user_email: String,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<OrderStatus>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            gateway_order_id: GatewayOrderId::new(row.gateway_order_id),
            user_id: UserId::new(row.user_id),
            user_email: row.user_email,
            status,
            created_at: row.created_at,
            items: Vec::new(),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    order_id: Uuid,
    item_id: i32,
    qty: i32,
    price: Decimal,
    name: Option<String>,
    image_url: Option<String>,
}

impl TryFrom<OrderLineRow> for OrderLine {
    type Error = RepositoryError;

    fn try_from(row: OrderLineRow) -> Result<Self, Self::Error> {
        let qty = u32::try_from(row.qty).map_err(|_| {
            RepositoryError::DataCorruption(format!("negative qty in order line: {}", row.qty))
        })?;

        Ok(Self {
            item_id: ItemId::new(row.item_id),
            name: row.name,
            image_url: row.image_url,
            qty,
            price: row.price,
        })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Outcome of recording a captured payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// A new order row (and its line items) were written.
    Recorded(OrderId),
    /// An order for this gateway order id already exists; nothing was written.
    AlreadyRecorded,
}

/// Today's performance numbers for the staff dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct OrderStats {
    pub revenue_today: Decimal,
    pub orders_today: i64,
    pub average_order: Decimal,
    pub pending_orders: i64,
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a captured payment: insert one order row plus one line per cart
    /// entry, in a single transaction.
    ///
    /// Idempotent on `gateway_order_id`: a redelivered webhook finds the
    /// unique constraint and returns [`RecordOutcome::AlreadyRecorded`]
    /// without writing anything.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either insert fails; the
    /// transaction rolls back so a retried delivery starts clean.
    pub async fn record_captured_payment(
        &self,
        gateway_order_id: &GatewayOrderId,
        user_id: &UserId,
        user_email: &str,
        cart: &Cart,
    ) -> Result<RecordOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let inserted: Option<(Uuid,)> = sqlx::query_as(
            r"
            INSERT INTO orders (gateway_order_id, user_id, user_email, status)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (gateway_order_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(gateway_order_id.as_str())
        .bind(user_id.as_str())
        .bind(user_email)
        .bind(OrderStatus::Pending.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some((order_id,)) = inserted else {
            tx.rollback().await?;
            return Ok(RecordOutcome::AlreadyRecorded);
        };

        for entry in cart.entries() {
            sqlx::query(
                r"
                INSERT INTO order_items (order_id, item_id, qty, price)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(order_id)
            .bind(entry.item.id.as_i32())
            .bind(i32::try_from(entry.qty).unwrap_or(i32::MAX))
            .bind(entry.item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(RecordOutcome::Recorded(OrderId::new(order_id)))
    }

    /// Probe for a webhook-recorded order by its gateway order id.
    ///
    /// This is the reconciliation poll's query: cheap, index-backed, and
    /// read-only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists_by_gateway_id(
        &self,
        gateway_order_id: &GatewayOrderId,
    ) -> Result<Option<OrderId>, RepositoryError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM orders WHERE gateway_order_id = $1")
                .bind(gateway_order_id.as_str())
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(id,)| OrderId::new(id)))
    }

    /// List a user's orders, newest first, with their line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, gateway_order_id, user_id, user_email, status, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(user_id.as_str())
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// List every order, newest first, with line items (staff view).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            r"
            SELECT id, gateway_order_id, user_id, user_email, status, created_at
            FROM orders
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        self.attach_lines(rows).await
    }

    /// Update an order's status (staff transition).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
            .bind(order_id.as_uuid())
            .bind(status.as_str())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Today's revenue, order count, average order value, and pending count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn stats_today(&self) -> Result<OrderStats, RepositoryError> {
        let (revenue, orders, pending): (Decimal, i64, i64) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(oi.price * oi.qty), 0) AS revenue,
                   COUNT(DISTINCT o.id) AS orders,
                   COUNT(DISTINCT o.id) FILTER (WHERE o.status = 'Pending') AS pending
            FROM orders o
            LEFT JOIN order_items oi ON oi.order_id = o.id
            WHERE o.created_at >= date_trunc('day', now())
            ",
        )
        .fetch_one(self.pool)
        .await?;

        let average = if orders > 0 {
            revenue / Decimal::from(orders)
        } else {
            Decimal::ZERO
        };

        Ok(OrderStats {
            revenue_today: revenue,
            orders_today: orders,
            average_order: average,
            pending_orders: pending,
        })
    }

    /// Fetch line items for a batch of orders and attach them in place.
    async fn attach_lines(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<_, _>>()?;

        if orders.is_empty() {
            return Ok(orders);
        }

        let ids: Vec<Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT oi.order_id, oi.item_id, oi.qty, oi.price,
                   fi.name, fi.image_url
            FROM order_items oi
            LEFT JOIN food_items fi ON fi.id = oi.item_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id ASC
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            let order_id = row.order_id;
            let line = OrderLine::try_from(row)?;
            by_order.entry(order_id).or_default().push(line);
        }

        for order in &mut orders {
            if let Some(lines) = by_order.remove(&order.id.as_uuid()) {
                order.items = lines;
            }
        }

        Ok(orders)
    }
}
