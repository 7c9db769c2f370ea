//! Order repository.
//!
//! Reads go through [`OrderRepository`]. The status update runs inside a
//! transaction owned by the order service, so its steps are free functions
//! over a borrowed connection.

use std::collections::HashMap;

use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use seedmart_core::pricing::OrderQuote;
use seedmart_core::{OrderId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{BuyerSummary, InvoiceSummary, Order, OrderDetail, OrderItem};

/// A priced order, ready to insert.
#[derive(Debug)]
pub struct NewOrder<'q> {
    pub order_number: String,
    pub buyer_id: UserId,
    /// Snapshot of the buyer's state.
    pub buyer_state: &'q str,
    pub notes: &'q str,
    pub quote: &'q OrderQuote,
    /// Product for each line of `quote`, in the same order.
    pub product_ids: &'q [ProductId],
}

/// Fields an admin may change on an order.
#[derive(Debug, Clone)]
pub struct OrderUpdate {
    pub status: OrderStatus,
    pub tracking_id: Option<String>,
    pub shipping_carrier: Option<String>,
    pub shipping_details: Option<String>,
}

#[derive(sqlx::FromRow)]
struct BuyerRow {
    id: UserId,
    #[sqlx(flatten)]
    summary: BuyerSummary,
}

/// Repository for orders and order items.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert an order and its lines in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if lines and product IDs
    /// disagree in length. Returns `RepositoryError::Database` if any insert
    /// fails; nothing is written in that case.
    #[instrument(skip(self, order), fields(order_number = %order.order_number, buyer_id = %order.buyer_id))]
    pub async fn create(&self, order: &NewOrder<'_>) -> Result<Order, RepositoryError> {
        if order.quote.lines.len() != order.product_ids.len() {
            return Err(RepositoryError::DataCorruption(
                "order lines and products out of step".to_owned(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Order>(
            r"
            INSERT INTO seedmart.orders (
                order_number, buyer_id, status, total_amount, gst_amount,
                grand_total, buyer_state, notes
            )
            VALUES ($1, $2, 'pending', $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(&order.order_number)
        .bind(order.buyer_id)
        .bind(order.quote.subtotal)
        .bind(order.quote.gst_total)
        .bind(order.quote.grand_total)
        .bind(order.buyer_state)
        .bind(order.notes)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "order number"))?;

        for (line, product_id) in order.quote.lines.iter().zip(order.product_ids) {
            sqlx::query(
                r"
                INSERT INTO seedmart.order_items (
                    order_id, product_id, quantity, price_per_unit, gst_rate,
                    hsn_code, subtotal, gst_amount
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(created.id)
            .bind(*product_id)
            .bind(line.quantity)
            .bind(line.price_per_unit)
            .bind(line.gst_rate)
            .bind(&line.hsn_code)
            .bind(line.subtotal)
            .bind(line.gst_amount)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        debug!(order_id = %created.id, lines = order.product_ids.len(), "Created order");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let order = sqlx::query_as::<_, Order>(r"SELECT * FROM seedmart.orders WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(order)
    }

    /// Orders newest first; only `buyer`'s when given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, buyer: Option<UserId>) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT * FROM seedmart.orders
            WHERE ($1::int4 IS NULL OR buyer_id = $1)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(buyer)
        .fetch_all(self.pool)
        .await?;
        Ok(orders)
    }

    /// Attach buyer summary, lines and invoice summary to each order.
    ///
    /// Three queries regardless of how many orders are passed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn with_details(
        &self,
        orders: Vec<Order>,
    ) -> Result<Vec<OrderDetail>, RepositoryError> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i32> = orders.iter().map(|o| o.id.as_i32()).collect();
        let buyer_ids: Vec<i32> = orders.iter().map(|o| o.buyer_id.as_i32()).collect();

        let items = sqlx::query_as::<_, OrderItem>(
            r"
            SELECT oi.id, oi.order_id, oi.product_id, p.variety_name, p.crop_name,
                   oi.quantity, oi.price_per_unit, oi.gst_rate, oi.hsn_code,
                   oi.subtotal, oi.gst_amount
            FROM seedmart.order_items oi
            JOIN seedmart.products p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let buyers = sqlx::query_as::<_, BuyerRow>(
            r"
            SELECT id, email, company_name, state, gst_number
            FROM seedmart.users
            WHERE id = ANY($1)
            ",
        )
        .bind(&buyer_ids)
        .fetch_all(self.pool)
        .await?;

        let invoices = sqlx::query_as::<_, InvoiceSummary>(
            r"
            SELECT id, order_id, invoice_number, email_sent
            FROM seedmart.invoices
            WHERE order_id = ANY($1)
            ",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let buyers: HashMap<UserId, BuyerSummary> =
            buyers.into_iter().map(|b| (b.id, b.summary)).collect();
        let mut items_by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            items_by_order.entry(item.order_id).or_default().push(item);
        }
        let mut invoices: HashMap<OrderId, InvoiceSummary> =
            invoices.into_iter().map(|i| (i.order_id, i)).collect();

        Ok(orders
            .into_iter()
            .map(|order| OrderDetail {
                buyer: buyers.get(&order.buyer_id).cloned(),
                items: items_by_order.remove(&order.id).unwrap_or_default(),
                invoice: invoices.remove(&order.id),
                order,
            })
            .collect())
    }

    /// Load one order with its details.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any query fails.
    pub async fn get_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, RepositoryError> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };
        Ok(self.with_details(vec![order]).await?.pop())
    }

    /// Record that the approval emails went out.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_email_sent(&self, id: OrderId) -> Result<(), RepositoryError> {
        sqlx::query(r"UPDATE seedmart.orders SET email_sent = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Lock an order row for the rest of the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock(conn: &mut PgConnection, id: OrderId) -> Result<Option<Order>, RepositoryError> {
    let order = sqlx::query_as::<_, Order>(
        r"SELECT * FROM seedmart.orders WHERE id = $1 FOR UPDATE",
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Apply an admin update. Tracking fields are only overwritten when given;
/// moving to `shipped` or `delivered` stamps the matching time.
///
/// # Errors
///
/// Returns `RepositoryError::NotFound` if the order does not exist.
/// Returns `RepositoryError::Database` if the query fails.
pub async fn apply_update(
    conn: &mut PgConnection,
    id: OrderId,
    update: &OrderUpdate,
) -> Result<Order, RepositoryError> {
    sqlx::query_as::<_, Order>(
        r"
        UPDATE seedmart.orders SET
            status = $2,
            tracking_id = COALESCE($3, tracking_id),
            shipping_carrier = COALESCE($4, shipping_carrier),
            shipping_details = COALESCE($5, shipping_details),
            shipped_at = CASE WHEN $2 = 'shipped'::seedmart.order_status
                              THEN NOW() ELSE shipped_at END,
            delivered_at = CASE WHEN $2 = 'delivered'::seedmart.order_status
                                THEN NOW() ELSE delivered_at END,
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        ",
    )
    .bind(id)
    .bind(update.status)
    .bind(&update.tracking_id)
    .bind(&update.shipping_carrier)
    .bind(&update.shipping_details)
    .fetch_optional(conn)
    .await?
    .ok_or(RepositoryError::NotFound)
}
