//! Order placement and fulfilment.
//!
//! Prices always come from the catalogue; the client only sends product IDs
//! and quantities. The first approval of an order issues its tax invoice and,
//! for credit buyers, charges the grand total to their credit account.

use std::collections::HashMap;

use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use seedmart_core::pricing::{CreditError, PricingError, TaxSplit, check_credit, price_line, quote_order};
use seedmart_core::{
    OrderId, OrderStatus, ProductId, UserId, invoice_number, order_number, sanitize,
};

use crate::config::SellerConfig;
use crate::db::invoices::{self, NewInvoice};
use crate::db::orders::{self, NewOrder, OrderUpdate};
use crate::db::{
    InvoiceRepository, OrderRepository, ProductRepository, RepositoryError, UserRepository,
    credit, users,
};
use crate::models::{Invoice, Order, OrderDetail, User};
use crate::services::email::EmailService;

/// Errors from placing or updating an order.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("User not found")]
    BuyerNotFound,

    #[error("KYC not approved. Contact admin.")]
    KycNotApproved,

    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    #[error("Order not found")]
    OrderNotFound,

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Credit(#[from] CreditError),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One requested line.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OrderRequest {
    pub items: Vec<OrderLineRequest>,
    pub notes: Option<String>,
}

/// Order placement and status changes.
pub struct OrderService<'a> {
    pool: &'a PgPool,
    seller: &'a SellerConfig,
    email: &'a EmailService,
}

impl<'a> OrderService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, seller: &'a SellerConfig, email: &'a EmailService) -> Self {
        Self {
            pool,
            seller,
            email,
        }
    }

    /// Price and record an order for `buyer_id`.
    ///
    /// The buyer is re-read so that a KYC status or credit change since
    /// login is respected.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` for an unknown or unapproved buyer, an empty
    /// order, an unknown or inactive product, a pricing rule violation or an
    /// exceeded credit limit.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn place(
        &self,
        buyer_id: UserId,
        request: OrderRequest,
    ) -> Result<OrderDetail, OrderError> {
        let buyer = UserRepository::new(self.pool)
            .get_by_id(buyer_id)
            .await?
            .ok_or(OrderError::BuyerNotFound)?;
        if !buyer.kyc_status.is_approved() {
            return Err(OrderError::KycNotApproved);
        }
        if request.items.is_empty() {
            return Err(PricingError::EmptyOrder.into());
        }

        let product_ids: Vec<ProductId> = request.items.iter().map(|i| i.product_id).collect();
        let products: HashMap<ProductId, _> = ProductRepository::new(self.pool)
            .get_active_many(&product_ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let lines = request
            .items
            .iter()
            .map(|item| {
                let product = products
                    .get(&item.product_id)
                    .ok_or(OrderError::ProductNotFound(item.product_id))?;
                Ok(price_line(product, item.quantity)?)
            })
            .collect::<Result<Vec<_>, OrderError>>()?;
        let quote = quote_order(lines)?;

        check_credit(&buyer.credit_account(), quote.grand_total)?;

        let notes = request.notes.as_deref().map(sanitize).unwrap_or_default();
        let repo = OrderRepository::new(self.pool);
        let order = repo
            .create(&NewOrder {
                order_number: order_number(Utc::now()),
                buyer_id,
                buyer_state: buyer.state.as_deref().unwrap_or_default(),
                notes: &notes,
                quote: &quote,
                product_ids: &product_ids,
            })
            .await?;

        info!(order_id = %order.id, grand_total = %order.grand_total, "Order placed");
        repo.get_detail(order.id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    /// Apply an admin status update.
    ///
    /// On the first move to `approved` the invoice is created, and for a
    /// credit buyer the grand total is charged, in the same transaction as
    /// the status change. The approval and invoice emails are sent after
    /// commit; a failed send is logged and leaves `email_sent` false.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::OrderNotFound` for an unknown order and
    /// `OrderError::Repository` if the transaction fails.
    #[instrument(skip(self, update), fields(status = %update.status))]
    pub async fn update(&self, id: OrderId, update: OrderUpdate) -> Result<OrderDetail, OrderError> {
        let update = OrderUpdate {
            tracking_id: sanitized(update.tracking_id),
            shipping_carrier: sanitized(update.shipping_carrier),
            shipping_details: sanitized(update.shipping_details),
            ..update
        };

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        orders::lock(&mut tx, id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;
        let order = orders::apply_update(&mut tx, id, &update).await?;

        let issued = if update.status == OrderStatus::Approved
            && !invoices::exists_for_order(&mut tx, id).await?
        {
            let buyer = users::lock(&mut tx, order.buyer_id)
                .await?
                .ok_or(OrderError::BuyerNotFound)?;
            let invoice = self.issue_invoice(&mut tx, &order, &buyer).await?;
            Some((invoice, buyer))
        } else {
            None
        };

        tx.commit().await.map_err(RepositoryError::from)?;

        if let Some((invoice, buyer)) = issued {
            self.notify_approval(&order, &invoice, &buyer).await;
        }

        OrderRepository::new(self.pool)
            .get_detail(id)
            .await?
            .ok_or(OrderError::OrderNotFound)
    }

    async fn issue_invoice(
        &self,
        conn: &mut sqlx::PgConnection,
        order: &Order,
        buyer: &User,
    ) -> Result<Invoice, OrderError> {
        let tax = TaxSplit::compute(order.gst_amount, &order.buyer_state, &self.seller.state);

        let invoice = invoices::insert(
            &mut *conn,
            &NewInvoice {
                invoice_number: invoice_number(Utc::now()),
                order_id: order.id,
                buyer_id: order.buyer_id,
                seller_gstin: self.seller.gstin.as_str(),
                buyer_gstin: buyer.gst_number.as_deref().unwrap_or_default(),
                place_of_supply: &order.buyer_state,
                subtotal: order.total_amount,
                tax,
                grand_total: order.grand_total,
            },
        )
        .await?;

        if buyer.credit_enabled {
            credit::debit_for_order(
                conn,
                buyer.id,
                order.id,
                order.grand_total,
                &format!("Order approved: {}", order.order_number),
            )
            .await?;
        }

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            inter_state = tax.inter_state,
            credit_charged = buyer.credit_enabled,
            "Invoice issued"
        );
        Ok(invoice)
    }

    async fn notify_approval(&self, order: &Order, invoice: &Invoice, buyer: &User) {
        let name = buyer.display_name();
        let sent = async {
            self.email
                .send_order_approved(&buyer.email, name, &order.order_number, order.grand_total)
                .await?;
            self.email
                .send_invoice_ready(
                    &buyer.email,
                    name,
                    &order.order_number,
                    &invoice.invoice_number,
                    invoice.id,
                )
                .await
        }
        .await;

        if let Err(e) = sent {
            warn!(order_id = %order.id, error = %e, "Failed to send order approval emails");
            return;
        }

        let marked = async {
            OrderRepository::new(self.pool).mark_email_sent(order.id).await?;
            InvoiceRepository::new(self.pool)
                .mark_email_sent(invoice.id)
                .await
        }
        .await;
        if let Err(e) = marked {
            warn!(order_id = %order.id, error = %e, "Failed to record sent emails");
        }
    }
}

fn sanitized(value: Option<String>) -> Option<String> {
    seedmart_core::sanitize_opt(value.as_deref())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_request_defaults() {
        let req: OrderRequest = serde_json::from_str("{}").unwrap();
        assert!(req.items.is_empty());
        assert!(req.notes.is_none());

        let req: OrderRequest = serde_json::from_str(
            r#"{"items":[{"product_id":3,"quantity":500}],"notes":"Deliver by Friday"}"#,
        )
        .unwrap();
        assert_eq!(req.items[0].product_id, ProductId::new(3));
        assert_eq!(req.items[0].quantity, 500);
    }

    #[test]
    fn test_blank_tracking_fields_are_ignored() {
        assert_eq!(sanitized(Some("   ".to_owned())), None);
        assert_eq!(
            sanitized(Some(" <i>DTDC</i> ".to_owned())),
            Some("DTDC".to_owned())
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            OrderError::KycNotApproved.to_string(),
            "KYC not approved. Contact admin."
        );
        assert_eq!(
            OrderError::ProductNotFound(ProductId::new(9)).to_string(),
            "Product not found: 9"
        );
        let err: OrderError = PricingError::EmptyOrder.into();
        assert_eq!(err.to_string(), "No items in order");
    }
}
