//! GST tax invoices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use seedmart_core::{InvoiceId, OrderId, UserId};

/// An invoice row. One per order at most.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Invoice {
    pub id: InvoiceId,
    pub invoice_number: String,
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub seller_gstin: String,
    /// Empty when the buyer has no GSTIN on file.
    pub buyer_gstin: String,
    pub place_of_supply: String,
    pub subtotal: Decimal,
    pub cgst: Decimal,
    pub sgst: Decimal,
    pub igst: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
    pub invoice_date: DateTime<Utc>,
    pub email_sent: bool,
}

/// The invoice fields shown alongside an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct InvoiceSummary {
    pub id: InvoiceId,
    pub order_id: OrderId,
    pub invoice_number: String,
    pub email_sent: bool,
}
