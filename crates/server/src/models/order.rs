//! Orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use seedmart_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::{BuyerSummary, InvoiceSummary};

/// An order row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub order_number: String,
    pub buyer_id: UserId,
    pub status: OrderStatus,
    /// Pre-tax total.
    pub total_amount: Decimal,
    pub gst_amount: Decimal,
    pub grand_total: Decimal,
    /// Buyer's state when the order was placed.
    pub buyer_state: String,
    pub notes: String,
    pub tracking_id: Option<String>,
    pub shipping_carrier: Option<String>,
    pub shipping_details: Option<String>,
    pub shipped_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub email_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An order line joined with its product names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub variety_name: String,
    pub crop_name: String,
    pub quantity: i32,
    pub price_per_unit: Decimal,
    pub gst_rate: Decimal,
    pub hsn_code: String,
    pub subtotal: Decimal,
    pub gst_amount: Decimal,
}

/// An order as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub buyer: Option<BuyerSummary>,
    pub items: Vec<OrderItem>,
    pub invoice: Option<InvoiceSummary>,
}
