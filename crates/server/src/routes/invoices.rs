//! Printable GST tax invoices.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderValue, header::CONTENT_DISPOSITION},
    response::{IntoResponse, Response},
    routing::get,
};
use rust_decimal::Decimal;

use seedmart_core::pricing::TaxSplit;
use seedmart_core::{InvoiceId, format_inr};

use crate::config::SellerConfig;
use crate::db::{InvoiceRepository, OrderRepository, UserRepository};
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::{Invoice, OrderDetail, OrderItem, User};
use crate::state::AppState;

/// Build the `/api/invoices` router.
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}", get(show))
}

/// One invoice line, formatted for print.
#[derive(Debug)]
pub struct InvoiceLine {
    pub variety_name: String,
    pub crop_name: String,
    pub hsn_code: String,
    pub quantity: i32,
    pub rate: String,
    pub gst_rate: String,
    pub amount: String,
}

impl From<&OrderItem> for InvoiceLine {
    fn from(item: &OrderItem) -> Self {
        Self {
            variety_name: item.variety_name.clone(),
            crop_name: item.crop_name.clone(),
            hsn_code: item.hsn_code.clone(),
            quantity: item.quantity,
            rate: format_inr(item.price_per_unit),
            gst_rate: item.gst_rate.normalize().to_string(),
            amount: format_inr(item.subtotal),
        }
    }
}

/// The invoice page.
#[derive(Debug, Template, WebTemplate)]
#[template(path = "invoice.html")]
pub struct InvoiceDocument {
    pub seller_name: String,
    pub seller_address: Option<String>,
    pub seller_gstin: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub order_number: String,
    pub buyer_company: String,
    pub buyer_address: String,
    pub buyer_locality: String,
    pub buyer_gstin: String,
    pub buyer_pan: String,
    pub place_of_supply: String,
    pub inter_state: bool,
    pub lines: Vec<InvoiceLine>,
    pub subtotal: String,
    pub cgst: String,
    pub sgst: String,
    pub igst: String,
    pub grand_total: String,
}

impl InvoiceDocument {
    /// Assemble the printable invoice from stored values.
    ///
    /// Amounts and the supply type come from the invoice row as issued, so a
    /// later change to the seller's state does not relabel old invoices. Only
    /// a 0% invoice, which stores no tax to go by, re-derives the supply type
    /// from the place of supply.
    #[must_use]
    pub fn new(invoice: &Invoice, order: &OrderDetail, buyer: &User, seller: &SellerConfig) -> Self {
        let inter_state = if invoice.igst > Decimal::ZERO {
            true
        } else if invoice.cgst > Decimal::ZERO || invoice.sgst > Decimal::ZERO {
            false
        } else {
            TaxSplit::compute(Decimal::ZERO, &invoice.place_of_supply, &seller.state).inter_state
        };

        let locality = [
            buyer.district.as_deref(),
            buyer.state.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
        let buyer_locality = match buyer.pincode.as_deref().filter(|p| !p.is_empty()) {
            Some(pin) if locality.is_empty() => pin.to_owned(),
            Some(pin) => format!("{locality} - {pin}"),
            None => locality,
        };

        Self {
            seller_name: seller.name.clone(),
            seller_address: seller.address.clone(),
            seller_gstin: invoice.seller_gstin.clone(),
            invoice_number: invoice.invoice_number.clone(),
            invoice_date: invoice.invoice_date.format("%-d %B %Y").to_string(),
            order_number: order.order.order_number.clone(),
            buyer_company: buyer.display_name().to_owned(),
            buyer_address: buyer.address.clone().unwrap_or_default(),
            buyer_locality,
            buyer_gstin: or_dash(&invoice.buyer_gstin),
            buyer_pan: or_dash(buyer.pan_number.as_deref().unwrap_or_default()),
            place_of_supply: or_dash(&invoice.place_of_supply),
            inter_state,
            lines: order.items.iter().map(InvoiceLine::from).collect(),
            subtotal: format_inr(invoice.subtotal),
            cgst: format_inr(invoice.cgst),
            sgst: format_inr(invoice.sgst),
            igst: format_inr(invoice.igst),
            grand_total: format_inr(invoice.grand_total),
        }
    }
}

fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".to_owned()
    } else {
        value.to_owned()
    }
}

/// Render an invoice for its buyer or an admin.
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<InvoiceId>,
) -> Result<Response> {
    let pool = state.pool();
    let invoice = InvoiceRepository::new(pool)
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Invoice not found".to_owned()))?;

    if !user.is_admin() && invoice.buyer_id != user.id {
        return Err(AppError::Forbidden("Forbidden".to_owned()));
    }

    let order = OrderRepository::new(pool)
        .get_detail(invoice.order_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("invoice {id} has no order")))?;
    let buyer = UserRepository::new(pool)
        .get_by_id(invoice.buyer_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("invoice {id} has no buyer")))?;

    let document = InvoiceDocument::new(&invoice, &order, &buyer, &state.config().seller);
    let disposition = HeaderValue::from_str(&format!(
        "inline; filename=\"Invoice-{}.html\"",
        invoice.invoice_number
    ))
    .map_err(|e| AppError::Internal(format!("bad invoice number header: {e}")))?;

    Ok(([(CONTENT_DISPOSITION, disposition)], document).into_response())
}
