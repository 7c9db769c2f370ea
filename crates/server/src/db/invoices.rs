//! Invoice repository.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use seedmart_core::pricing::TaxSplit;
use seedmart_core::{InvoiceId, OrderId, UserId};

use super::RepositoryError;
use crate::models::Invoice;

/// Invoice values computed at approval time.
#[derive(Debug)]
pub struct NewInvoice<'q> {
    pub invoice_number: String,
    pub order_id: OrderId,
    pub buyer_id: UserId,
    pub seller_gstin: &'q str,
    pub buyer_gstin: &'q str,
    pub place_of_supply: &'q str,
    pub subtotal: Decimal,
    pub tax: TaxSplit,
    pub grand_total: Decimal,
}

/// Repository for invoices.
pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let invoice = sqlx::query_as::<_, Invoice>(r"SELECT * FROM seedmart.invoices WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(invoice)
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_email_sent(&self, id: InvoiceId) -> Result<(), RepositoryError> {
        sqlx::query(r"UPDATE seedmart.invoices SET email_sent = TRUE WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Whether `order` already has an invoice.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn exists_for_order(
    conn: &mut PgConnection,
    order: OrderId,
) -> Result<bool, RepositoryError> {
    let exists = sqlx::query_scalar::<_, bool>(
        r"SELECT EXISTS (SELECT 1 FROM seedmart.invoices WHERE order_id = $1)",
    )
    .bind(order)
    .fetch_one(conn)
    .await?;
    Ok(exists)
}

/// Insert an invoice.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the order already has an invoice.
/// Returns `RepositoryError::Database` for other database errors.
pub async fn insert(
    conn: &mut PgConnection,
    invoice: &NewInvoice<'_>,
) -> Result<Invoice, RepositoryError> {
    let created = sqlx::query_as::<_, Invoice>(
        r"
        INSERT INTO seedmart.invoices (
            invoice_number, order_id, buyer_id, seller_gstin, buyer_gstin,
            place_of_supply, subtotal, cgst, sgst, igst, total_tax, grand_total
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        ",
    )
    .bind(&invoice.invoice_number)
    .bind(invoice.order_id)
    .bind(invoice.buyer_id)
    .bind(invoice.seller_gstin)
    .bind(invoice.buyer_gstin)
    .bind(invoice.place_of_supply)
    .bind(invoice.subtotal)
    .bind(invoice.tax.cgst)
    .bind(invoice.tax.sgst)
    .bind(invoice.tax.igst)
    .bind(invoice.tax.total())
    .bind(invoice.grand_total)
    .fetch_one(conn)
    .await
    .map_err(|e| RepositoryError::conflict_on_unique(e, "invoice"))?;

    debug!(invoice_id = %created.id, inter_state = invoice.tax.inter_state, "Created invoice");
    Ok(created)
}
