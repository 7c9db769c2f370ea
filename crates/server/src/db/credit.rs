//! Credit ledger and buyer credit balances.
//!
//! Every balance change is written together with its ledger entry in one
//! transaction.

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{debug, instrument};

use seedmart_core::{CreditTransactionKind, OrderId, UserId, format_inr};

use super::RepositoryError;
use crate::models::{CreditTransaction, User};

/// Repository for the credit ledger.
pub struct CreditRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CreditRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// The buyer's latest ledger entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn recent(
        &self,
        buyer: UserId,
        limit: i64,
    ) -> Result<Vec<CreditTransaction>, RepositoryError> {
        let entries = sqlx::query_as::<_, CreditTransaction>(
            r"
            SELECT * FROM seedmart.credit_transactions
            WHERE buyer_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            ",
        )
        .bind(buyer)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;
        Ok(entries)
    }

    /// Change the credit limit and/or the enabled flag, and log the new limit.
    ///
    /// Omitted values keep their current setting.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the buyer does not exist.
    /// Returns `RepositoryError::Database` if the transaction fails.
    #[instrument(skip(self))]
    pub async fn update_settings(
        &self,
        buyer: UserId,
        limit: Option<Decimal>,
        enabled: Option<bool>,
    ) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE seedmart.users SET
                credit_limit = COALESCE($2, credit_limit),
                credit_enabled = COALESCE($3, credit_enabled),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(buyer)
        .bind(limit)
        .bind(enabled)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        insert_entry(
            &mut tx,
            buyer,
            None,
            CreditTransactionKind::LimitUpdate,
            user.credit_limit,
            &format!(
                "Credit limit updated by admin to {}",
                format_inr(user.credit_limit)
            ),
        )
        .await?;

        tx.commit().await?;
        debug!(credit_limit = %user.credit_limit, credit_enabled = user.credit_enabled, "Updated credit settings");
        Ok(user)
    }

    /// Record a manual ledger entry.
    ///
    /// A `credit` (payment received) lowers `used_credit`, never below zero.
    /// A manual `debit` is recorded in the ledger only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the buyer does not exist.
    /// Returns `RepositoryError::Database` if the transaction fails.
    #[instrument(skip(self, description))]
    pub async fn record_manual(
        &self,
        buyer: UserId,
        kind: CreditTransactionKind,
        amount: Decimal,
        description: &str,
    ) -> Result<CreditTransaction, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query_scalar::<_, UserId>(r"SELECT id FROM seedmart.users WHERE id = $1 FOR UPDATE")
            .bind(buyer)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        if kind == CreditTransactionKind::Credit {
            sqlx::query(
                r"
                UPDATE seedmart.users
                SET used_credit = GREATEST(used_credit - $2, 0), updated_at = NOW()
                WHERE id = $1
                ",
            )
            .bind(buyer)
            .bind(amount)
            .execute(&mut *tx)
            .await?;
        }

        let entry = insert_entry(&mut tx, buyer, None, kind, amount, description).await?;
        tx.commit().await?;
        Ok(entry)
    }
}

/// Charge an approved order against the buyer's credit.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if either write fails.
pub async fn debit_for_order(
    conn: &mut PgConnection,
    buyer: UserId,
    order: OrderId,
    amount: Decimal,
    description: &str,
) -> Result<CreditTransaction, RepositoryError> {
    sqlx::query(
        r"
        UPDATE seedmart.users
        SET used_credit = used_credit + $2, updated_at = NOW()
        WHERE id = $1
        ",
    )
    .bind(buyer)
    .bind(amount)
    .execute(&mut *conn)
    .await?;

    insert_entry(
        conn,
        buyer,
        Some(order),
        CreditTransactionKind::Debit,
        amount,
        description,
    )
    .await
}

async fn insert_entry(
    conn: &mut PgConnection,
    buyer: UserId,
    order: Option<OrderId>,
    kind: CreditTransactionKind,
    amount: Decimal,
    description: &str,
) -> Result<CreditTransaction, RepositoryError> {
    let entry = sqlx::query_as::<_, CreditTransaction>(
        r"
        INSERT INTO seedmart.credit_transactions (buyer_id, order_id, txn_type, amount, description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        ",
    )
    .bind(buyer)
    .bind(order)
    .bind(kind)
    .bind(amount)
    .bind(description)
    .fetch_one(conn)
    .await?;
    Ok(entry)
}
