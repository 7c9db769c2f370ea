//! Credit ledger entries.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use seedmart_core::{CreditTransactionId, CreditTransactionKind, OrderId, UserId};

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CreditTransaction {
    pub id: CreditTransactionId,
    pub buyer_id: UserId,
    pub order_id: Option<OrderId>,
    #[serde(rename = "type")]
    pub txn_type: CreditTransactionKind,
    pub amount: Decimal,
    pub description: String,
    pub created_at: DateTime<Utc>,
}
