//! Status enums for users, orders and the credit ledger.
//!
//! Each enum maps to a PostgreSQL enum type in the `seedmart` schema when the
//! `postgres` feature is enabled, and serializes as `snake_case` text.

use serde::{Deserialize, Serialize};

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "seedmart.user_role", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Back-office staff: KYC review, catalogue, order fulfilment, credit.
    Admin,
    /// Registered distributor.
    #[default]
    Buyer,
}

impl UserRole {
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Buyer => write!(f, "buyer"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "buyer" => Ok(Self::Buyer),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// KYC review state of a distributor account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "seedmart.kyc_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl KycStatus {
    #[must_use]
    pub const fn is_approved(self) -> bool {
        matches!(self, Self::Approved)
    }
}

impl std::fmt::Display for KycStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for KycStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            _ => Err(format!("invalid KYC status: {s}")),
        }
    }
}

/// Fulfilment state of a bulk order.
///
/// Transitions are not restricted; an admin may move an order to any state.
/// The first move to [`OrderStatus::Approved`] issues the tax invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "seedmart.order_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Approved,
    Packed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// All statuses in fulfilment order.
    pub const ALL: [Self; 6] = [
        Self::Pending,
        Self::Approved,
        Self::Packed,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Whether orders in this state count toward revenue.
    #[must_use]
    pub const fn counts_as_revenue(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Packed => write!(f, "packed"),
            Self::Shipped => write!(f, "shipped"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "packed" => Ok(Self::Packed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("invalid order status: {s}")),
        }
    }
}

/// Kind of credit ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "seedmart.credit_txn_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum CreditTransactionKind {
    /// Payment received; reduces used credit.
    Credit,
    /// Order billed on credit; increases used credit.
    Debit,
    /// Limit or enabled flag changed by an admin.
    LimitUpdate,
}

impl std::fmt::Display for CreditTransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credit => write!(f, "credit"),
            Self::Debit => write!(f, "debit"),
            Self::LimitUpdate => write!(f, "limit_update"),
        }
    }
}

impl std::str::FromStr for CreditTransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            "limit_update" => Ok(Self::LimitUpdate),
            _ => Err(format!("invalid credit transaction type: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_display_round_trips() {
        for status in OrderStatus::ALL {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_order_status_rejects_unknown() {
        let err = "refunded".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err, "invalid order status: refunded");
        assert!("Approved".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_only_pending_excluded_from_revenue() {
        assert!(!OrderStatus::Pending.counts_as_revenue());
        assert!(OrderStatus::Approved.counts_as_revenue());
        assert!(OrderStatus::Cancelled.counts_as_revenue());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&CreditTransactionKind::LimitUpdate).unwrap(),
            "\"limit_update\""
        );
        let kyc: KycStatus = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(kyc, KycStatus::Rejected);
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert!(role.is_admin());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(UserRole::default(), UserRole::Buyer);
        assert_eq!(KycStatus::default(), KycStatus::Pending);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }
}
