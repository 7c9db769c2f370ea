//! Distributor and admin accounts.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use seedmart_core::pricing::CreditAccount;
use seedmart_core::{Email, Gstin, KycStatus, Pan, Phone, Pincode, UserId, UserRole};

/// A user row.
///
/// The password hash is never serialized.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub gst_number: Option<String>,
    pub pan_number: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    pub gst_certificate: Option<String>,
    pub kyc_status: KycStatus,
    pub kyc_rejection_reason: Option<String>,
    pub kyc_approved_at: Option<DateTime<Utc>>,
    pub credit_limit: Decimal,
    pub used_credit: Decimal,
    pub credit_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Credit position for the order credit check.
    #[must_use]
    pub const fn credit_account(&self) -> CreditAccount {
        CreditAccount {
            enabled: self.credit_enabled,
            limit: self.credit_limit,
            used: self.used_credit,
        }
    }

    /// Name to address the user by in emails.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.company_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| self.email.as_str())
    }
}

/// A validated registration, ready to insert.
#[derive(Debug, Clone)]
pub struct NewBuyer {
    pub email: Email,
    pub password_hash: String,
    pub company_name: String,
    pub phone: Option<Phone>,
    pub gst_number: Gstin,
    pub pan_number: Pan,
    pub state: String,
    pub district: Option<String>,
    pub pincode: Pincode,
    pub address: Option<String>,
    pub gst_certificate: Option<String>,
}

/// The buyer fields shown alongside an order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BuyerSummary {
    pub company_name: Option<String>,
    pub email: Email,
    pub state: Option<String>,
    pub gst_number: Option<String>,
}
