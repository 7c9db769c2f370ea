//! Back-office routes: KYC review, credit management, dashboard stats and
//! first-admin bootstrap.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use seedmart_core::{
    CreditTransactionKind, Email, KycStatus, UserId, UserRole, sanitize_opt,
};

use crate::db::{self, CreditRepository, DashboardStats, RepositoryError, UserRepository};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::RequireAdmin;
use crate::models::User;
use crate::state::AppState;

/// Ledger entries returned with a buyer's credit summary.
const RECENT_TRANSACTIONS: i64 = 20;

/// Build the `/api/admin` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/buyers", get(list_buyers).patch(review_kyc))
        .route("/credit", get(credit_summary).patch(update_credit).post(record_credit))
        .route("/stats", get(stats))
        .route("/promote", post(promote))
}

fn buyer_not_found(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Buyer not found".to_owned()),
        other => other.into(),
    }
}

// =============================================================================
// KYC review
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct BuyerQuery {
    pub status: Option<String>,
}

/// Buyers, newest first, optionally filtered by KYC status.
pub async fn list_buyers(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<BuyerQuery>,
) -> Result<Json<Value>> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("" | "all") => None,
        Some(s) => Some(
            s.parse::<KycStatus>()
                .map_err(|_| AppError::BadRequest("Invalid status".to_owned()))?,
        ),
    };

    let buyers = UserRepository::new(state.pool()).list_buyers(status).await?;
    Ok(Json(json!({ "buyers": buyers })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KycDecision {
    pub buyer_id: Option<UserId>,
    pub kyc_status: Option<String>,
    pub kyc_rejection_reason: Option<String>,
}

/// Approve, reject or reset a buyer's KYC, then notify the buyer.
#[instrument(skip_all)]
pub async fn review_kyc(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<KycDecision>,
) -> Result<Json<Value>> {
    let buyer_id = body
        .buyer_id
        .ok_or_else(|| AppError::BadRequest("buyer_id required".to_owned()))?;
    let status = body
        .kyc_status
        .as_deref()
        .and_then(|s| s.trim().parse::<KycStatus>().ok())
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_owned()))?;
    let reason = sanitize_opt(body.kyc_rejection_reason.as_deref());

    let user = UserRepository::new(state.pool())
        .update_kyc(buyer_id, status, reason.as_deref())
        .await
        .map_err(buyer_not_found)?;

    info!(buyer_id = %user.id, admin_id = %admin.id, kyc_status = %status, "KYC reviewed");
    add_breadcrumb("admin", "KYC reviewed", Some(&[("kyc_status", status.to_string().as_str())]));

    let email = state.email();
    let sent = match status {
        KycStatus::Approved => email.send_kyc_approved(&user.email, user.display_name()).await,
        KycStatus::Rejected => {
            email
                .send_kyc_rejected(
                    &user.email,
                    user.display_name(),
                    user.kyc_rejection_reason.as_deref(),
                )
                .await
        }
        KycStatus::Pending => Ok(()),
    };
    if let Err(e) = sent {
        warn!(buyer_id = %user.id, error = %e, "Failed to send KYC email");
    }

    Ok(Json(json!({ "user": user })))
}

// =============================================================================
// Credit
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct CreditQuery {
    pub buyer_id: Option<UserId>,
}

/// A buyer's credit position.
#[derive(Debug, Serialize)]
pub struct CreditSummary {
    pub id: UserId,
    pub company_name: Option<String>,
    pub email: Email,
    pub credit_enabled: bool,
    pub credit_limit: Decimal,
    pub used_credit: Decimal,
    pub available_credit: Decimal,
}

impl From<&User> for CreditSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            company_name: user.company_name.clone(),
            email: user.email.clone(),
            credit_enabled: user.credit_enabled,
            credit_limit: user.credit_limit,
            used_credit: user.used_credit,
            available_credit: user.credit_account().available(),
        }
    }
}

/// Credit summary and the latest ledger entries.
pub async fn credit_summary(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<CreditQuery>,
) -> Result<Json<Value>> {
    let buyer_id = query
        .buyer_id
        .ok_or_else(|| AppError::BadRequest("buyer_id required".to_owned()))?;

    let buyer = UserRepository::new(state.pool())
        .get_by_id(buyer_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Buyer not found".to_owned()))?;
    let transactions = CreditRepository::new(state.pool())
        .recent(buyer_id, RECENT_TRANSACTIONS)
        .await?;

    Ok(Json(json!({
        "buyer": CreditSummary::from(&buyer),
        "transactions": transactions,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreditSettings {
    pub buyer_id: Option<UserId>,
    pub credit_limit: Option<Decimal>,
    pub credit_enabled: Option<bool>,
}

/// Change a buyer's credit limit or enable/disable credit.
#[instrument(skip_all)]
pub async fn update_credit(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreditSettings>,
) -> Result<Json<Value>> {
    let buyer_id = body
        .buyer_id
        .ok_or_else(|| AppError::BadRequest("buyer_id required".to_owned()))?;
    if body.credit_limit.is_some_and(|limit| limit < Decimal::ZERO) {
        return Err(AppError::BadRequest("Invalid credit limit".to_owned()));
    }

    let user = CreditRepository::new(state.pool())
        .update_settings(buyer_id, body.credit_limit, body.credit_enabled)
        .await
        .map_err(buyer_not_found)?;

    info!(buyer_id = %user.id, admin_id = %admin.id, "Credit settings updated");
    Ok(Json(json!({ "user": user })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ManualEntry {
    pub buyer_id: Option<UserId>,
    pub amount: Option<Decimal>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub description: Option<String>,
}

impl ManualEntry {
    fn validate(&self) -> Result<(UserId, CreditTransactionKind, Decimal)> {
        let buyer_id = self
            .buyer_id
            .ok_or_else(|| AppError::BadRequest("buyer_id required".to_owned()))?;
        let kind = match self.kind.as_deref() {
            Some("credit") => CreditTransactionKind::Credit,
            Some("debit") => CreditTransactionKind::Debit,
            _ => {
                return Err(AppError::BadRequest(
                    "type must be 'credit' or 'debit'".to_owned(),
                ));
            }
        };
        let amount = self
            .amount
            .filter(|a| *a > Decimal::ZERO)
            .ok_or_else(|| AppError::BadRequest("Invalid amount".to_owned()))?;
        Ok((buyer_id, kind, amount))
    }
}

/// Record a payment received (`credit`) or a manual charge (`debit`).
#[instrument(skip_all)]
pub async fn record_credit(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ManualEntry>,
) -> Result<Json<Value>> {
    let (buyer_id, kind, amount) = body.validate()?;
    let description = sanitize_opt(body.description.as_deref())
        .unwrap_or_else(|| format!("Manual {kind} by admin"));

    let transaction = CreditRepository::new(state.pool())
        .record_manual(buyer_id, kind, amount, &description)
        .await
        .map_err(buyer_not_found)?;

    info!(buyer_id = %buyer_id, admin_id = %admin.id, kind = %kind, amount = %amount, "Manual credit entry");
    Ok(Json(json!({ "transaction": transaction })))
}

// =============================================================================
// Dashboard
// =============================================================================

/// Dashboard counters and sales by state.
pub async fn stats(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>> {
    Ok(Json(db::stats::dashboard(state.pool()).await?))
}

// =============================================================================
// Bootstrap
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PromoteRequest {
    pub email: Option<String>,
    pub secret: Option<String>,
}

/// Promote an existing account to admin using the setup secret.
///
/// Used once to create the first admin; no session is required.
#[instrument(skip_all)]
pub async fn promote(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PromoteRequest>,
) -> Result<Json<Value>> {
    let setup_secret = state.config().admin_setup_secret.as_ref().ok_or_else(|| {
        AppError::ServiceUnavailable("ADMIN_SETUP_SECRET is not configured on the server.".to_owned())
    })?;

    let given = body.secret.unwrap_or_default();
    if !secrets_match(given.as_bytes(), setup_secret.expose_secret().as_bytes()) {
        warn!("Admin promotion attempted with an invalid secret");
        return Err(AppError::Forbidden("Invalid secret.".to_owned()));
    }

    let email = body
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or_else(|| AppError::BadRequest("email is required.".to_owned()))?;

    let not_found = || AppError::NotFound("User not found".to_owned());
    let email = Email::parse(email).map_err(|_| not_found())?;
    let users = UserRepository::new(state.pool());
    let user = users.get_by_email(&email).await?.ok_or_else(not_found)?;
    users.set_role(user.id, UserRole::Admin).await?;

    info!(user_id = %user.id, "User promoted to admin");
    Ok(Json(json!({
        "message": format!(
            "✅ {email} has been promoted to admin. Log in again to refresh your session."
        ),
    })))
}

/// Compare without short-circuiting on the first differing byte.
fn secrets_match(given: &[u8], expected: &[u8]) -> bool {
    given.len() == expected.len()
        && given
            .iter()
            .zip(expected)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_entry_validation() {
        let entry: ManualEntry =
            serde_json::from_str(r#"{"buyer_id":2,"amount":"25000","type":"credit"}"#).unwrap();
        let (buyer, kind, amount) = entry.validate().unwrap();
        assert_eq!(buyer, UserId::new(2));
        assert_eq!(kind, CreditTransactionKind::Credit);
        assert_eq!(amount, Decimal::from(25_000));

        let entry: ManualEntry =
            serde_json::from_str(r#"{"buyer_id":2,"amount":"100","type":"limit_update"}"#)
                .unwrap();
        assert_eq!(
            entry.validate().unwrap_err().to_string(),
            "type must be 'credit' or 'debit'"
        );

        let entry: ManualEntry =
            serde_json::from_str(r#"{"buyer_id":2,"amount":"0","type":"debit"}"#).unwrap();
        assert_eq!(entry.validate().unwrap_err().to_string(), "Invalid amount");

        let entry: ManualEntry = serde_json::from_str(r#"{"type":"debit"}"#).unwrap();
        assert_eq!(entry.validate().unwrap_err().to_string(), "buyer_id required");
    }

    #[test]
    fn test_secrets_match() {
        assert!(secrets_match(b"k3y-Material-9!", b"k3y-Material-9!"));
        assert!(!secrets_match(b"k3y-Material-9?", b"k3y-Material-9!"));
        assert!(!secrets_match(b"short", b"k3y-Material-9!"));
        assert!(!secrets_match(b"", b"x"));
    }
}
