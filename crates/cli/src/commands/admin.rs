//! Admin account management.
//!
//! ```bash
//! sm-cli admin promote -e owner@example.com
//! ```
//!
//! This is the offline counterpart of `POST /api/admin/promote`; it needs
//! database access instead of `ADMIN_SETUP_SECRET`.

use thiserror::Error;

use seedmart_core::{Email, UserRole};
use seedmart_server::db::{RepositoryError, UserRepository};

use super::{CommandError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("No account with email: {0}")]
    UserNotFound(String),
}

/// Give an existing account the admin role.
///
/// The account keeps its KYC and credit fields. Existing sessions still
/// carry the old role until the user logs in again.
///
/// # Errors
///
/// Returns `AdminError::UserNotFound` if no account uses the email.
pub async fn promote(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email).map_err(|_| AdminError::InvalidEmail(email.to_owned()))?;

    let pool = connect().await?;
    let users = UserRepository::new(&pool);

    let user = users
        .get_by_email(&email)
        .await?
        .ok_or_else(|| AdminError::UserNotFound(email.to_string()))?;

    if user.role == UserRole::Admin {
        tracing::info!(user_id = %user.id, "{email} is already an admin");
        return Ok(());
    }

    users.set_role(user.id, UserRole::Admin).await?;
    tracing::info!(user_id = %user.id, "{email} has been promoted to admin");
    Ok(())
}
