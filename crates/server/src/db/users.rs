//! User repository for database operations.
//!
//! Buyers and admins share the `seedmart.users` table; the role column
//! tells them apart.

use sqlx::PgPool;
use tracing::{debug, instrument};

use seedmart_core::{Email, KycStatus, UserId, UserRole};

use super::RepositoryError;
use crate::models::{NewBuyer, User};

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(r"SELECT * FROM seedmart.users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(r"SELECT * FROM seedmart.users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(user)
    }

    /// Insert a new buyer awaiting KYC review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    #[instrument(skip(self, buyer), fields(email = %buyer.email))]
    pub async fn create_buyer(&self, buyer: &NewBuyer) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO seedmart.users (
                email, password_hash, role, company_name, phone, gst_number,
                pan_number, state, district, pincode, address, gst_certificate,
                kyc_status
            )
            VALUES ($1, $2, 'buyer', $3, $4, $5, $6, $7, $8, $9, $10, $11, 'pending')
            RETURNING *
            ",
        )
        .bind(&buyer.email)
        .bind(&buyer.password_hash)
        .bind(&buyer.company_name)
        .bind(buyer.phone.as_ref().map(|p| p.as_str()))
        .bind(buyer.gst_number.as_str())
        .bind(buyer.pan_number.as_str())
        .bind(&buyer.state)
        .bind(&buyer.district)
        .bind(buyer.pincode.as_str())
        .bind(&buyer.address)
        .bind(&buyer.gst_certificate)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::conflict_on_unique(e, "email"))?;

        debug!(user_id = %user.id, "Created buyer");
        Ok(user)
    }

    /// List buyers, newest first, optionally filtered by KYC status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_buyers(
        &self,
        status: Option<KycStatus>,
    ) -> Result<Vec<User>, RepositoryError> {
        let buyers = sqlx::query_as::<_, User>(
            r"
            SELECT * FROM seedmart.users
            WHERE role = 'buyer'
              AND ($1::seedmart.kyc_status IS NULL OR kyc_status = $1)
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(status)
        .fetch_all(self.pool)
        .await?;
        Ok(buyers)
    }

    /// Set a buyer's KYC status.
    ///
    /// Approval stamps `kyc_approved_at`. A rejection stores `reason` when
    /// one is given and leaves any earlier reason otherwise.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self, reason))]
    pub async fn update_kyc(
        &self,
        id: UserId,
        status: KycStatus,
        reason: Option<&str>,
    ) -> Result<User, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            UPDATE seedmart.users SET
                kyc_status = $2,
                kyc_approved_at = CASE WHEN $2 = 'approved'::seedmart.kyc_status
                                       THEN NOW() ELSE kyc_approved_at END,
                kyc_rejection_reason = CASE WHEN $2 = 'rejected'::seedmart.kyc_status
                                            THEN COALESCE($3, kyc_rejection_reason)
                                            ELSE kyc_rejection_reason END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(status)
        .bind(reason)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        debug!(kyc_status = %user.kyc_status, "Updated KYC status");
        Ok(user)
    }

    /// Change a user's role.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_role(&self, id: UserId, role: UserRole) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"UPDATE seedmart.users SET role = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(role)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

/// Load a user and lock the row for the rest of the transaction.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn lock(conn: &mut sqlx::PgConnection, id: UserId) -> Result<Option<User>, RepositoryError> {
    let user = sqlx::query_as::<_, User>(r"SELECT * FROM seedmart.users WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}
