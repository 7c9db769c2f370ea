//! Authentication service.
//!
//! Buyer registration with KYC details, and password login.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use seedmart_core::{
    Email, FieldErrors, Gstin, Pan, Phone, Pincode, check_password_strength, sanitize_opt,
};

use crate::db::{RepositoryError, UserRepository};
use crate::models::{NewBuyer, User};

/// Body of `POST /api/auth/register`.
///
/// Every field is optional at the JSON level so that missing fields are
/// reported alongside invalid ones.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Registration {
    pub email: Option<String>,
    pub password: Option<String>,
    pub company_name: Option<String>,
    pub phone: Option<String>,
    pub gst_number: Option<String>,
    pub pan_number: Option<String>,
    pub state: Option<String>,
    pub district: Option<String>,
    pub pincode: Option<String>,
    pub address: Option<String>,
    /// Reference to an uploaded certificate (URL or storage key).
    pub gst_certificate: Option<String>,
}

/// A registration whose fields all passed validation.
#[derive(Debug)]
pub struct ValidRegistration {
    buyer: NewBuyer,
    password: String,
}

impl Registration {
    /// Check every field and collect all failures.
    ///
    /// The password is not hashed yet; `password_hash` is left empty.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when any check fails.
    pub fn validate(self) -> Result<ValidRegistration, FieldErrors> {
        let mut errors = FieldErrors::new();

        let email = match self.email.as_deref().map(str::trim) {
            None | Some("") => {
                errors.add("email", "Email is required");
                None
            }
            Some(raw) => errors.check("email", Email::parse(raw)),
        };

        let password = self.password.unwrap_or_default();
        errors.check("password", check_password_strength(&password));

        let company_name = errors.require("company_name", self.company_name.as_deref(), "Company name");
        let state = errors.require("state", self.state.as_deref(), "State");

        let gst_number = errors.check(
            "gst_number",
            Gstin::parse(self.gst_number.as_deref().unwrap_or_default()),
        );
        let pan_number = errors.check(
            "pan_number",
            Pan::parse(self.pan_number.as_deref().unwrap_or_default()),
        );
        let pincode = errors.check(
            "pincode",
            Pincode::parse(self.pincode.as_deref().unwrap_or_default()),
        );
        let phone = match self.phone.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => errors.check("phone", Phone::parse(raw)),
        };

        match (email, company_name, state, gst_number, pan_number, pincode) {
            (
                Some(email),
                Some(company_name),
                Some(state),
                Some(gst_number),
                Some(pan_number),
                Some(pincode),
            ) if errors.is_empty() => Ok(ValidRegistration {
                buyer: NewBuyer {
                    email,
                    password_hash: String::new(),
                    company_name,
                    phone,
                    gst_number,
                    pan_number,
                    state,
                    district: sanitize_opt(self.district.as_deref()),
                    pincode,
                    address: sanitize_opt(self.address.as_deref()),
                    gst_certificate: sanitize_opt(self.gst_certificate.as_deref()),
                },
                password,
            }),
            _ => Err(errors),
        }
    }
}

/// Authentication service.
///
/// Handles buyer registration and password login.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Register a new buyer. The account starts with KYC `pending`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every failing field.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        let ValidRegistration {
            mut buyer,
            password,
        } = registration.validate().map_err(AuthError::Validation)?;

        buyer.password_hash = hash_password(&password)?;

        let user = self.users.create_buyer(&buyer).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Repository(other),
        })?;

        info!(user_id = %user.id, "Buyer registered, awaiting KYC review");
        Ok(user)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &user.password_hash)?;

        Ok(user)
    }
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn registration() -> Registration {
        Registration {
            email: Some(" Buyer@Example.com ".to_owned()),
            password: Some("Seeds2024".to_owned()),
            company_name: Some("Demo Agro <b>Distributors</b>".to_owned()),
            phone: Some("9876543210".to_owned()),
            gst_number: Some("27aabcu9603r1zx".to_owned()),
            pan_number: Some("AABCU9603R".to_owned()),
            state: Some("Maharashtra".to_owned()),
            district: Some("Nagpur".to_owned()),
            pincode: Some("440001".to_owned()),
            address: Some("   ".to_owned()),
            gst_certificate: None,
        }
    }

    #[test]
    fn test_valid_registration_is_normalized() {
        let valid = registration().validate().unwrap();
        assert_eq!(valid.buyer.email.as_str(), "buyer@example.com");
        assert_eq!(valid.buyer.company_name, "Demo Agro Distributors");
        assert_eq!(valid.buyer.gst_number.as_str(), "27AABCU9603R1ZX");
        assert_eq!(valid.buyer.address, None);
        assert_eq!(valid.password, "Seeds2024");
    }

    #[test]
    fn test_registration_reports_all_fields() {
        let reg = Registration {
            email: Some("not-an-email".to_owned()),
            password: Some("short".to_owned()),
            phone: Some("12345".to_owned()),
            gst_number: Some("27AABCU9603R1Z".to_owned()),
            ..Registration::default()
        };
        let errors = reg.validate().unwrap_err();
        for field in [
            "email",
            "password",
            "company_name",
            "state",
            "gst_number",
            "pan_number",
            "pincode",
            "phone",
        ] {
            assert!(errors.get(field).is_some(), "missing error for {field}");
        }
        assert_eq!(errors.get("state"), Some("State is required"));
    }

    #[test]
    fn test_phone_is_optional() {
        let mut reg = registration();
        reg.phone = Some(String::new());
        assert!(reg.validate().unwrap().buyer.phone.is_none());
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("Seeds2024").unwrap();
        assert!(verify_password("Seeds2024", &hash).is_ok());
        assert!(matches!(
            verify_password("seeds2024", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
