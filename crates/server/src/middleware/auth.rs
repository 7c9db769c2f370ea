//! Authentication and authorization extractors.
//!
//! Handlers declare the access they need by taking one of these extractors:
//!
//! ```rust,ignore
//! async fn stats(RequireAdmin(admin): RequireAdmin, State(state): State<AppState>) -> ... {
//!     ...
//! }
//! ```

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;
use tracing::debug;

use crate::db::UserRepository;
use crate::error::AppError;
use crate::models::{CurrentUser, session::keys};
use crate::state::AppState;

const KYC_REQUIRED: &str = "KYC approval required to access products";

async fn session_user(parts: &Parts) -> Result<(Session, Option<CurrentUser>), AppError> {
    let session = parts
        .extensions
        .get::<Session>()
        .cloned()
        .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))?;

    let user = session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .map_err(|e| AppError::Internal(format!("session read failed: {e}")))?;

    Ok((session, user))
}

/// Extractor that requires a logged-in user.
pub struct RequireAuth(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let (_, user) = session_user(parts).await?;
        user.map(Self)
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_owned()))
    }
}

/// Extractor that requires a logged-in admin.
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let RequireAuth(user) = RequireAuth::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Forbidden(
                "Forbidden: Admin access required".to_owned(),
            ));
        }
        Ok(Self(user))
    }
}

/// Catalogue read access.
///
/// Anonymous visitors and admins may browse. A logged-in buyer must have
/// approved KYC. The session snapshot is re-checked against the database
/// before rejecting, so an approval granted mid-session takes effect
/// without logging in again.
pub struct CatalogueAccess(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for CatalogueAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let (session, user) = session_user(parts).await?;
        let Some(user) = user else {
            return Ok(Self(None));
        };
        if user.is_admin() || user.kyc_status.is_approved() {
            return Ok(Self(Some(user)));
        }

        let fresh = UserRepository::new(state.pool())
            .get_by_id(user.id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_owned()))?;
        let refreshed = CurrentUser::from(&fresh);

        if !refreshed.is_admin() && !refreshed.kyc_status.is_approved() {
            return Err(AppError::Forbidden(KYC_REQUIRED.to_owned()));
        }

        debug!(user_id = %refreshed.id, "Refreshed stale session snapshot");
        set_current_user(&session, &refreshed)
            .await
            .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
        Ok(Self(Some(refreshed)))
    }
}

/// Store the logged-in user in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Log out: drop all session data and rotate the session ID.
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
