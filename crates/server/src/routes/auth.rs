//! Registration, login and session routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::extract::ApiJson;
use crate::middleware::{RequireAuth, auth_rate_limiter, clear_current_user, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthService, Registration};
use crate::state::AppState;

/// Build the `/api/auth` router. Login and registration are rate limited.
pub fn router() -> Router<AppState> {
    let limited = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(auth_rate_limiter());

    Router::new()
        .merge(limited)
        .route("/logout", post(logout))
        .route("/me", get(me))
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// The account as shown to its owner.
#[derive(Debug, Serialize)]
pub struct AccountSummary {
    #[serde(flatten)]
    pub session: CurrentUser,
    pub company_name: Option<String>,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            session: CurrentUser::from(user),
            company_name: user.company_name.clone(),
        }
    }
}

/// Register a distributor account. KYC starts as `pending`.
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(registration): ApiJson<Registration>,
) -> Result<(StatusCode, Json<Value>)> {
    let user = AuthService::new(state.pool()).register(registration).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Registration successful. KYC pending approval.",
            "user_id": user.id,
        })),
    ))
}

/// Log in with email and password.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AccountSummary>> {
    let user = AuthService::new(state.pool())
        .login(&body.email, &body.password)
        .await?;

    // New session ID on privilege change
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::Internal(format!("session cycle failed: {e}")))?;
    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(|e| AppError::Internal(format!("session write failed: {e}")))?;
    set_sentry_user(&user.id, Some(user.email.as_str()));

    Ok(Json(AccountSummary::from(&user)))
}

/// Log out and discard the session.
pub async fn logout(session: Session) -> Result<Json<Value>> {
    clear_current_user(&session)
        .await
        .map_err(|e| AppError::Internal(format!("session flush failed: {e}")))?;
    clear_sentry_user();
    Ok(Json(json!({ "success": true })))
}

/// The logged-in user, read fresh from the database.
pub async fn me(
    RequireAuth(current): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<User>> {
    let user = crate::db::UserRepository::new(state.pool())
        .get_by_id(current.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized".to_owned()))?;
    Ok(Json(user))
}
