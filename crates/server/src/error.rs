//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Every error renders as a JSON
//! body `{"error": "<message>"}`, with a `fields` map for validation failures.
//! Server errors are captured to Sentry before responding, and their details
//! never reach the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use seedmart_core::FieldErrors;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;
use crate::services::orders::OrderError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Registration or login failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Order placement or update failed.
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    /// Request fields failed validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("{0}")]
    Unauthorized(String),

    /// User may not perform this action.
    #[error("{0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Request conflicts with existing data.
    #[error("{0}")]
    Conflict(String),

    /// A feature is disabled by configuration.
    #[error("{0}")]
    ServiceUnavailable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(err) | Self::Order(OrderError::Repository(err)) => match err {
                RepositoryError::NotFound => StatusCode::NOT_FOUND,
                RepositoryError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Auth(err) => match err {
                AuthError::Validation(_) => StatusCode::BAD_REQUEST,
                AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                AuthError::UserAlreadyExists => StatusCode::CONFLICT,
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Order(err) => match err {
                OrderError::BuyerNotFound
                | OrderError::ProductNotFound(_)
                | OrderError::OrderNotFound => StatusCode::NOT_FOUND,
                OrderError::KycNotApproved => StatusCode::FORBIDDEN,
                OrderError::Pricing(_) | OrderError::Credit(_) => StatusCode::BAD_REQUEST,
                OrderError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Validation(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message.
    fn message(&self) -> String {
        match self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_owned(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Auth(err) => match err {
                AuthError::Validation(_) => "Validation failed".to_owned(),
                AuthError::InvalidCredentials => "Invalid email or password".to_owned(),
                AuthError::UserAlreadyExists => "Email already registered".to_owned(),
                AuthError::Repository(_) | AuthError::PasswordHash => {
                    "Internal server error".to_owned()
                }
            },
            Self::Order(OrderError::Repository(_)) => "Internal server error".to_owned(),
            Self::Order(err) => err.to_string(),
            Self::Validation(_) => "Validation failed".to_owned(),
            Self::ServiceUnavailable(msg) => msg.clone(),
            _ if self.status().is_server_error() => "Internal server error".to_owned(),
            _ => self.to_string(),
        }
    }

    fn fields(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation(fields) | Self::Auth(AuthError::Validation(fields)) => Some(fields),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && !matches!(self, Self::ServiceUnavailable(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let body = match self.fields() {
            Some(fields) => json!({ "error": self.message(), "fields": fields }),
            None => json!({ "error": self.message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<FieldErrors> for AppError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for an admin or buyer action.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of actions
/// leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use seedmart_core::pricing::{CreditError, PricingError};
    use seedmart_core::ProductId;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_simple_errors_render_json() {
        let (status, body) = render(AppError::NotFound("Buyer not found".to_owned())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Buyer not found" }));

        let (status, body) =
            render(AppError::Forbidden("Forbidden: Admin access required".to_owned())).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden: Admin access required");
    }

    #[tokio::test]
    async fn test_validation_includes_fields() {
        let mut fields = FieldErrors::new();
        fields.add("gst_number", "Invalid GSTIN format");
        let (status, body) = render(AppError::Auth(AuthError::Validation(fields))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
        assert_eq!(body["fields"]["gst_number"], "Invalid GSTIN format");
    }

    #[tokio::test]
    async fn test_auth_errors() {
        let (status, body) = render(AuthError::InvalidCredentials.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Invalid email or password");

        let (status, _) = render(AuthError::UserAlreadyExists.into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_order_errors() {
        let (status, body) = render(OrderError::KycNotApproved.into()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "KYC not approved. Contact admin.");

        let (status, body) = render(OrderError::ProductNotFound(ProductId::new(4)).into()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found: 4");

        let (status, body) = render(OrderError::Pricing(PricingError::EmptyOrder).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No items in order");

        let credit = CreditError {
            total: rust_decimal::Decimal::from(200),
            available: rust_decimal::Decimal::from(100),
        };
        let (status, body) = render(OrderError::Credit(credit).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Order total (₹200.00) exceeds available credit (₹100.00). Contact admin."
        );
    }

    #[tokio::test]
    async fn test_internal_details_hidden() {
        let (status, body) = render(AppError::Internal("pool exhausted".to_owned())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");

        let (status, body) =
            render(AppError::Database(RepositoryError::DataCorruption("bad".to_owned()))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_service_unavailable_keeps_message() {
        let (status, body) = render(AppError::ServiceUnavailable(
            "ADMIN_SETUP_SECRET is not configured on the server.".to_owned(),
        ))
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "ADMIN_SETUP_SECRET is not configured on the server.");
    }

    #[tokio::test]
    async fn test_repository_conflict_passes_message() {
        let (status, body) =
            render(RepositoryError::Conflict("lot number already exists".to_owned()).into()).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "lot number already exists");
    }
}
