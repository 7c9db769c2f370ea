//! Request extractors.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};

use crate::error::AppError;

/// JSON request body whose rejections render as [`AppError::BadRequest`].
///
/// axum's own `Json` answers malformed bodies with 415/422 and a plain-text
/// message; handlers take `ApiJson` so every failure uses the JSON error body.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| Self(value))
            .map_err(|rejection| {
                tracing::debug!(error = %rejection, "Rejected request body");
                AppError::BadRequest(rejection.body_text())
            })
    }
}
