//! Order routes.
//!
//! Buyers see and place their own orders; admins see every order and move
//! orders through fulfilment.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use seedmart_core::{OrderId, OrderStatus};

use crate::db::OrderRepository;
use crate::db::orders::OrderUpdate;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::OrderDetail;
use crate::services::orders::{OrderRequest, OrderService};
use crate::state::AppState;

/// Build the `/api/orders` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", get(show).patch(update))
}

/// Admin status update body.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
    pub tracking_id: Option<String>,
    pub shipping_carrier: Option<String>,
    pub shipping_details: Option<String>,
}

impl StatusUpdateRequest {
    fn into_update(self) -> Result<OrderUpdate> {
        let status = self
            .status
            .as_deref()
            .map(str::trim)
            .and_then(|s| s.parse::<OrderStatus>().ok())
            .ok_or_else(|| AppError::BadRequest("Invalid status".to_owned()))?;

        Ok(OrderUpdate {
            status,
            tracking_id: self.tracking_id,
            shipping_carrier: self.shipping_carrier,
            shipping_details: self.shipping_details,
        })
    }
}

/// Orders visible to the caller, newest first.
pub async fn index(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> Result<Json<Value>> {
    let repo = OrderRepository::new(state.pool());
    let buyer = (!user.is_admin()).then_some(user.id);
    let orders = repo.with_details(repo.list(buyer).await?).await?;
    Ok(Json(json!({ "orders": orders })))
}

/// One order, for its buyer or an admin.
pub async fn show(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Value>> {
    let order = OrderRepository::new(state.pool())
        .get_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_owned()))?;

    if !user.is_admin() && order.order.buyer_id != user.id {
        return Err(AppError::Forbidden("Forbidden".to_owned()));
    }
    Ok(Json(json!({ "order": order })))
}

/// Place an order. Prices are taken from the catalogue.
#[instrument(skip_all, fields(buyer_id = %user.id))]
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<OrderRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let order: OrderDetail = OrderService::new(state.pool(), &state.config().seller, state.email())
        .place(user.id, request)
        .await?;

    add_breadcrumb(
        "orders",
        "Placed order",
        Some(&[("order_number", order.order.order_number.as_str())]),
    );
    Ok((StatusCode::CREATED, Json(json!({ "order": order }))))
}

/// Change an order's status and shipping details.
#[instrument(skip_all, fields(order_id = %id))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    ApiJson(body): ApiJson<StatusUpdateRequest>,
) -> Result<Json<Value>> {
    let update = body.into_update()?;
    let order = OrderService::new(state.pool(), &state.config().seller, state.email())
        .update(id, update)
        .await?;
    Ok(Json(json!({ "order": order })))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_validated() {
        let req = StatusUpdateRequest {
            status: Some("shipped".to_owned()),
            tracking_id: Some("DTDC123".to_owned()),
            ..Default::default()
        };
        let update = req.into_update().unwrap();
        assert_eq!(update.status, OrderStatus::Shipped);
        assert_eq!(update.tracking_id.as_deref(), Some("DTDC123"));

        for bad in [None, Some("lost"), Some("")] {
            let req = StatusUpdateRequest {
                status: bad.map(str::to_owned),
                ..Default::default()
            };
            assert!(matches!(req.into_update(), Err(AppError::BadRequest(_))));
        }
    }
}
