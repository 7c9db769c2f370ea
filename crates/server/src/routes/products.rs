//! Catalogue routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use seedmart_core::ProductId;

use crate::db::ProductRepository;
use crate::db::products::ProductFilter;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::extract::ApiJson;
use crate::middleware::{CatalogueAccess, RequireAdmin};
use crate::models::{Product, ProductInput};
use crate::state::AppState;

/// Build the `/api/products` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(index).post(create))
        .route("/{id}", get(show).put(update).delete(deactivate))
}

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

/// Active products, newest first.
pub async fn index(
    _access: CatalogueAccess,
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = ProductFilter {
        category: query.category.as_deref().filter(|c| !c.trim().is_empty()),
        search: query.search.as_deref().filter(|s| !s.trim().is_empty()),
    };
    let products = ProductRepository::new(state.pool())
        .list_active(&filter)
        .await?;
    Ok(Json(products))
}

/// A single product.
pub async fn show(
    _access: CatalogueAccess,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// Add a product to the catalogue.
#[instrument(skip_all)]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let input = input.validate()?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    state.catalogue().invalidate().await;

    info!(product_id = %product.id, admin_id = %admin.id, "Product created");
    add_breadcrumb(
        "catalogue",
        "Created product",
        Some(&[("lot_number", product.lot_number.as_str())]),
    );
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace a product's fields.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    ApiJson(input): ApiJson<ProductInput>,
) -> Result<Json<Product>> {
    let input = input.validate()?;
    let product = ProductRepository::new(state.pool())
        .update(id, &input)
        .await
        .map_err(not_found)?;
    state.catalogue().invalidate().await;
    Ok(Json(product))
}

/// Soft delete: the product leaves the catalogue but stays referenced by
/// past orders.
#[instrument(skip_all, fields(product_id = %id))]
pub async fn deactivate(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>> {
    ProductRepository::new(state.pool())
        .deactivate(id)
        .await
        .map_err(not_found)?;
    state.catalogue().invalidate().await;
    Ok(Json(json!({ "success": true })))
}

fn not_found(err: crate::db::RepositoryError) -> AppError {
    match err {
        crate::db::RepositoryError::NotFound => AppError::NotFound("Product not found".to_owned()),
        other => other.into(),
    }
}
