//! Seed advisor routes: rule-based recommendations and chat.

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use seedmart_core::advisor::{ChatContext, RecommendationRequest, recommend, reply};
use seedmart_core::sanitize;

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::state::AppState;

/// Build the `/api/ai` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/recommend", post(recommendations))
        .route("/chat", post(chat))
}

/// Best-matching active products for a distributor's conditions.
pub async fn recommendations(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RecommendationRequest>,
) -> Result<Json<Value>> {
    if [&request.state, &request.soil_type, &request.season]
        .iter()
        .any(|field| field.trim().is_empty())
    {
        return Err(AppError::BadRequest(
            "state, soil_type and season are required".to_owned(),
        ));
    }

    let products = state.catalogue().active_products(state.pool()).await?;
    let recommendations = recommend(&request, &products);
    debug!(
        state = %request.state,
        season = %request.season,
        matches = recommendations.len(),
        "Scored catalogue"
    );

    Ok(Json(json!({ "recommendations": recommendations })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub message: String,
}

/// Answer a distributor's question.
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<Value>> {
    let message = sanitize(&body.message);
    if message.is_empty() {
        return Err(AppError::BadRequest("message is required".to_owned()));
    }

    let products = state.catalogue().active_products(state.pool()).await?;
    let seller = &state.config().seller;
    let ctx = ChatContext {
        products: products.as_slice(),
        seller_name: &seller.name,
        seller_gstin: seller.gstin.as_str(),
    };

    Ok(Json(json!({ "response": reply(&message, &ctx) })))
}
