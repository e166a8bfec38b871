// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart endpoints. Always scoped to the authenticated caller.

use andino_core::types::{Cart, CartItem, User};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: Cart,
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

/// GET /v1/cart
pub async fn view(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
) -> Result<Json<CartResponse>, ApiError> {
    let view = state.services.view_cart(&caller).await?;
    Ok(Json(CartResponse {
        cart: view.cart,
        items: view.items,
        total: view.total,
    }))
}

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub package_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub travel_date: Option<String>,
}

/// POST /v1/cart/items
pub async fn add_item(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Json(body): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<CartItem>), ApiError> {
    let item = state
        .services
        .add_to_cart(&caller, &body.package_id, body.quantity, body.travel_date)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /v1/cart/items/{id}
pub async fn remove_item(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.services.remove_from_cart(&caller, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/cart/items
pub async fn clear(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
) -> Result<StatusCode, ApiError> {
    state.services.clear_cart(&caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
