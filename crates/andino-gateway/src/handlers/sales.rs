// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sale endpoints: checkout and lifecycle.

use andino_core::types::{PaymentMethod, Sale, SaleLine, User};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    #[serde(flatten)]
    pub sale: Sale,
    pub lines: Vec<SaleLine>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub travel_date: Option<String>,
}

/// POST /v1/sales - convert the caller's cart into a pending sale.
pub async fn checkout(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<SaleResponse>), ApiError> {
    let (sale, lines) = state
        .services
        .checkout(&caller, body.payment_method, body.notes, body.travel_date)
        .await?;
    Ok((StatusCode::CREATED, Json(SaleResponse { sale, lines })))
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// List across all users. Staff only.
    #[serde(default)]
    pub all: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /v1/sales
pub async fn list(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let sales = state
        .services
        .list_sales(
            &caller,
            query.all,
            query.limit.unwrap_or(100),
            query.offset.unwrap_or(0),
        )
        .await?;
    Ok(Json(sales))
}

/// GET /v1/sales/{id}
pub async fn get(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<SaleResponse>, ApiError> {
    let (sale, lines) = state.services.get_sale(&caller, &id).await?;
    Ok(Json(SaleResponse { sale, lines }))
}

/// POST /v1/sales/{id}/confirm (staff only).
pub async fn confirm(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    Ok(Json(state.services.confirm_sale(&caller, &id).await?))
}

/// POST /v1/sales/{id}/cancel (staff only).
pub async fn cancel(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
) -> Result<Json<Sale>, ApiError> {
    Ok(Json(state.services.cancel_sale(&caller, &id).await?))
}

#[derive(Debug, Deserialize)]
pub struct UpdateLineRequest {
    pub quantity: i64,
}

#[derive(Debug, Serialize)]
pub struct UpdateLineResponse {
    pub sale: Sale,
    pub line: SaleLine,
}

/// PATCH /v1/sales/{id}/lines/{line_id} (staff only).
pub async fn update_line(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Path((id, line_id)): Path<(String, String)>,
    Json(body): Json<UpdateLineRequest>,
) -> Result<Json<UpdateLineResponse>, ApiError> {
    let (sale, line) = state
        .services
        .update_sale_line(&caller, &id, &line_id, body.quantity)
        .await?;
    Ok(Json(UpdateLineResponse { sale, line }))
}

/// DELETE /v1/sales/{id}/lines/{line_id} (staff only).
pub async fn remove_line(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Path((id, line_id)): Path<(String, String)>,
) -> Result<Json<Sale>, ApiError> {
    Ok(Json(
        state.services.remove_sale_line(&caller, &id, &line_id).await?,
    ))
}
