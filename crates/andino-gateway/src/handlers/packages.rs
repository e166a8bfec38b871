// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog endpoints.

use andino_core::types::{Difficulty, Package, User};
use andino_service::NewPackage;
use andino_storage::queries::packages::{PackageFilter, PackageUpdate};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub destination: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    #[serde(default)]
    pub available_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /v1/packages
pub async fn list(
    State(state): State<GatewayState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Package>>, ApiError> {
    let filter = PackageFilter {
        destination: query.destination,
        category: query.category,
        featured: query.featured,
        available_only: query.available_only,
        limit: query.limit,
        offset: query.offset,
    };
    Ok(Json(state.services.list_packages(filter).await?))
}

/// GET /v1/packages/{id}
pub async fn get(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<Package>, ApiError> {
    Ok(Json(state.services.get_package(&id).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreatePackageRequest {
    pub name: String,
    pub description: String,
    pub destination: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_days: u32,
    pub price: Decimal,
    pub capacity: i64,
    #[serde(default)]
    pub featured: bool,
}

/// POST /v1/packages (staff only).
pub async fn create(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Json(body): Json<CreatePackageRequest>,
) -> Result<(StatusCode, Json<Package>), ApiError> {
    let package = state
        .services
        .create_package(
            &caller,
            NewPackage {
                name: body.name,
                description: body.description,
                destination: body.destination,
                category: body.category,
                difficulty: body.difficulty,
                duration_days: body.duration_days,
                price: body.price,
                capacity: body.capacity,
                featured: body.featured,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(package)))
}

#[derive(Debug, Deserialize, Default)]
pub struct UpdatePackageRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub duration_days: Option<u32>,
    pub price: Option<Decimal>,
    pub capacity: Option<i64>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}

/// PATCH /v1/packages/{id} (staff only).
pub async fn update(
    State(state): State<GatewayState>,
    Extension(caller): Extension<User>,
    Path(id): Path<String>,
    Json(body): Json<UpdatePackageRequest>,
) -> Result<Json<Package>, ApiError> {
    let update = PackageUpdate {
        name: body.name,
        description: body.description,
        destination: body.destination,
        category: body.category,
        difficulty: body.difficulty,
        duration_days: body.duration_days,
        price: body.price,
        capacity: body.capacity,
        featured: body.featured,
        active: body.active,
    };
    Ok(Json(state.services.update_package(&caller, &id, update).await?))
}
