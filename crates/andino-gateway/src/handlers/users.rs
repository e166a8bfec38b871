// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Public account registration.

use andino_core::types::Role;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::GatewayState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
}

/// The only response that ever carries the API token.
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub api_token: String,
    pub created_at: String,
}

/// POST /v1/users - register a client account.
pub async fn register(
    State(state): State<GatewayState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state
        .services
        .register(&body.email, &body.full_name, Role::Client)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            api_token: user.api_token,
            created_at: user.created_at,
        }),
    ))
}
