// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication middleware.
//!
//! Tokens resolve to active user accounts; the resolved [`User`] is attached
//! to the request extensions for handlers. Requests without a valid token are
//! rejected (fail-closed).

use andino_core::types::User;
use andino_core::AndinoError;
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Resolve `Authorization: Bearer <token>` to a user and forward the request.
pub async fn auth_middleware(
    State(state): State<GatewayState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AndinoError::Unauthenticated)?;

    let user = andino_storage::queries::users::get_by_token(state.services.db(), token)
        .await?
        .ok_or_else(|| {
            debug!("bearer token did not match an active account");
            AndinoError::Unauthenticated
        })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
