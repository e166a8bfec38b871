// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error-to-HTTP translation.

use andino_core::AndinoError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

/// Wrapper so domain errors can flow out of handlers with `?`.
#[derive(Debug)]
pub struct ApiError(pub AndinoError);

impl From<AndinoError> for ApiError {
    fn from(e: AndinoError) -> Self {
        Self(e)
    }
}

/// Stable machine-readable error code for a domain error.
fn error_code(e: &AndinoError) -> &'static str {
    match e {
        AndinoError::NotFound { .. } => "not_found",
        AndinoError::InvalidQuantity { .. } => "invalid_quantity",
        AndinoError::EmptyCart => "empty_cart",
        AndinoError::InsufficientCapacity { .. } => "insufficient_capacity",
        AndinoError::InvalidState { .. } => "invalid_state",
        AndinoError::Validation(_) => "invalid_request",
        AndinoError::Conflict(_) => "conflict",
        AndinoError::Unauthenticated => "unauthenticated",
        AndinoError::Forbidden => "forbidden",
        _ => "internal",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AndinoError::NotFound { .. } => StatusCode::NOT_FOUND,
            AndinoError::InvalidQuantity { .. }
            | AndinoError::EmptyCart
            | AndinoError::Validation(_) => StatusCode::BAD_REQUEST,
            AndinoError::InsufficientCapacity { .. }
            | AndinoError::InvalidState { .. }
            | AndinoError::Conflict(_) => StatusCode::CONFLICT,
            AndinoError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AndinoError::Forbidden => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Infra details stay in the logs, not in the response body.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self.0, "internal error");
            "internal error".to_string()
        } else {
            self.0.to_string()
        };

        let body = Json(json!({
            "error": { "code": error_code(&self.0), "message": message }
        }));
        (status, body).into_response()
    }
}
