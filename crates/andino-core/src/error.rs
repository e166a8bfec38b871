// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Andino tour backend.

use thiserror::Error;

/// The primary error type used across all Andino crates.
///
/// The first group of variants is the domain taxonomy surfaced to API
/// callers; the second group covers infrastructure failures.
#[derive(Debug, Error)]
pub enum AndinoError {
    /// Entity absent, inactive, or not owned by the caller.
    #[error("not found: {entity} {id}")]
    NotFound { entity: &'static str, id: String },

    /// Quantity below 1 on a cart or sale line.
    #[error("invalid quantity: {quantity}")]
    InvalidQuantity { quantity: i64 },

    /// Checkout attempted against a cart with no line items.
    #[error("cart is empty")]
    EmptyCart,

    /// A package cannot cover the requested quantity.
    #[error("insufficient capacity for package {package}: requested {requested}, available {available}")]
    InsufficientCapacity {
        package: String,
        requested: i64,
        available: i64,
    },

    /// Illegal sale state transition (e.g. cancelling a cancelled sale).
    #[error("invalid state: cannot {action} a sale in state {state}")]
    InvalidState { state: String, action: String },

    /// Malformed input (bad email, negative capacity or price).
    #[error("invalid request: {0}")]
    Validation(String),

    /// A uniqueness constraint was violated (duplicate email, duplicate code).
    #[error("conflict: {0}")]
    Conflict(String),

    /// No identity could be resolved for the request.
    #[error("unauthenticated")]
    Unauthenticated,

    /// The caller's role does not permit the requested action.
    #[error("forbidden")]
    Forbidden,

    /// Configuration errors (invalid TOML, missing required fields).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Notification dispatch errors. Always logged, never surfaced to callers.
    #[error("notification error: {message}")]
    Notify {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AndinoError {
    /// Shorthand for the common "entity/id" not-found case.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Shorthand for illegal sale state transitions.
    pub fn invalid_state(state: impl Into<String>, action: impl Into<String>) -> Self {
        Self::InvalidState {
            state: state.into(),
            action: action.into(),
        }
    }
}
