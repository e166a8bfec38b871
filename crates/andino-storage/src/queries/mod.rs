// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query operations, one module per entity.

use andino_core::AndinoError;
use rust_decimal::Decimal;

pub mod carts;
pub mod packages;
pub mod sales;
pub mod users;

/// A domain-level refusal raised from inside a storage transaction.
///
/// Transactions return `Ok(Err(Rejection))` for business failures so the
/// closure's error type stays `rusqlite::Error`; the transaction is rolled
/// back (dropped uncommitted) before the rejection is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    NotFound {
        entity: &'static str,
        id: String,
    },
    InvalidState {
        state: String,
        action: String,
    },
    InsufficientCapacity {
        package: String,
        requested: i64,
        available: i64,
    },
    EmptyCart,
    Conflict(String),
}

impl From<Rejection> for AndinoError {
    fn from(r: Rejection) -> Self {
        match r {
            Rejection::NotFound { entity, id } => AndinoError::NotFound { entity, id },
            Rejection::InvalidState { state, action } => AndinoError::InvalidState { state, action },
            Rejection::InsufficientCapacity {
                package,
                requested,
                available,
            } => AndinoError::InsufficientCapacity {
                package,
                requested,
                available,
            },
            Rejection::EmptyCart => AndinoError::EmptyCart,
            Rejection::Conflict(msg) => AndinoError::Conflict(msg),
        }
    }
}

/// Parse a TEXT column into a fixed-point decimal.
pub(crate) fn parse_decimal(idx: usize, text: &str) -> Result<Decimal, rusqlite::Error> {
    text.parse::<Decimal>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a TEXT column into a strum-backed enum.
pub(crate) fn parse_enum<T>(idx: usize, text: &str) -> Result<T, rusqlite::Error>
where
    T: std::str::FromStr<Err = strum::ParseError>,
{
    text.parse::<T>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
