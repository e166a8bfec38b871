// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Andino tour backend.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed query modules for users,
//! packages, carts, and sales. The checkout, cancellation, and line-edit
//! operations each run inside one SQLite transaction; package availability is
//! guarded by an atomic conditional decrement so concurrent checkouts cannot
//! oversell.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

#[cfg(test)]
pub(crate) mod testutil;

pub use database::Database;
pub use models::*;
pub use queries::Rejection;
