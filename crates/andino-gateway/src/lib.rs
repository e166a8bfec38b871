// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP API for the Andino tour backend.
//!
//! Exposes the catalog, cart, and sale services over axum with bearer-token
//! authentication. `/health` and account registration are public; every
//! other route resolves the token to a user before the handler runs.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;

pub use server::{build_router, start_server, GatewayState};
