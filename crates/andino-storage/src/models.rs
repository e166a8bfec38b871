// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `andino-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use andino_core::types::{
    Cart, CartItem, CartStatus, Difficulty, Package, PaymentMethod, Role, Sale, SaleLine,
    SaleState, User,
};
