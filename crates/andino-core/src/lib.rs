// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Andino tour-package backend.
//!
//! This crate provides the domain types, error taxonomy, capability checks,
//! and the notification trait used throughout the Andino workspace. It has no
//! I/O of its own.

pub mod authz;
pub mod error;
pub mod notifier;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::AndinoError;
pub use notifier::{NotificationKind, Notifier};
pub use types::{
    Cart, CartItem, CartStatus, Difficulty, Package, PaymentMethod, Role, Sale, SaleLine,
    SaleState, User,
};
