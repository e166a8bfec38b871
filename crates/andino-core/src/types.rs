// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Andino workspace.
//!
//! Timestamps are ISO 8601 strings as stored in SQLite; prices are
//! fixed-point [`Decimal`] values serialized as strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Role assigned to a user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular customer: owns a cart, checks out, sees own sales.
    Client,
    /// Sales staff: manages the catalog and all sales.
    SalesStaff,
    /// Full administrative access.
    Admin,
}

impl Role {
    /// Whether this role carries staff privileges (catalog writes, sale
    /// management, cross-user reads).
    pub fn is_staff(self) -> bool {
        matches!(self, Role::SalesStaff | Role::Admin)
    }
}

/// Lifecycle state of a sale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SaleState {
    Pending,
    Confirmed,
    Cancelled,
}

/// Payment method recorded on a sale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    CreditCard,
    DebitCard,
    BankTransfer,
}

/// Lifecycle state of a cart. Exactly one `Active` cart exists per user.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CartStatus {
    Active,
    CheckedOut,
}

/// Physical difficulty rating of a tour package.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Low,
    Medium,
    High,
}

/// A user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    /// Bearer token presented on API requests. Never serialized to other users.
    #[serde(skip_serializing)]
    pub api_token: String,
    pub active: bool,
    pub created_at: String,
}

/// A purchasable tour package with fixed capacity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub id: String,
    pub name: String,
    pub description: String,
    pub destination: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_days: u32,
    pub price: Decimal,
    /// Maximum number of sale-able units.
    pub capacity: i64,
    /// Stored availability counter. Invariant: `0 <= available <= capacity`.
    pub available: i64,
    pub featured: bool,
    pub active: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// A user's in-progress selection of packages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    pub status: CartStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// One line of a cart: a package, a quantity, and the unit price locked in
/// when the line was added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub cart_id: String,
    pub package_id: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub travel_date: Option<String>,
    pub created_at: String,
}

impl CartItem {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// An immutable record of a completed checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    /// Human-readable code, e.g. `AND-9F3A21C0`.
    pub code: String,
    pub user_id: String,
    pub state: SaleState,
    pub payment_method: PaymentMethod,
    pub payment_confirmed: bool,
    pub confirmed_at: Option<String>,
    pub notes: Option<String>,
    pub travel_date: Option<String>,
    /// Stored total, recomputed only by pending-line edits.
    pub total: Decimal,
    pub created_at: String,
}

/// One line of a sale. Unit price is copied from the cart line at checkout
/// and never changes afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub package_id: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub travel_date: Option<String>,
    pub created_at: String,
}

impl SaleLine {
    pub fn subtotal(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
