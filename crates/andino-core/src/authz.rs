// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability checks for the Andino API.
//!
//! A single pure function decides every permission question, independent of
//! transport. Services call [`check`] and translate a deny into
//! `AndinoError::Forbidden`.

use crate::types::Role;

/// Actions a caller can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Browse packages. Open to every authenticated role.
    ViewCatalog,
    /// Create or update packages.
    ManageCatalog,
    /// Read or mutate a cart.
    UseCart,
    /// Convert a cart into a sale.
    Checkout,
    /// Read a single sale.
    ViewSale,
    /// List sales across all users.
    ListAllSales,
    /// Confirm payment of a pending sale.
    ConfirmSale,
    /// Cancel a pending or confirmed sale.
    CancelSale,
    /// Edit or remove a pending sale's lines.
    EditSaleLines,
}

/// Decide whether `caller` (with `role`) may perform `action` on a resource
/// owned by `owner`. `owner` is `None` for resources without an owner
/// (the catalog, cross-user listings).
pub fn check(role: Role, caller: &str, owner: Option<&str>, action: Action) -> bool {
    let owns = owner.is_some_and(|o| o == caller);
    match action {
        Action::ViewCatalog => true,
        Action::ManageCatalog => role.is_staff(),
        // Carts are strictly personal, even for staff.
        Action::UseCart | Action::Checkout => owns,
        Action::ViewSale => owns || role.is_staff(),
        Action::ListAllSales => role.is_staff(),
        // Sale lifecycle is back-office work.
        Action::ConfirmSale | Action::CancelSale | Action::EditSaleLines => role.is_staff(),
    }
}
