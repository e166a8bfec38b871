// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart operations. Carts are strictly personal; every method acts on the
//! caller's own active cart.

use andino_core::types::{Cart, CartItem, User};
use andino_core::AndinoError;
use andino_storage::queries::carts;
use rust_decimal::Decimal;

use crate::Services;

/// The caller's active cart with its lines and running total.
#[derive(Debug, Clone)]
pub struct CartView {
    pub cart: Cart,
    pub items: Vec<CartItem>,
    pub total: Decimal,
}

impl Services {
    /// The caller's active cart, its lines, and the total.
    pub async fn view_cart(&self, caller: &User) -> Result<CartView, AndinoError> {
        let cart = carts::get_active_cart(&self.db, &caller.id)
            .await?
            .ok_or_else(|| AndinoError::not_found("cart", &caller.id))?;
        let items = carts::list_items(&self.db, &cart.id).await?;
        let total = items.iter().map(CartItem::subtotal).sum();
        Ok(CartView { cart, items, total })
    }

    /// Add a package to the caller's cart, merging with an existing line for
    /// the same package and travel date.
    pub async fn add_to_cart(
        &self,
        caller: &User,
        package_id: &str,
        quantity: i64,
        travel_date: Option<String>,
    ) -> Result<CartItem, AndinoError> {
        if quantity < 1 {
            return Err(AndinoError::InvalidQuantity { quantity });
        }
        let item = carts::add_item(&self.db, &caller.id, package_id, quantity, travel_date)
            .await??;
        Ok(item)
    }

    /// Remove one line from the caller's cart.
    pub async fn remove_from_cart(&self, caller: &User, item_id: &str) -> Result<(), AndinoError> {
        let removed = carts::remove_item(&self.db, &caller.id, item_id).await?;
        if !removed {
            return Err(AndinoError::not_found("cart item", item_id));
        }
        Ok(())
    }

    /// Empty the caller's cart. Idempotent.
    pub async fn clear_cart(&self, caller: &User) -> Result<(), AndinoError> {
        carts::clear(&self.db, &caller.id).await
    }
}
