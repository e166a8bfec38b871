// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cart and cart-line queries.
//!
//! Every user has exactly one active cart (created at registration, replaced
//! at checkout). Adding a package that is already in the cart for the same
//! travel date merges into the existing line instead of duplicating it.

use andino_core::AndinoError;
use andino_core::types::{Cart, CartItem, CartStatus};
use rusqlite::{OptionalExtension, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Rejection, parse_decimal, parse_enum};
use crate::database::{Database, map_tr_err, now};

fn row_to_cart(row: &rusqlite::Row<'_>) -> Result<Cart, rusqlite::Error> {
    Ok(Cart {
        id: row.get(0)?,
        user_id: row.get(1)?,
        status: parse_enum(2, &row.get::<_, String>(2)?)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn row_to_item(row: &rusqlite::Row<'_>) -> Result<CartItem, rusqlite::Error> {
    Ok(CartItem {
        id: row.get(0)?,
        cart_id: row.get(1)?,
        package_id: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: parse_decimal(4, &row.get::<_, String>(4)?)?,
        travel_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const CART_COLUMNS: &str = "id, user_id, status, created_at, updated_at";
const ITEM_COLUMNS: &str = "id, cart_id, package_id, quantity, unit_price, travel_date, created_at";

/// Insert a fresh active cart for `user_id`. Fails if one already exists
/// (partial unique index).
pub async fn create_active_cart(db: &Database, user_id: &str) -> Result<Cart, AndinoError> {
    let cart = Cart {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        status: CartStatus::Active,
        created_at: now(),
        updated_at: now(),
    };
    let c = cart.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO carts (id, user_id, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![c.id, c.user_id, c.status.to_string(), c.created_at, c.updated_at],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;
    Ok(cart)
}

/// The user's active cart, if any.
pub async fn get_active_cart(db: &Database, user_id: &str) -> Result<Option<Cart>, AndinoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CART_COLUMNS} FROM carts WHERE user_id = ?1 AND status = 'active'"
            ))?;
            stmt.query_row(params![user_id], row_to_cart).optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All line items of a cart, oldest first.
pub async fn list_items(db: &Database, cart_id: &str) -> Result<Vec<CartItem>, AndinoError> {
    let cart_id = cart_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ITEM_COLUMNS} FROM cart_items WHERE cart_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![cart_id], row_to_item)?;
            rows.collect::<Result<Vec<CartItem>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Add a package to the user's active cart.
///
/// Merge-on-add: an existing line for the same (package, travel_date) has its
/// quantity incremented; otherwise a new line is inserted with the unit price
/// snapshotted from the package's current price. Returns the resulting line.
pub async fn add_item(
    db: &Database,
    user_id: &str,
    package_id: &str,
    quantity: i64,
    travel_date: Option<String>,
) -> Result<Result<CartItem, Rejection>, AndinoError> {
    let user_id = user_id.to_string();
    let package_id = package_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let cart_id: String = {
                let row: Option<String> = tx
                    .query_row(
                        "SELECT id FROM carts WHERE user_id = ?1 AND status = 'active'",
                        params![user_id],
                        |row| row.get(0),
                    )
                    .optional()?;
                match row {
                    Some(id) => id,
                    None => {
                        return Ok(Err(Rejection::NotFound {
                            entity: "cart",
                            id: user_id,
                        }));
                    }
                }
            };

            // Only active packages can be added; price snapshot happens here.
            let price: Option<String> = tx
                .query_row(
                    "SELECT price FROM packages WHERE id = ?1 AND active = 1",
                    params![package_id],
                    |row| row.get(0),
                )
                .optional()?;
            let price = match price {
                Some(p) => p,
                None => {
                    return Ok(Err(Rejection::NotFound {
                        entity: "package",
                        id: package_id,
                    }));
                }
            };

            let existing = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {ITEM_COLUMNS} FROM cart_items
                     WHERE cart_id = ?1 AND package_id = ?2 AND travel_date IS ?3"
                ))?;
                stmt.query_row(params![cart_id, package_id, travel_date], row_to_item)
                    .optional()?
            };

            let item = match existing {
                Some(mut item) => {
                    item.quantity += quantity;
                    tx.execute(
                        "UPDATE cart_items SET quantity = ?1 WHERE id = ?2",
                        params![item.quantity, item.id],
                    )?;
                    item
                }
                None => {
                    let item = CartItem {
                        id: Uuid::new_v4().to_string(),
                        cart_id: cart_id.clone(),
                        package_id,
                        quantity,
                        unit_price: parse_decimal(0, &price)?,
                        travel_date,
                        created_at: now(),
                    };
                    tx.execute(
                        "INSERT INTO cart_items (id, cart_id, package_id, quantity,
                             unit_price, travel_date, created_at)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                        params![
                            item.id,
                            item.cart_id,
                            item.package_id,
                            item.quantity,
                            item.unit_price.to_string(),
                            item.travel_date,
                            item.created_at,
                        ],
                    )?;
                    item
                }
            };

            tx.execute(
                "UPDATE carts SET updated_at = ?1 WHERE id = ?2",
                params![now(), cart_id],
            )?;
            tx.commit()?;
            Ok(Ok(item))
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one line from the user's active cart. Returns false when the line
/// does not exist there (wrong user, wrong cart, or already gone).
pub async fn remove_item(
    db: &Database,
    user_id: &str,
    item_id: &str,
) -> Result<bool, AndinoError> {
    let user_id = user_id.to_string();
    let item_id = item_id.to_string();
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM cart_items
                 WHERE id = ?1 AND cart_id IN
                     (SELECT id FROM carts WHERE user_id = ?2 AND status = 'active')",
                params![item_id, user_id],
            )?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete all lines of the user's active cart. Idempotent.
pub async fn clear(db: &Database, user_id: &str) -> Result<(), AndinoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM cart_items
                 WHERE cart_id IN
                     (SELECT id FROM carts WHERE user_id = ?1 AND status = 'active')",
                params![user_id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Sum of quantity x unit price across the active cart. Zero when empty.
pub async fn cart_total(db: &Database, user_id: &str) -> Result<Decimal, AndinoError> {
    let cart = get_active_cart(db, user_id).await?;
    let Some(cart) = cart else {
        return Ok(Decimal::ZERO);
    };
    let items = list_items(db, &cart.id).await?;
    Ok(items.iter().map(CartItem::subtotal).sum())
}
