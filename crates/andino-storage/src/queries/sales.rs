// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sale queries and the checkout engine.
//!
//! Checkout, cancellation, and pending-line edits each run inside a single
//! SQLite transaction. The availability guard is an atomic conditional
//! decrement (`UPDATE ... SET available = available - :qty WHERE id = :id AND
//! available >= :qty`); zero affected rows means the package cannot cover the
//! request and the whole transaction is rolled back. Combined with the
//! single-writer connection this makes overselling impossible.

use andino_core::AndinoError;
use andino_core::types::{PaymentMethod, Sale, SaleLine, SaleState};
use rusqlite::{OptionalExtension, Transaction, params};
use rust_decimal::Decimal;
use uuid::Uuid;

use super::{Rejection, parse_decimal, parse_enum};
use crate::database::{Database, map_tr_err, now};

fn row_to_sale(row: &rusqlite::Row<'_>) -> Result<Sale, rusqlite::Error> {
    Ok(Sale {
        id: row.get(0)?,
        code: row.get(1)?,
        user_id: row.get(2)?,
        state: parse_enum(3, &row.get::<_, String>(3)?)?,
        payment_method: parse_enum(4, &row.get::<_, String>(4)?)?,
        payment_confirmed: row.get(5)?,
        confirmed_at: row.get(6)?,
        notes: row.get(7)?,
        travel_date: row.get(8)?,
        total: parse_decimal(9, &row.get::<_, String>(9)?)?,
        created_at: row.get(10)?,
    })
}

fn row_to_line(row: &rusqlite::Row<'_>) -> Result<SaleLine, rusqlite::Error> {
    Ok(SaleLine {
        id: row.get(0)?,
        sale_id: row.get(1)?,
        package_id: row.get(2)?,
        quantity: row.get(3)?,
        unit_price: parse_decimal(4, &row.get::<_, String>(4)?)?,
        travel_date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const SALE_COLUMNS: &str = "id, code, user_id, state, payment_method, payment_confirmed, \
     confirmed_at, notes, travel_date, total, created_at";
const LINE_COLUMNS: &str = "id, sale_id, package_id, quantity, unit_price, travel_date, created_at";

/// Human-readable sale code, e.g. `AND-9F3A21C0`.
fn generate_code() -> String {
    let hex = Uuid::new_v4().simple().to_string();
    format!("AND-{}", hex[..8].to_uppercase())
}

/// Conditionally decrement a package's availability inside `tx`.
///
/// Returns the rejection to surface when the package cannot cover `quantity`.
fn take_capacity(
    tx: &Transaction<'_>,
    package_id: &str,
    quantity: i64,
) -> Result<Result<(), Rejection>, rusqlite::Error> {
    let affected = tx.execute(
        "UPDATE packages
         SET available = available - ?1, updated_at = ?2
         WHERE id = ?3 AND available >= ?1 AND active = 1",
        params![quantity, now(), package_id],
    )?;
    if affected == 1 {
        return Ok(Ok(()));
    }
    let info: Option<(String, i64, bool)> = tx
        .query_row(
            "SELECT name, available, active FROM packages WHERE id = ?1",
            params![package_id],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )
        .optional()?;
    match info {
        Some((name, available, true)) => Ok(Err(Rejection::InsufficientCapacity {
            package: name,
            requested: quantity,
            available,
        })),
        // Deactivated packages look missing to buyers, same as add_item.
        _ => Ok(Err(Rejection::NotFound {
            entity: "package",
            id: package_id.to_string(),
        })),
    }
}

/// Return `quantity` units to a package's availability inside `tx`, clamped
/// at capacity (capacity may have been lowered since the sale).
fn restore_capacity(
    tx: &Transaction<'_>,
    package_id: &str,
    quantity: i64,
) -> Result<(), rusqlite::Error> {
    tx.execute(
        "UPDATE packages
         SET available = MIN(capacity, available + ?1), updated_at = ?2
         WHERE id = ?3",
        params![quantity, now(), package_id],
    )?;
    Ok(())
}

/// Recompute and store a sale's total from its remaining lines.
fn recompute_total(tx: &Transaction<'_>, sale_id: &str) -> Result<Decimal, rusqlite::Error> {
    let mut stmt = tx.prepare("SELECT quantity, unit_price FROM sale_lines WHERE sale_id = ?1")?;
    let rows = stmt.query_map(params![sale_id], |row| {
        let quantity: i64 = row.get(0)?;
        let price = parse_decimal(1, &row.get::<_, String>(1)?)?;
        Ok(price * Decimal::from(quantity))
    })?;
    let total = rows
        .collect::<Result<Vec<Decimal>, _>>()?
        .into_iter()
        .sum::<Decimal>();
    tx.execute(
        "UPDATE sales SET total = ?1 WHERE id = ?2",
        params![total.to_string(), sale_id],
    )?;
    Ok(total)
}

fn fetch_sale(tx: &Transaction<'_>, sale_id: &str) -> Result<Option<Sale>, rusqlite::Error> {
    let mut stmt = tx.prepare(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))?;
    stmt.query_row(params![sale_id], row_to_sale).optional()
}

/// Convert the user's active cart into a pending sale.
///
/// All-or-nothing: the sale row, its lines, every capacity decrement, the
/// cart state flip, and the replacement active cart commit together or not
/// at all. The sale line unit price is copied from the cart line snapshot.
pub async fn checkout(
    db: &Database,
    user_id: &str,
    payment_method: PaymentMethod,
    notes: Option<String>,
    travel_date: Option<String>,
) -> Result<Result<(Sale, Vec<SaleLine>), Rejection>, AndinoError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let cart_id: Option<String> = tx
                .query_row(
                    "SELECT id FROM carts WHERE user_id = ?1 AND status = 'active'",
                    params![user_id],
                    |row| row.get(0),
                )
                .optional()?;
            let Some(cart_id) = cart_id else {
                return Ok(Err(Rejection::NotFound {
                    entity: "cart",
                    id: user_id,
                }));
            };

            let items: Vec<(String, i64, Decimal, Option<String>)> = {
                let mut stmt = tx.prepare(
                    "SELECT package_id, quantity, unit_price, travel_date
                     FROM cart_items WHERE cart_id = ?1 ORDER BY created_at ASC",
                )?;
                let rows = stmt.query_map(params![cart_id], |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        parse_decimal(2, &row.get::<_, String>(2)?)?,
                        row.get(3)?,
                    ))
                })?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            if items.is_empty() {
                return Ok(Err(Rejection::EmptyCart));
            }

            // Reserve capacity for every line before creating anything.
            for (package_id, quantity, _, _) in &items {
                if let Err(rejection) = take_capacity(&tx, package_id, *quantity)? {
                    return Ok(Err(rejection));
                }
            }

            let total: Decimal = items
                .iter()
                .map(|(_, quantity, price, _)| *price * Decimal::from(*quantity))
                .sum();
            let sale = Sale {
                id: Uuid::new_v4().to_string(),
                code: generate_code(),
                user_id: user_id.clone(),
                state: SaleState::Pending,
                payment_method,
                payment_confirmed: false,
                confirmed_at: None,
                notes,
                travel_date,
                total,
                created_at: now(),
            };
            tx.execute(
                "INSERT INTO sales (id, code, user_id, state, payment_method,
                     payment_confirmed, confirmed_at, notes, travel_date, total, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    sale.id,
                    sale.code,
                    sale.user_id,
                    sale.state.to_string(),
                    sale.payment_method.to_string(),
                    sale.payment_confirmed,
                    sale.confirmed_at,
                    sale.notes,
                    sale.travel_date,
                    sale.total.to_string(),
                    sale.created_at,
                ],
            )?;

            let mut lines = Vec::with_capacity(items.len());
            for (package_id, quantity, unit_price, item_travel_date) in items {
                let line = SaleLine {
                    id: Uuid::new_v4().to_string(),
                    sale_id: sale.id.clone(),
                    package_id,
                    quantity,
                    unit_price,
                    travel_date: item_travel_date,
                    created_at: now(),
                };
                tx.execute(
                    "INSERT INTO sale_lines (id, sale_id, package_id, quantity,
                         unit_price, travel_date, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        line.id,
                        line.sale_id,
                        line.package_id,
                        line.quantity,
                        line.unit_price.to_string(),
                        line.travel_date,
                        line.created_at,
                    ],
                )?;
                lines.push(line);
            }

            // The consumed cart is kept for history; the user gets a fresh one.
            tx.execute(
                "UPDATE carts SET status = 'checked_out', updated_at = ?1 WHERE id = ?2",
                params![now(), cart_id],
            )?;
            tx.execute(
                "INSERT INTO carts (id, user_id, status, created_at, updated_at)
                 VALUES (?1, ?2, 'active', ?3, ?4)",
                params![Uuid::new_v4().to_string(), user_id, now(), now()],
            )?;

            tx.commit()?;
            Ok(Ok((sale, lines)))
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a sale by id.
pub async fn get_sale(db: &Database, sale_id: &str) -> Result<Option<Sale>, AndinoError> {
    let sale_id = sale_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"))?;
            stmt.query_row(params![sale_id], row_to_sale).optional()
        })
        .await
        .map_err(map_tr_err)
}

/// All lines of a sale, oldest first.
pub async fn get_sale_lines(db: &Database, sale_id: &str) -> Result<Vec<SaleLine>, AndinoError> {
    let sale_id = sale_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LINE_COLUMNS} FROM sale_lines WHERE sale_id = ?1 ORDER BY created_at ASC"
            ))?;
            let rows = stmt.query_map(params![sale_id], row_to_line)?;
            rows.collect::<Result<Vec<SaleLine>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// List sales, newest first. `user_id = None` lists across all users.
pub async fn list_sales(
    db: &Database,
    user_id: Option<String>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Sale>, AndinoError> {
    // A negative LIMIT means unlimited to SQLite; clamp caller input.
    let limit = limit.max(0);
    let offset = offset.max(0);
    db.connection()
        .call(move |conn| {
            match user_id {
                Some(user_id) => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SALE_COLUMNS} FROM sales WHERE user_id = ?1
                         ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
                    ))?;
                    let rows = stmt.query_map(params![user_id, limit, offset], row_to_sale)?;
                    rows.collect::<Result<Vec<Sale>, _>>()
                }
                None => {
                    let mut stmt = conn.prepare(&format!(
                        "SELECT {SALE_COLUMNS} FROM sales
                         ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
                    ))?;
                    let rows = stmt.query_map(params![limit, offset], row_to_sale)?;
                    rows.collect::<Result<Vec<Sale>, _>>()
                }
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Confirm payment of a pending sale.
pub async fn confirm_sale(
    db: &Database,
    sale_id: &str,
) -> Result<Result<Sale, Rejection>, AndinoError> {
    let sale_id = sale_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let Some(sale) = fetch_sale(&tx, &sale_id)? else {
                return Ok(Err(Rejection::NotFound {
                    entity: "sale",
                    id: sale_id,
                }));
            };
            if sale.state != SaleState::Pending {
                return Ok(Err(Rejection::InvalidState {
                    state: sale.state.to_string(),
                    action: "confirm".to_string(),
                }));
            }

            let confirmed_at = now();
            tx.execute(
                "UPDATE sales SET state = ?1, payment_confirmed = 1, confirmed_at = ?2
                 WHERE id = ?3",
                params![SaleState::Confirmed.to_string(), confirmed_at, sale.id],
            )?;
            tx.commit()?;

            Ok(Ok(Sale {
                state: SaleState::Confirmed,
                payment_confirmed: true,
                confirmed_at: Some(confirmed_at),
                ..sale
            }))
        })
        .await
        .map_err(map_tr_err)
}

/// Cancel a pending or confirmed sale, restoring every line's quantity to
/// its package's availability in the same transaction.
pub async fn cancel_sale(
    db: &Database,
    sale_id: &str,
) -> Result<Result<Sale, Rejection>, AndinoError> {
    let sale_id = sale_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let Some(sale) = fetch_sale(&tx, &sale_id)? else {
                return Ok(Err(Rejection::NotFound {
                    entity: "sale",
                    id: sale_id,
                }));
            };
            if sale.state == SaleState::Cancelled {
                return Ok(Err(Rejection::InvalidState {
                    state: sale.state.to_string(),
                    action: "cancel".to_string(),
                }));
            }

            let lines: Vec<(String, i64)> = {
                let mut stmt = tx.prepare(
                    "SELECT package_id, quantity FROM sale_lines WHERE sale_id = ?1",
                )?;
                let rows = stmt.query_map(params![sale.id], |row| {
                    Ok((row.get(0)?, row.get(1)?))
                })?;
                rows.collect::<Result<Vec<_>, _>>()?
            };
            for (package_id, quantity) in &lines {
                restore_capacity(&tx, package_id, *quantity)?;
            }

            tx.execute(
                "UPDATE sales SET state = ?1 WHERE id = ?2",
                params![SaleState::Cancelled.to_string(), sale.id],
            )?;
            tx.commit()?;

            Ok(Ok(Sale {
                state: SaleState::Cancelled,
                ..sale
            }))
        })
        .await
        .map_err(map_tr_err)
}

/// Change the quantity of a pending sale's line.
///
/// The package's availability moves by the delta (guarded when the delta
/// consumes capacity) and the sale's stored total is recomputed.
pub async fn update_sale_line(
    db: &Database,
    sale_id: &str,
    line_id: &str,
    quantity: i64,
) -> Result<Result<(Sale, SaleLine), Rejection>, AndinoError> {
    let sale_id = sale_id.to_string();
    let line_id = line_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let Some(sale) = fetch_sale(&tx, &sale_id)? else {
                return Ok(Err(Rejection::NotFound {
                    entity: "sale",
                    id: sale_id,
                }));
            };
            if sale.state != SaleState::Pending {
                return Ok(Err(Rejection::InvalidState {
                    state: sale.state.to_string(),
                    action: "edit lines of".to_string(),
                }));
            }

            let line = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {LINE_COLUMNS} FROM sale_lines WHERE id = ?1 AND sale_id = ?2"
                ))?;
                stmt.query_row(params![line_id, sale.id], row_to_line)
                    .optional()?
            };
            let Some(mut line) = line else {
                return Ok(Err(Rejection::NotFound {
                    entity: "sale line",
                    id: line_id,
                }));
            };

            let delta = quantity - line.quantity;
            if delta > 0 {
                if let Err(rejection) = take_capacity(&tx, &line.package_id, delta)? {
                    return Ok(Err(rejection));
                }
            } else if delta < 0 {
                restore_capacity(&tx, &line.package_id, -delta)?;
            }

            line.quantity = quantity;
            tx.execute(
                "UPDATE sale_lines SET quantity = ?1 WHERE id = ?2",
                params![quantity, line.id],
            )?;
            let total = recompute_total(&tx, &sale.id)?;
            tx.commit()?;

            Ok(Ok((Sale { total, ..sale }, line)))
        })
        .await
        .map_err(map_tr_err)
}

/// Remove a line from a pending sale, restoring its quantity and
/// recomputing the stored total.
pub async fn remove_sale_line(
    db: &Database,
    sale_id: &str,
    line_id: &str,
) -> Result<Result<Sale, Rejection>, AndinoError> {
    let sale_id = sale_id.to_string();
    let line_id = line_id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let Some(sale) = fetch_sale(&tx, &sale_id)? else {
                return Ok(Err(Rejection::NotFound {
                    entity: "sale",
                    id: sale_id,
                }));
            };
            if sale.state != SaleState::Pending {
                return Ok(Err(Rejection::InvalidState {
                    state: sale.state.to_string(),
                    action: "edit lines of".to_string(),
                }));
            }

            let line: Option<(String, i64)> = tx
                .query_row(
                    "SELECT package_id, quantity FROM sale_lines
                     WHERE id = ?1 AND sale_id = ?2",
                    params![line_id, sale.id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((package_id, quantity)) = line else {
                return Ok(Err(Rejection::NotFound {
                    entity: "sale line",
                    id: line_id,
                }));
            };

            restore_capacity(&tx, &package_id, quantity)?;
            tx.execute("DELETE FROM sale_lines WHERE id = ?1", params![line_id])?;
            let total = recompute_total(&tx, &sale.id)?;
            tx.commit()?;

            Ok(Ok(Sale { total, ..sale }))
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{carts, packages, users};
    use crate::testutil::{make_package, make_user};
    use andino_core::types::Role;
    use std::str::FromStr;
    use tempfile::tempdir;

    /// One client with an active cart and one package (price 100, capacity 5).
    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("sales_test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        users::create_user(&db, &make_user("u1", "ana@example.com", Role::Client))
            .await
            .unwrap()
            .unwrap();
        carts::create_active_cart(&db, "u1").await.unwrap();
        packages::create_package(&db, &make_package("p1", "100.00", 5))
            .await
            .unwrap();
        (db, dir)
    }

    async fn available(db: &Database, package_id: &str) -> i64 {
        packages::get_package(db, package_id)
            .await
            .unwrap()
            .unwrap()
            .available
    }

    #[tokio::test]
    async fn checkout_converts_merged_cart_into_pending_sale() {
        let (db, _dir) = setup().await;
        // Two merge-on-add calls for the same package and date.
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();

        let (sale, lines) = checkout(&db, "u1", PaymentMethod::CreditCard, None, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(sale.state, SaleState::Pending);
        assert!(!sale.payment_confirmed);
        assert!(sale.code.starts_with("AND-"));
        assert_eq!(sale.total, Decimal::from_str("400.00").unwrap());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 4);
        assert_eq!(lines[0].unit_price, Decimal::from_str("100.00").unwrap());
        assert_eq!(available(&db, "p1").await, 1);

        // The consumed cart is replaced by a fresh empty one.
        let cart = carts::get_active_cart(&db, "u1").await.unwrap().unwrap();
        assert!(carts::list_items(&db, &cart.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn checkout_on_empty_cart_creates_nothing() {
        let (db, _dir) = setup().await;
        let rejection = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(rejection, Rejection::EmptyCart);

        let sales = list_sales(&db, None, 10, 0).await.unwrap();
        assert!(sales.is_empty());
        assert_eq!(available(&db, "p1").await, 5);
    }

    #[tokio::test]
    async fn insufficient_capacity_rolls_back_every_decrement() {
        let (db, _dir) = setup().await;
        packages::create_package(&db, &make_package("p2", "50.00", 1))
            .await
            .unwrap();
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();
        carts::add_item(&db, "u1", "p2", 3, None).await.unwrap().unwrap();

        let rejection = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap_err();
        match rejection {
            Rejection::InsufficientCapacity {
                package,
                requested,
                available,
            } => {
                assert_eq!(package, "Package p2");
                assert_eq!(requested, 3);
                assert_eq!(available, 1);
            }
            other => panic!("expected InsufficientCapacity, got {other:?}"),
        }

        // p1's decrement was rolled back along with the sale.
        assert_eq!(available(&db, "p1").await, 5);
        assert_eq!(available(&db, "p2").await, 1);
        assert!(list_sales(&db, None, 10, 0).await.unwrap().is_empty());

        // The cart survives for a retry.
        let cart = carts::get_active_cart(&db, "u1").await.unwrap().unwrap();
        assert_eq!(carts::list_items(&db, &cart.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn deactivating_a_package_after_add_fails_checkout_as_not_found() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();

        packages::update_package(
            &db,
            "p1",
            packages::PackageUpdate {
                active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        let rejection = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(
            rejection,
            Rejection::NotFound {
                entity: "package",
                id: "p1".to_string(),
            }
        );

        // Nothing was sold and the cart survives for a retry.
        assert!(list_sales(&db, None, 10, 0).await.unwrap().is_empty());
        let cart = carts::get_active_cart(&db, "u1").await.unwrap().unwrap();
        assert_eq!(carts::list_items(&db, &cart.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn leftover_capacity_blocks_the_next_oversized_checkout() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 4, None).await.unwrap().unwrap();
        checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(available(&db, "p1").await, 1);

        // Only 1 unit remains; a new cart asking for 2 must fail at checkout.
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();
        let rejection = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(rejection, Rejection::InsufficientCapacity { .. }));
    }

    #[tokio::test]
    async fn confirm_is_pending_only() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 1, None).await.unwrap().unwrap();
        let (sale, _) = checkout(&db, "u1", PaymentMethod::BankTransfer, None, None)
            .await
            .unwrap()
            .unwrap();

        let confirmed = confirm_sale(&db, &sale.id).await.unwrap().unwrap();
        assert_eq!(confirmed.state, SaleState::Confirmed);
        assert!(confirmed.payment_confirmed);
        assert!(confirmed.confirmed_at.is_some());

        let rejection = confirm_sale(&db, &sale.id).await.unwrap().unwrap_err();
        assert!(matches!(rejection, Rejection::InvalidState { .. }));
    }

    #[tokio::test]
    async fn cancel_restores_exactly_the_sold_quantities() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 4, None).await.unwrap().unwrap();
        let (sale, _) = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();
        confirm_sale(&db, &sale.id).await.unwrap().unwrap();
        assert_eq!(available(&db, "p1").await, 1);

        let cancelled = cancel_sale(&db, &sale.id).await.unwrap().unwrap();
        assert_eq!(cancelled.state, SaleState::Cancelled);
        assert_eq!(available(&db, "p1").await, 5);

        // Re-cancelling is an invalid transition and restores nothing twice.
        let rejection = cancel_sale(&db, &sale.id).await.unwrap().unwrap_err();
        assert!(matches!(rejection, Rejection::InvalidState { .. }));
        assert_eq!(available(&db, "p1").await, 5);
    }

    #[tokio::test]
    async fn pending_sales_can_be_cancelled_too() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();
        let (sale, _) = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(available(&db, "p1").await, 3);

        cancel_sale(&db, &sale.id).await.unwrap().unwrap();
        assert_eq!(available(&db, "p1").await, 5);
    }

    #[tokio::test]
    async fn sale_total_survives_later_price_changes() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();
        let (sale, _) = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();

        packages::update_package(
            &db,
            "p1",
            packages::PackageUpdate {
                price: Some(Decimal::from_str("999.00").unwrap()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();

        let stored = get_sale(&db, &sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total, Decimal::from_str("200.00").unwrap());
        let lines = get_sale_lines(&db, &sale.id).await.unwrap();
        assert_eq!(lines[0].unit_price, Decimal::from_str("100.00").unwrap());
    }

    #[tokio::test]
    async fn concurrent_checkouts_cannot_oversell() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("concurrent_test.db");
        let db = std::sync::Arc::new(Database::open(db_path.to_str().unwrap(), true).await.unwrap());

        packages::create_package(&db, &make_package("p1", "100.00", 3))
            .await
            .unwrap();
        for (user_id, email) in [("u1", "ana@example.com"), ("u2", "beto@example.com")] {
            users::create_user(&db, &make_user(user_id, email, Role::Client))
                .await
                .unwrap()
                .unwrap();
            carts::create_active_cart(&db, user_id).await.unwrap();
            carts::add_item(&db, user_id, "p1", 2, None).await.unwrap().unwrap();
        }

        // Capacity 3, two concurrent requests of 2: exactly one can win.
        let a = tokio::spawn({
            let db = db.clone();
            async move { checkout(&db, "u1", PaymentMethod::Cash, None, None).await }
        });
        let b = tokio::spawn({
            let db = db.clone();
            async move { checkout(&db, "u2", PaymentMethod::Cash, None, None).await }
        });
        let results = [a.await.unwrap().unwrap(), b.await.unwrap().unwrap()];

        let winners = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(winners, 1, "exactly one checkout may succeed");
        assert!(results.iter().any(
            |r| matches!(r, Err(Rejection::InsufficientCapacity { available: 1, .. }))
        ));
        assert_eq!(available(&db, "p1").await, 1);
    }

    #[tokio::test]
    async fn line_quantity_edit_moves_capacity_and_total_by_the_delta() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();
        let (sale, lines) = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(available(&db, "p1").await, 3);

        // Grow 2 -> 4: two more units consumed.
        let (sale_after, line) = update_sale_line(&db, &sale.id, &lines[0].id, 4)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(line.quantity, 4);
        assert_eq!(sale_after.total, Decimal::from_str("400.00").unwrap());
        assert_eq!(available(&db, "p1").await, 1);

        // Shrink 4 -> 1: three units restored.
        let (sale_after, _) = update_sale_line(&db, &sale.id, &lines[0].id, 1)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale_after.total, Decimal::from_str("100.00").unwrap());
        assert_eq!(available(&db, "p1").await, 4);

        // Growing past availability is rejected and changes nothing.
        let rejection = update_sale_line(&db, &sale.id, &lines[0].id, 6)
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(rejection, Rejection::InsufficientCapacity { .. }));
        assert_eq!(available(&db, "p1").await, 4);
        let stored = get_sale(&db, &sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total, Decimal::from_str("100.00").unwrap());
    }

    #[tokio::test]
    async fn line_edits_require_a_pending_sale() {
        let (db, _dir) = setup().await;
        carts::add_item(&db, "u1", "p1", 1, None).await.unwrap().unwrap();
        let (sale, lines) = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();
        confirm_sale(&db, &sale.id).await.unwrap().unwrap();

        let rejection = update_sale_line(&db, &sale.id, &lines[0].id, 2)
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(rejection, Rejection::InvalidState { .. }));
        let rejection = remove_sale_line(&db, &sale.id, &lines[0].id)
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(rejection, Rejection::InvalidState { .. }));
    }

    #[tokio::test]
    async fn removing_a_line_restores_capacity_and_recomputes_total() {
        let (db, _dir) = setup().await;
        packages::create_package(&db, &make_package("p2", "50.00", 5))
            .await
            .unwrap();
        carts::add_item(&db, "u1", "p1", 2, None).await.unwrap().unwrap();
        carts::add_item(&db, "u1", "p2", 1, None).await.unwrap().unwrap();
        let (sale, lines) = checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale.total, Decimal::from_str("250.00").unwrap());

        let p2_line = lines.iter().find(|l| l.package_id == "p2").unwrap();
        let sale_after = remove_sale_line(&db, &sale.id, &p2_line.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale_after.total, Decimal::from_str("200.00").unwrap());
        assert_eq!(available(&db, "p2").await, 5);
        assert_eq!(get_sale_lines(&db, &sale.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_sales_scopes_by_user() {
        let (db, _dir) = setup().await;
        users::create_user(&db, &make_user("u2", "beto@example.com", Role::Client))
            .await
            .unwrap()
            .unwrap();
        carts::create_active_cart(&db, "u2").await.unwrap();

        carts::add_item(&db, "u1", "p1", 1, None).await.unwrap().unwrap();
        checkout(&db, "u1", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();
        carts::add_item(&db, "u2", "p1", 1, None).await.unwrap().unwrap();
        checkout(&db, "u2", PaymentMethod::Cash, None, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(list_sales(&db, None, 10, 0).await.unwrap().len(), 2);
        let mine = list_sales(&db, Some("u1".to_string()), 10, 0).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].user_id, "u1");

        // Negative paging inputs are clamped, never passed through to SQLite
        // (where LIMIT -1 would mean unlimited).
        assert!(list_sales(&db, None, -1, 0).await.unwrap().is_empty());
        assert_eq!(list_sales(&db, None, 10, -5).await.unwrap().len(), 2);
    }
}
