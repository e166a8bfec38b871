// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Package catalog queries.
//!
//! Availability is a stored counter: decremented at checkout, restored at
//! cancellation, and shifted by the same delta when staff edit capacity.

use andino_core::AndinoError;
use andino_core::types::{Difficulty, Package};
use rusqlite::params;
use rust_decimal::Decimal;

use super::{Rejection, parse_decimal, parse_enum};
use crate::database::{Database, map_tr_err, now};

pub(crate) fn row_to_package(row: &rusqlite::Row<'_>) -> Result<Package, rusqlite::Error> {
    Ok(Package {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        destination: row.get(3)?,
        category: row.get(4)?,
        difficulty: parse_enum(5, &row.get::<_, String>(5)?)?,
        duration_days: row.get(6)?,
        price: parse_decimal(7, &row.get::<_, String>(7)?)?,
        capacity: row.get(8)?,
        available: row.get(9)?,
        featured: row.get(10)?,
        active: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

pub(crate) const PACKAGE_COLUMNS: &str = "id, name, description, destination, category, \
     difficulty, duration_days, price, capacity, available, featured, active, \
     created_at, updated_at";

/// Filters for the catalog listing. Inactive packages are never listed.
#[derive(Debug, Clone, Default)]
pub struct PackageFilter {
    pub destination: Option<String>,
    pub category: Option<String>,
    pub featured: Option<bool>,
    /// Only packages with at least one unit available.
    pub available_only: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Fields staff may change on an existing package. `None` leaves the field
/// untouched. A capacity change shifts `available` by the same delta.
#[derive(Debug, Clone, Default)]
pub struct PackageUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub destination: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub duration_days: Option<u32>,
    pub price: Option<Decimal>,
    pub capacity: Option<i64>,
    pub featured: Option<bool>,
    pub active: Option<bool>,
}

/// Insert a new package.
pub async fn create_package(db: &Database, package: &Package) -> Result<(), AndinoError> {
    let p = package.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO packages (id, name, description, destination, category,
                     difficulty, duration_days, price, capacity, available, featured,
                     active, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                params![
                    p.id,
                    p.name,
                    p.description,
                    p.destination,
                    p.category,
                    p.difficulty.to_string(),
                    p.duration_days,
                    p.price.to_string(),
                    p.capacity,
                    p.available,
                    p.featured,
                    p.active,
                    p.created_at,
                    p.updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a package by id, active or not.
pub async fn get_package(db: &Database, id: &str) -> Result<Option<Package>, AndinoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = ?1"
            ))?;
            match stmt.query_row(params![id], row_to_package) {
                Ok(p) => Ok(Some(p)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// List active packages matching the filter, newest first.
pub async fn list_packages(
    db: &Database,
    filter: PackageFilter,
) -> Result<Vec<Package>, AndinoError> {
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {PACKAGE_COLUMNS} FROM packages WHERE active = 1");
            let mut args: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

            if let Some(destination) = filter.destination {
                sql.push_str(&format!(" AND destination = ?{}", args.len() + 1));
                args.push(Box::new(destination));
            }
            if let Some(category) = filter.category {
                sql.push_str(&format!(" AND category = ?{}", args.len() + 1));
                args.push(Box::new(category));
            }
            if let Some(featured) = filter.featured {
                sql.push_str(&format!(" AND featured = ?{}", args.len() + 1));
                args.push(Box::new(featured));
            }
            if filter.available_only {
                sql.push_str(" AND available > 0");
            }
            sql.push_str(" ORDER BY created_at DESC");
            // A negative LIMIT means unlimited to SQLite; clamp caller input.
            sql.push_str(&format!(" LIMIT {}", filter.limit.unwrap_or(100).max(0)));
            sql.push_str(&format!(" OFFSET {}", filter.offset.unwrap_or(0).max(0)));

            let mut stmt = conn.prepare(&sql)?;
            let params_ref: Vec<&dyn rusqlite::ToSql> =
                args.iter().map(|b| b.as_ref()).collect();
            let rows = stmt.query_map(params_ref.as_slice(), row_to_package)?;
            rows.collect::<Result<Vec<Package>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial update to a package.
///
/// Runs in one transaction. Shrinking capacity below the consumed amount
/// (capacity - available) would drive `available` negative and is rejected.
pub async fn update_package(
    db: &Database,
    id: &str,
    update: PackageUpdate,
) -> Result<Result<Package, Rejection>, AndinoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;

            let existing = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {PACKAGE_COLUMNS} FROM packages WHERE id = ?1"
                ))?;
                match stmt.query_row(params![id], row_to_package) {
                    Ok(p) => p,
                    Err(rusqlite::Error::QueryReturnedNoRows) => {
                        return Ok(Err(Rejection::NotFound {
                            entity: "package",
                            id,
                        }));
                    }
                    Err(e) => return Err(e),
                }
            };

            let new_capacity = update.capacity.unwrap_or(existing.capacity);
            let delta = new_capacity - existing.capacity;
            let new_available = existing.available + delta;
            if new_available < 0 {
                return Ok(Err(Rejection::InsufficientCapacity {
                    package: existing.name,
                    requested: new_capacity,
                    available: existing.available,
                }));
            }

            let updated = Package {
                name: update.name.unwrap_or(existing.name),
                description: update.description.unwrap_or(existing.description),
                destination: update.destination.unwrap_or(existing.destination),
                category: update.category.unwrap_or(existing.category),
                difficulty: update.difficulty.unwrap_or(existing.difficulty),
                duration_days: update.duration_days.unwrap_or(existing.duration_days),
                price: update.price.unwrap_or(existing.price),
                capacity: new_capacity,
                available: new_available,
                featured: update.featured.unwrap_or(existing.featured),
                active: update.active.unwrap_or(existing.active),
                updated_at: now(),
                ..existing
            };

            tx.execute(
                "UPDATE packages SET name = ?1, description = ?2, destination = ?3,
                     category = ?4, difficulty = ?5, duration_days = ?6, price = ?7,
                     capacity = ?8, available = ?9, featured = ?10, active = ?11,
                     updated_at = ?12
                 WHERE id = ?13",
                params![
                    updated.name,
                    updated.description,
                    updated.destination,
                    updated.category,
                    updated.difficulty.to_string(),
                    updated.duration_days,
                    updated.price.to_string(),
                    updated.capacity,
                    updated.available,
                    updated.featured,
                    updated.active,
                    updated.updated_at,
                    updated.id,
                ],
            )?;
            tx.commit()?;
            Ok(Ok(updated))
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::make_package;
    use std::str::FromStr;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("packages_test.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn create_and_fetch_round_trips_decimal_price() {
        let (db, _dir) = setup_db().await;
        create_package(&db, &make_package("p1", "1250.50", 20))
            .await
            .unwrap();

        let fetched = get_package(&db, "p1").await.unwrap().unwrap();
        assert_eq!(fetched.price, Decimal::from_str("1250.50").unwrap());
        assert_eq!(fetched.capacity, 20);
        assert_eq!(fetched.available, 20);
    }

    #[tokio::test]
    async fn listing_filters_by_destination_and_availability() {
        let (db, _dir) = setup_db().await;
        create_package(&db, &make_package("p1", "100", 5)).await.unwrap();
        let mut bariloche = make_package("p2", "200", 5);
        bariloche.destination = "Bariloche".to_string();
        create_package(&db, &bariloche).await.unwrap();
        let mut sold_out = make_package("p3", "300", 5);
        sold_out.available = 0;
        create_package(&db, &sold_out).await.unwrap();
        let mut inactive = make_package("p4", "400", 5);
        inactive.active = false;
        create_package(&db, &inactive).await.unwrap();

        let all = list_packages(&db, PackageFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3, "inactive packages are never listed");

        let salta = list_packages(
            &db,
            PackageFilter {
                destination: Some("Salta".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(salta.len(), 2);

        let available = list_packages(
            &db,
            PackageFilter {
                available_only: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(available.iter().all(|p| p.available > 0));
        assert_eq!(available.len(), 2);
    }

    #[tokio::test]
    async fn listing_paginates() {
        let (db, _dir) = setup_db().await;
        for i in 0..5 {
            create_package(&db, &make_package(&format!("p{i}"), "100", 5))
                .await
                .unwrap();
        }

        let page = list_packages(
            &db,
            PackageFilter {
                limit: Some(2),
                offset: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(page.len(), 2);

        // Negative paging inputs are clamped, never passed through to SQLite
        // (where LIMIT -1 would mean unlimited).
        let page = list_packages(
            &db,
            PackageFilter {
                limit: Some(-1),
                offset: Some(-3),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn capacity_increase_raises_availability_by_delta() {
        let (db, _dir) = setup_db().await;
        let mut p = make_package("p1", "100", 10);
        p.available = 4; // 6 units consumed
        create_package(&db, &p).await.unwrap();

        let updated = update_package(
            &db,
            "p1",
            PackageUpdate {
                capacity: Some(15),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(updated.capacity, 15);
        assert_eq!(updated.available, 9);
    }

    #[tokio::test]
    async fn capacity_shrink_below_consumption_is_rejected() {
        let (db, _dir) = setup_db().await;
        let mut p = make_package("p1", "100", 10);
        p.available = 4; // 6 units consumed
        create_package(&db, &p).await.unwrap();

        let rejection = update_package(
            &db,
            "p1",
            PackageUpdate {
                capacity: Some(5),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap_err();
        assert!(matches!(rejection, Rejection::InsufficientCapacity { .. }));

        // Nothing changed.
        let p = get_package(&db, "p1").await.unwrap().unwrap();
        assert_eq!(p.capacity, 10);
        assert_eq!(p.available, 4);
    }

    #[tokio::test]
    async fn updating_a_missing_package_is_not_found() {
        let (db, _dir) = setup_db().await;
        let rejection = update_package(&db, "ghost", PackageUpdate::default())
            .await
            .unwrap()
            .unwrap_err();
        assert!(matches!(rejection, Rejection::NotFound { entity: "package", .. }));
    }
}
