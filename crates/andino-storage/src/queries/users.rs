// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User account queries.

use andino_core::AndinoError;
use andino_core::types::{Role, User};
use rusqlite::params;

use super::{Rejection, parse_enum};
use crate::database::{Database, map_tr_err};

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        role: parse_enum(3, &row.get::<_, String>(3)?)?,
        api_token: row.get(4)?,
        active: row.get(5)?,
        created_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str = "id, email, full_name, role, api_token, active, created_at";

/// Insert a new user. Rejects duplicate emails with a conflict.
pub async fn create_user(db: &Database, user: &User) -> Result<Result<(), Rejection>, AndinoError> {
    let user = user.clone();
    db.connection()
        .call(move |conn| {
            let result = conn.execute(
                "INSERT INTO users (id, email, full_name, role, api_token, active, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    user.id,
                    user.email,
                    user.full_name,
                    user.role.to_string(),
                    user.api_token,
                    user.active,
                    user.created_at,
                ],
            );
            match result {
                Ok(_) => Ok(Ok(())),
                Err(rusqlite::Error::SqliteFailure(e, Some(msg)))
                    if e.code == rusqlite::ErrorCode::ConstraintViolation
                        && msg.contains("users.email") =>
                {
                    Ok(Err(Rejection::Conflict("email already registered".into())))
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a user by id.
pub async fn get_user(db: &Database, id: &str) -> Result<Option<User>, AndinoError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            match stmt.query_row(params![id], row_to_user) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Resolve a bearer token to an active user. Inactive accounts do not
/// authenticate.
pub async fn get_by_token(db: &Database, token: &str) -> Result<Option<User>, AndinoError> {
    let token = token.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE api_token = ?1 AND active = 1"
            ))?;
            match stmt.query_row(params![token], row_to_user) {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Email addresses of all active staff users, for new-sale notifications.
pub async fn list_staff_emails(db: &Database) -> Result<Vec<String>, AndinoError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT email FROM users
                 WHERE role IN (?1, ?2) AND active = 1
                 ORDER BY email",
            )?;
            let rows = stmt.query_map(
                params![Role::SalesStaff.to_string(), Role::Admin.to_string()],
                |row| row.get(0),
            )?;
            rows.collect::<Result<Vec<String>, _>>()
        })
        .await
        .map_err(map_tr_err)
}
