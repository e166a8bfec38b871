// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Query modules accept `&Database` and call through `conn.call()`.
//! Do NOT create additional Connection instances for writes.

use andino_core::AndinoError;
use tracing::debug;

/// Handle to the single SQLite connection used by the whole process.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path`, apply PRAGMAs, and run all
    /// pending migrations. `wal_mode` switches the journal to write-ahead
    /// logging; pass false to stay on SQLite's default rollback journal.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, AndinoError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| AndinoError::Storage {
                source: Box::new(e),
            })?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| AndinoError::Storage {
                source: Box::new(e),
            })?;

        let migration_result: Result<(), String> = conn
            .call(move |conn| {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
                }
                conn.execute_batch(
                    "PRAGMA synchronous = NORMAL;
                     PRAGMA foreign_keys = ON;
                     PRAGMA busy_timeout = 5000;",
                )?;
                Ok(crate::migrations::run_migrations(conn).map_err(|e| e.to_string()))
            })
            .await
            .map_err(map_tr_err)?;
        migration_result.map_err(|msg| AndinoError::Storage { source: msg.into() })?;

        debug!(path, "database opened, migrations applied");
        Ok(Self { conn })
    }

    /// The underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close down cleanly.
    pub async fn close(&self) -> Result<(), AndinoError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}

/// Map a tokio-rusqlite error into the workspace error type.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error) -> AndinoError {
    AndinoError::Storage {
        source: Box::new(e),
    }
}

/// Current UTC time in the ISO 8601 format used by the schema defaults.
pub fn now() -> String {
    chrono::Utc::now()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}
