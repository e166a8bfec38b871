// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Business services for the Andino tour backend.
//!
//! Every operation takes the authenticated caller, runs its capability check,
//! validates input, and delegates persistence to `andino-storage`. Sale
//! notifications are dispatched after the storage transaction commits and are
//! best-effort: a failed email is logged, never surfaced to the caller.

use std::sync::Arc;

use andino_core::Notifier;
use andino_storage::Database;

pub mod cart;
pub mod catalog;
pub mod sales;
pub mod users;

pub use cart::CartView;
pub use catalog::NewPackage;

/// Shared handle to the database and the notification channel.
///
/// Cheap to clone; the gateway stores one per process.
#[derive(Clone)]
pub struct Services {
    db: Arc<Database>,
    notifier: Arc<dyn Notifier>,
}

impl Services {
    pub fn new(db: Arc<Database>, notifier: Arc<dyn Notifier>) -> Self {
        Self { db, notifier }
    }

    /// Direct database access, used by the gateway's token authentication.
    pub fn db(&self) -> &Database {
        &self.db
    }
}
