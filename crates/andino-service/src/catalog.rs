// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Catalog management and browsing.

use andino_core::authz::{self, Action};
use andino_core::types::{Difficulty, Package, User};
use andino_core::AndinoError;
use andino_storage::database::now;
use andino_storage::queries::packages::{self, PackageFilter, PackageUpdate};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::Services;

/// Input for creating a catalog entry. Availability starts at capacity.
#[derive(Debug, Clone)]
pub struct NewPackage {
    pub name: String,
    pub description: String,
    pub destination: String,
    pub category: String,
    pub difficulty: Difficulty,
    pub duration_days: u32,
    pub price: Decimal,
    pub capacity: i64,
    pub featured: bool,
}

impl Services {
    /// Browse active packages.
    pub async fn list_packages(&self, filter: PackageFilter) -> Result<Vec<Package>, AndinoError> {
        packages::list_packages(&self.db, filter).await
    }

    /// Fetch one package.
    pub async fn get_package(&self, id: &str) -> Result<Package, AndinoError> {
        packages::get_package(&self.db, id)
            .await?
            .ok_or_else(|| AndinoError::not_found("package", id))
    }

    /// Create a catalog entry. Staff only.
    pub async fn create_package(
        &self,
        caller: &User,
        input: NewPackage,
    ) -> Result<Package, AndinoError> {
        if !authz::check(caller.role, &caller.id, None, Action::ManageCatalog) {
            return Err(AndinoError::Forbidden);
        }
        if input.capacity < 0 {
            return Err(AndinoError::Validation("capacity must be non-negative".into()));
        }
        if input.price.is_sign_negative() {
            return Err(AndinoError::Validation("price must be non-negative".into()));
        }

        let package = Package {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            destination: input.destination,
            category: input.category,
            difficulty: input.difficulty,
            duration_days: input.duration_days,
            price: input.price,
            capacity: input.capacity,
            available: input.capacity,
            featured: input.featured,
            active: true,
            created_at: now(),
            updated_at: now(),
        };
        packages::create_package(&self.db, &package).await?;
        info!(package_id = %package.id, name = %package.name, "created package");
        Ok(package)
    }

    /// Partially update a package. Staff only.
    pub async fn update_package(
        &self,
        caller: &User,
        id: &str,
        update: PackageUpdate,
    ) -> Result<Package, AndinoError> {
        if !authz::check(caller.role, &caller.id, None, Action::ManageCatalog) {
            return Err(AndinoError::Forbidden);
        }
        if update.capacity.is_some_and(|c| c < 0) {
            return Err(AndinoError::Validation("capacity must be non-negative".into()));
        }
        let package = packages::update_package(&self.db, id, update).await??;
        info!(package_id = %package.id, "updated package");
        Ok(package)
    }
}
