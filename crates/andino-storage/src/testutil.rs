// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for storage tests.

use std::str::FromStr;

use andino_core::types::{Difficulty, Package, Role, User};
use rust_decimal::Decimal;

use crate::database::now;

pub(crate) fn make_user(id: &str, email: &str, role: Role) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        full_name: format!("User {id}"),
        role,
        api_token: format!("tok-{id}"),
        active: true,
        created_at: now(),
    }
}

pub(crate) fn make_package(id: &str, price: &str, capacity: i64) -> Package {
    Package {
        id: id.to_string(),
        name: format!("Package {id}"),
        description: "A tour".to_string(),
        destination: "Salta".to_string(),
        category: "adventure".to_string(),
        difficulty: Difficulty::Medium,
        duration_days: 3,
        price: Decimal::from_str(price).unwrap(),
        capacity,
        available: capacity,
        featured: false,
        active: true,
        created_at: now(),
        updated_at: now(),
    }
}
