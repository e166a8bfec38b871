// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Account registration.

use andino_core::types::{Role, User};
use andino_core::AndinoError;
use andino_storage::database::now;
use andino_storage::queries::{carts, users};
use tracing::info;
use uuid::Uuid;

use crate::Services;

impl Services {
    /// Register a new account and provision its active cart.
    ///
    /// The HTTP surface always registers clients; staff accounts are created
    /// through the admin CLI. Returns the user including its fresh API token,
    /// the only time the token is handed out.
    pub async fn register(
        &self,
        email: &str,
        full_name: &str,
        role: Role,
    ) -> Result<User, AndinoError> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AndinoError::Validation(format!("invalid email: {email:?}")));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            email,
            full_name: full_name.trim().to_string(),
            role,
            api_token: Uuid::new_v4().simple().to_string(),
            active: true,
            created_at: now(),
        };
        users::create_user(&self.db, &user).await??;

        // Every account starts with an empty active cart.
        carts::create_active_cart(&self.db, &user.id).await?;

        info!(user_id = %user.id, role = %user.role, "registered account");
        Ok(user)
    }
}
