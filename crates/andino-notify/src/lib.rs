// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email notification adapter.
//!
//! Implements the [`Notifier`] seam from `andino-core` over SMTP via lettre,
//! with a no-op fallback for deployments that disable email. Notifications
//! are best-effort: callers dispatch them after the storage transaction
//! commits and log failures instead of surfacing them.

use andino_core::{AndinoError, NotificationKind, Notifier};
use async_trait::async_trait;
use tracing::debug;

pub mod smtp;
pub mod templates;

pub use smtp::SmtpNotifier;

/// Notifier used when email is disabled in the configuration.
///
/// Logs at debug level and reports success, so the rest of the system
/// behaves identically with and without a mail relay.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(
        &self,
        to: &str,
        kind: NotificationKind,
        _context: &serde_json::Value,
    ) -> Result<(), AndinoError> {
        debug!(%to, kind = %kind, "email disabled, dropping notification");
        Ok(())
    }
}
