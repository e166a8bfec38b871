// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification seam between the checkout engine and the mail transport.

use async_trait::async_trait;
use strum::{Display, EnumString};

use crate::error::AndinoError;

/// Template selector for outgoing notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    /// Sent to the buyer right after checkout.
    PurchaseConfirmation,
    /// Sent to each sales-staff user when a sale is created.
    NewSale,
    /// Sent to the buyer when a sale is confirmed or cancelled.
    SaleStatusUpdate,
}

/// Fire-and-forget notification channel.
///
/// Implementations must not block checkout semantics: callers dispatch sends
/// after the database transaction commits and log any returned error.
#[async_trait]
pub trait Notifier: Send + Sync + 'static {
    async fn send(
        &self,
        to: &str,
        kind: NotificationKind,
        context: &serde_json::Value,
    ) -> Result<(), AndinoError>;
}
