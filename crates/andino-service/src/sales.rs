// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Sale lifecycle: checkout, confirmation, cancellation, and pending-line
//! edits. Notifications go out after the storage transaction commits.

use andino_core::authz::{self, Action};
use andino_core::types::{PaymentMethod, Sale, SaleLine, User};
use andino_core::{AndinoError, NotificationKind};
use andino_storage::queries::{sales, users};
use serde_json::json;
use tracing::{info, warn};

use crate::Services;

impl Services {
    /// Convert the caller's cart into a pending sale.
    ///
    /// On success the buyer receives a purchase confirmation and every active
    /// staff member a new-sale notice. Email failures are logged and do not
    /// affect the committed sale.
    pub async fn checkout(
        &self,
        caller: &User,
        payment_method: PaymentMethod,
        notes: Option<String>,
        travel_date: Option<String>,
    ) -> Result<(Sale, Vec<SaleLine>), AndinoError> {
        let (sale, lines) =
            sales::checkout(&self.db, &caller.id, payment_method, notes, travel_date).await??;
        info!(sale_id = %sale.id, code = %sale.code, total = %sale.total, "checkout completed");

        self.notify(
            &caller.email,
            NotificationKind::PurchaseConfirmation,
            &json!({
                "name": caller.full_name,
                "code": sale.code,
                "total": sale.total.to_string(),
            }),
        )
        .await;
        let staff = users::list_staff_emails(&self.db).await?;
        for email in staff {
            self.notify(
                &email,
                NotificationKind::NewSale,
                &json!({
                    "buyer": caller.email,
                    "code": sale.code,
                    "total": sale.total.to_string(),
                }),
            )
            .await;
        }

        Ok((sale, lines))
    }

    /// Fetch a sale with its lines. Owners see their own; staff see any.
    pub async fn get_sale(
        &self,
        caller: &User,
        sale_id: &str,
    ) -> Result<(Sale, Vec<SaleLine>), AndinoError> {
        let sale = sales::get_sale(&self.db, sale_id)
            .await?
            .ok_or_else(|| AndinoError::not_found("sale", sale_id))?;
        if !authz::check(caller.role, &caller.id, Some(&sale.user_id), Action::ViewSale) {
            return Err(AndinoError::Forbidden);
        }
        let lines = sales::get_sale_lines(&self.db, &sale.id).await?;
        Ok((sale, lines))
    }

    /// List the caller's own sales, or every sale when `all` is set
    /// (staff only).
    pub async fn list_sales(
        &self,
        caller: &User,
        all: bool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Sale>, AndinoError> {
        let scope = if all {
            if !authz::check(caller.role, &caller.id, None, Action::ListAllSales) {
                return Err(AndinoError::Forbidden);
            }
            None
        } else {
            Some(caller.id.clone())
        };
        sales::list_sales(&self.db, scope, limit, offset).await
    }

    /// Confirm payment of a pending sale. Staff only.
    pub async fn confirm_sale(&self, caller: &User, sale_id: &str) -> Result<Sale, AndinoError> {
        if !authz::check(caller.role, &caller.id, None, Action::ConfirmSale) {
            return Err(AndinoError::Forbidden);
        }
        let sale = sales::confirm_sale(&self.db, sale_id).await??;
        info!(sale_id = %sale.id, code = %sale.code, "sale confirmed");
        self.notify_status(&sale).await;
        Ok(sale)
    }

    /// Cancel a pending or confirmed sale, restoring availability. Staff only.
    pub async fn cancel_sale(&self, caller: &User, sale_id: &str) -> Result<Sale, AndinoError> {
        if !authz::check(caller.role, &caller.id, None, Action::CancelSale) {
            return Err(AndinoError::Forbidden);
        }
        let sale = sales::cancel_sale(&self.db, sale_id).await??;
        info!(sale_id = %sale.id, code = %sale.code, "sale cancelled");
        self.notify_status(&sale).await;
        Ok(sale)
    }

    /// Change a pending sale's line quantity. Staff only.
    pub async fn update_sale_line(
        &self,
        caller: &User,
        sale_id: &str,
        line_id: &str,
        quantity: i64,
    ) -> Result<(Sale, SaleLine), AndinoError> {
        if !authz::check(caller.role, &caller.id, None, Action::EditSaleLines) {
            return Err(AndinoError::Forbidden);
        }
        if quantity < 1 {
            return Err(AndinoError::InvalidQuantity { quantity });
        }
        let (sale, line) = sales::update_sale_line(&self.db, sale_id, line_id, quantity).await??;
        Ok((sale, line))
    }

    /// Remove a line from a pending sale. Staff only.
    pub async fn remove_sale_line(
        &self,
        caller: &User,
        sale_id: &str,
        line_id: &str,
    ) -> Result<Sale, AndinoError> {
        if !authz::check(caller.role, &caller.id, None, Action::EditSaleLines) {
            return Err(AndinoError::Forbidden);
        }
        let sale = sales::remove_sale_line(&self.db, sale_id, line_id).await??;
        Ok(sale)
    }

    /// Tell the buyer their sale changed state.
    async fn notify_status(&self, sale: &Sale) {
        let buyer = match users::get_user(&self.db, &sale.user_id).await {
            Ok(Some(user)) => user,
            Ok(None) => return,
            Err(e) => {
                warn!(sale_id = %sale.id, error = %e, "could not load buyer for notification");
                return;
            }
        };
        self.notify(
            &buyer.email,
            NotificationKind::SaleStatusUpdate,
            &json!({
                "name": buyer.full_name,
                "code": sale.code,
                "status": sale.state.to_string(),
            }),
        )
        .await;
    }

    /// Best-effort send. Failures are logged, never propagated.
    async fn notify(&self, to: &str, kind: NotificationKind, context: &serde_json::Value) {
        if let Err(e) = self.notifier.send(to, kind, context).await {
            warn!(%to, kind = %kind, error = %e, "notification failed");
        }
    }
}
