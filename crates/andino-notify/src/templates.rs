// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text email templates.
//!
//! Context values come from the service layer as JSON; missing keys render
//! as empty strings rather than failing the send.

use andino_core::NotificationKind;
use serde_json::Value;

/// A rendered notification, ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

fn text(context: &Value, key: &str) -> String {
    match context.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

/// Render the subject and body for a notification kind.
pub fn render(kind: NotificationKind, context: &Value) -> Rendered {
    let code = text(context, "code");
    match kind {
        NotificationKind::PurchaseConfirmation => Rendered {
            subject: format!("Tu compra {code} en Andino"),
            body: format!(
                "Hola {name},\n\n\
                 Recibimos tu compra {code} por un total de ${total}.\n\
                 Te avisaremos cuando el pago sea confirmado.\n\n\
                 Gracias por elegir Andino.\n",
                name = text(context, "name"),
                total = text(context, "total"),
            ),
        },
        NotificationKind::NewSale => Rendered {
            subject: format!("Nueva venta {code}"),
            body: format!(
                "Se registró la venta {code} de {buyer} por ${total}.\n\
                 Estado: pendiente de confirmación de pago.\n",
                buyer = text(context, "buyer"),
                total = text(context, "total"),
            ),
        },
        NotificationKind::SaleStatusUpdate => Rendered {
            subject: format!("Tu compra {code}: {status}", status = text(context, "status")),
            body: format!(
                "Hola {name},\n\n\
                 Tu compra {code} cambió de estado: {status}.\n",
                name = text(context, "name"),
                status = text(context, "status"),
            ),
        },
    }
}
