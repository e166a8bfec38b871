// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lettre-backed SMTP transport.

use andino_config::EmailConfig;
use andino_core::{AndinoError, NotificationKind, Notifier};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use crate::templates;

fn notify_err(message: impl Into<String>) -> AndinoError {
    AndinoError::Notify {
        message: message.into(),
        source: None,
    }
}

/// Sends notifications through an SMTP relay using STARTTLS.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpNotifier {
    /// Build a notifier from the email section of the configuration.
    ///
    /// Credentials are optional; relays on trusted networks may accept
    /// unauthenticated submission.
    pub fn from_config(config: &EmailConfig) -> Result<Self, AndinoError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| notify_err(format!("smtp relay {}: {e}", config.smtp_host)))?
            .port(config.smtp_port);
        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from_address: config.from_address.clone(),
        })
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(
        &self,
        to: &str,
        kind: NotificationKind,
        context: &serde_json::Value,
    ) -> Result<(), AndinoError> {
        let rendered = templates::render(kind, context);
        let message = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|e| notify_err(format!("from address: {e}")))?,
            )
            .to(to.parse().map_err(|e| notify_err(format!("to address: {e}")))?)
            .subject(&rendered.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(rendered.body)
            .map_err(|e| notify_err(format!("build message: {e}")))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| AndinoError::Notify {
                message: format!("smtp send to {to}"),
                source: Some(Box::new(e)),
            })?;
        debug!(%to, kind = %kind, "notification sent");
        Ok(())
    }
}
