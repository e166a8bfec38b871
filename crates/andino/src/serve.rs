// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `andino serve` and admin command implementations.

use std::sync::Arc;

use andino_config::AndinoConfig;
use andino_core::types::Role;
use andino_core::{AndinoError, Notifier};
use andino_gateway::{start_server, GatewayState};
use andino_notify::{NullNotifier, SmtpNotifier};
use andino_service::Services;
use andino_storage::Database;
use tracing::info;

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("andino={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn build_notifier(config: &AndinoConfig) -> Result<Arc<dyn Notifier>, AndinoError> {
    if config.email.enabled {
        info!(host = %config.email.smtp_host, "email notifications enabled");
        Ok(Arc::new(SmtpNotifier::from_config(&config.email)?))
    } else {
        info!("email notifications disabled");
        Ok(Arc::new(NullNotifier))
    }
}

/// Run the HTTP API server until shutdown.
pub async fn run_serve(config: AndinoConfig) -> Result<(), AndinoError> {
    init_tracing(&config.app.log_level);
    info!(name = %config.app.name, "starting andino serve");

    let db = Arc::new(
        Database::open(&config.storage.database_path, config.storage.wal_mode).await?,
    );
    let notifier = build_notifier(&config)?;
    let services = Services::new(db.clone(), notifier);

    let result = start_server(
        &config.server.host,
        config.server.port,
        GatewayState { services },
    )
    .await;

    // Checkpoint the WAL on the way out.
    db.close().await?;
    result
}

/// Create an account from the command line and print its API token.
pub async fn run_add_user(
    config: AndinoConfig,
    email: &str,
    full_name: &str,
    role: Role,
) -> Result<(), AndinoError> {
    init_tracing(&config.app.log_level);

    let db = Arc::new(
        Database::open(&config.storage.database_path, config.storage.wal_mode).await?,
    );
    let services = Services::new(db.clone(), Arc::new(NullNotifier));
    let user = services.register(email, full_name, role).await?;
    db.close().await?;

    println!("created {} ({})", user.email, user.role);
    println!("api token: {}", user.api_token);
    Ok(())
}
