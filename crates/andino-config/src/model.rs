// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Andino backend.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup instead of silently ignoring them.

use serde::{Deserialize, Serialize};

/// Top-level Andino configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AndinoConfig {
    /// Application identity and logging settings.
    #[serde(default)]
    pub app: AppConfig,

    /// HTTP server bind settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Outgoing email settings.
    #[serde(default)]
    pub email: EmailConfig,
}

/// Application identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Display name used in notification footers and logs.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_app_name() -> String {
    "andino".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("andino").join("andino.db"))
        .and_then(|p| p.to_str().map(String::from))
        .unwrap_or_else(|| "andino.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Outgoing email (SMTP) configuration.
///
/// When `enabled` is false the backend runs with a no-op notifier and all
/// notification sends become logged no-ops.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EmailConfig {
    /// Master switch for email dispatch.
    #[serde(default)]
    pub enabled: bool,

    /// SMTP relay hostname.
    #[serde(default)]
    pub smtp_host: String,

    /// SMTP relay port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username. `None` disables authentication.
    #[serde(default)]
    pub smtp_username: Option<String>,

    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,

    /// From address for all outgoing mail, e.g. `ventas@andino.example`.
    #[serde(default)]
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: None,
            smtp_password: None,
            from_address: String::new(),
        }
    }
}

fn default_smtp_port() -> u16 {
    587
}
