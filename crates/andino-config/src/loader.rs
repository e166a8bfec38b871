// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./andino.toml` > `~/.config/andino/andino.toml` >
//! `/etc/andino/andino.toml` with environment variable overrides via the
//! `ANDINO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::AndinoConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/andino/andino.toml` (system-wide)
/// 3. `~/.config/andino/andino.toml` (user XDG config)
/// 4. `./andino.toml` (local directory)
/// 5. `ANDINO_*` environment variables
pub fn load_config() -> Result<AndinoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AndinoConfig::default()))
        .merge(Toml::file("/etc/andino/andino.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("andino/andino.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("andino.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<AndinoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AndinoConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<AndinoConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(AndinoConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `ANDINO_EMAIL_SMTP_HOST` must map to
/// `email.smtp_host`, not `email.smtp.host`.
fn env_provider() -> Env {
    Env::prefixed("ANDINO_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("app_", "app.", 1)
            .replacen("server_", "server.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("email_", "email.", 1);
        mapped.into()
    })
}
