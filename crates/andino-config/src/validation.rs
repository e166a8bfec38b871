// SPDX-FileCopyrightText: 2026 Andino Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as valid bind addresses and required SMTP fields.

use thiserror::Error;

use crate::model::AndinoConfig;

/// A configuration error surfaced at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML was syntactically valid but a value failed validation.
    #[error("invalid configuration: {message}")]
    Validation { message: String },

    /// Figment failed to parse or merge configuration sources.
    #[error("failed to load configuration: {message}")]
    Load { message: String },
}

/// Print collected configuration errors to stderr, one per line.
pub fn render_errors(errors: &[ConfigError]) {
    for err in errors {
        eprintln!("error: {err}");
    }
}

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &AndinoConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let host = config.server.host.trim();
    if host.is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("server.host `{host}` is not a valid IP address or hostname"),
            });
        }
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must not be 0".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
    if !LOG_LEVELS.contains(&config.app.log_level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level must be one of trace/debug/info/warn/error, got `{}`",
                config.app.log_level
            ),
        });
    }

    if config.email.enabled {
        if config.email.smtp_host.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "email.smtp_host is required when email.enabled = true".to_string(),
            });
        }
        if config.email.from_address.trim().is_empty() {
            errors.push(ConfigError::Validation {
                message: "email.from_address is required when email.enabled = true".to_string(),
            });
        }
        if config.email.smtp_username.is_some() != config.email.smtp_password.is_some() {
            errors.push(ConfigError::Validation {
                message: "email.smtp_username and email.smtp_password must be set together"
                    .to_string(),
            });
        }
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
