// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks required SMTP fields and semantic constraints that serde cannot
//! express, such as a parseable sender mailbox and a non-zero rate limit.

use lettre::message::Mailbox;

use crate::diagnostic::ConfigError;
use crate::model::MailerConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &MailerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let mut require = |present: bool, key: &str| {
        if !present {
            errors.push(ConfigError::MissingKey {
                key: key.to_string(),
            });
        }
    };
    require(!config.host.trim().is_empty(), "host");
    require(config.port != 0, "port");
    require(!config.auth.user.trim().is_empty(), "auth.user");
    require(!config.auth.pass.is_empty(), "auth.pass");
    require(!config.from.trim().is_empty(), "from");

    if !config.from.trim().is_empty() && config.from.trim().parse::<Mailbox>().is_err() {
        errors.push(ConfigError::Validation {
            message: format!("from `{}` is not a valid mailbox", config.from.trim()),
        });
    }

    if config.rate_limit.emails_per_second == 0 {
        errors.push(ConfigError::Validation {
            message: "rate_limit.emails_per_second must be at least 1".to_string(),
        });
    }

    if config.templates_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "templates_dir must not be empty".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
