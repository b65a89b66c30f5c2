// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the mailer CLI.
//!
//! The top-level shape mirrors `smtp.yaml`. All structs use
//! `#[serde(deny_unknown_fields)]` so a misspelled key fails at startup
//! instead of being silently ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default outbound rate when `rate_limit.emails_per_second` is unset.
pub const DEFAULT_EMAILS_PER_SECOND: u32 = 12;

/// Top-level mailer configuration.
///
/// Required SMTP fields default to empty values so that figment can always
/// extract a config; [`crate::validation::validate_config`] reports the
/// missing ones together.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MailerConfig {
    /// SMTP server hostname.
    #[serde(default)]
    pub host: String,

    /// SMTP server port. `0` means unset.
    #[serde(default)]
    pub port: u16,

    /// Use implicit TLS (typically port 465). When false, STARTTLS is
    /// negotiated opportunistically.
    #[serde(default)]
    pub secure: bool,

    /// SMTP credentials.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Sender mailbox, e.g. `"Shop <news@shop.example>"`.
    #[serde(default)]
    pub from: String,

    /// Outbound throttling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Directory searched for templates given by name.
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 0,
            secure: false,
            auth: AuthConfig::default(),
            from: String::new(),
            rate_limit: RateLimitConfig::default(),
            templates_dir: default_templates_dir(),
            log_level: default_log_level(),
        }
    }
}

fn default_templates_dir() -> String {
    "templates".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// SMTP login credentials.
#[derive(Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    #[serde(default)]
    pub user: String,

    #[serde(default)]
    pub pass: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("user", &self.user)
            .field("pass", &"[REDACTED]")
            .finish()
    }
}

/// Outbound rate limiting.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RateLimitConfig {
    /// Emails started per second. Also used as the number of concurrent
    /// in-flight sends.
    #[serde(default = "default_emails_per_second")]
    pub emails_per_second: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            emails_per_second: default_emails_per_second(),
        }
    }
}

fn default_emails_per_second() -> u32 {
    DEFAULT_EMAILS_PER_SECOND
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_debug_redacts_password() {
        let auth = AuthConfig {
            user: "mailer".into(),
            pass: "hunter2".into(),
        };
        let debug = format!("{auth:?}");
        assert!(debug.contains("mailer"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = MailerConfig::default();
        assert_eq!(config.rate_limit.emails_per_second, 12);
        assert_eq!(config.templates_dir, "templates");
        assert_eq!(config.log_level, "info");
        assert!(!config.secure);
    }
}
