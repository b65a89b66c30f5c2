// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./smtp.yaml` > `~/.config/mailer/smtp.yaml` > `/etc/mailer/smtp.yaml`
//! with environment variable overrides via `MAILER_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};

use crate::model::MailerConfig;

/// File name looked up in every layer of the hierarchy.
pub const CONFIG_FILE_NAME: &str = "smtp.yaml";

/// System-wide config location.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/mailer/smtp.yaml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "MAILER_";

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/mailer/smtp.yaml` (system-wide)
/// 3. `~/.config/mailer/smtp.yaml` (user XDG config)
/// 4. `./smtp.yaml` (local directory)
/// 5. `MAILER_*` environment variables
pub fn load_config() -> Result<MailerConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a YAML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(yaml_content: &str) -> Result<MailerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailerConfig::default()))
        .merge(Yaml::string(yaml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// The XDG hierarchy is skipped entirely; this backs `--config <path>`.
pub fn load_config_from_path(path: &Path) -> Result<MailerConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(MailerConfig::default()))
        .merge(Yaml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading (exposed for diagnostic use).
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    let mut figment = Figment::new().merge(Serialized::defaults(MailerConfig::default()));
    for path in config_paths() {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(env_provider())
}

/// Config file locations from lowest to highest precedence.
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = vec![PathBuf::from(SYSTEM_CONFIG_PATH)];
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("mailer").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from(CONFIG_FILE_NAME));
    paths
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")`: `MAILER_RATE_LIMIT_EMAILS_PER_SECOND`
/// must become `rate_limit.emails_per_second`, and `MAILER_LOG_LEVEL` must stay `log_level`.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        // `key` keeps the variable's original case, prefix stripped.
        let key_str = key.as_str().to_ascii_lowercase();
        let mapped = if let Some(rest) = key_str.strip_prefix("auth_") {
            format!("auth.{rest}")
        } else if let Some(rest) = key_str.strip_prefix("rate_limit_") {
            format!("rate_limit.{rest}")
        } else {
            key_str
        };
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_paths_end_with_local_file() {
        let paths = config_paths();
        assert_eq!(paths.first(), Some(&PathBuf::from(SYSTEM_CONFIG_PATH)));
        assert_eq!(paths.last(), Some(&PathBuf::from(CONFIG_FILE_NAME)));
    }

    #[test]
    fn env_vars_map_to_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MAILER_HOST", "smtp.env.example");
            jail.set_env("MAILER_AUTH_PASS", "from-env");
            jail.set_env("MAILER_RATE_LIMIT_EMAILS_PER_SECOND", "3");
            jail.set_env("MAILER_LOG_LEVEL", "debug");

            let config: MailerConfig = Figment::new()
                .merge(Serialized::defaults(MailerConfig::default()))
                .merge(env_provider())
                .extract()?;

            assert_eq!(config.host, "smtp.env.example");
            assert_eq!(config.auth.pass, "from-env");
            assert_eq!(config.rate_limit.emails_per_second, 3);
            assert_eq!(config.log_level, "debug");
            Ok(())
        });
    }

    #[test]
    fn nested_env_override_does_not_trip_unknown_key_check() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("MAILER_AUTH_USER", "mailer");
            jail.set_env("MAILER_RATE_LIMIT_EMAILS_PER_SECOND", "7");

            let config = load_config()?;
            assert_eq!(config.auth.user, "mailer");
            assert_eq!(config.rate_limit.emails_per_second, 7);
            Ok(())
        });
    }

    #[test]
    fn local_file_overrides_defaults_and_env_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                CONFIG_FILE_NAME,
                "host: smtp.file.example\nport: 2525\nfrom: news@shop.example\n",
            )?;
            jail.set_env("MAILER_PORT", "587");

            let config = load_config()?;
            assert_eq!(config.host, "smtp.file.example");
            assert_eq!(config.port, 587);
            assert_eq!(config.from, "news@shop.example");
            Ok(())
        });
    }
}
