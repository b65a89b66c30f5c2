// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the mailer CLI.
//!
//! Provides YAML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides, and miette
//! diagnostic rendering with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use mailer_config::load_and_validate;
//!
//! let config = load_and_validate(None).expect("config errors");
//! println!("SMTP host: {}", config.host);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::Path;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::MailerConfig;

/// Load configuration and validate it.
///
/// With `path = None` the XDG hierarchy is searched; with an explicit path
/// only that file (plus `MAILER_*` env vars) is used.
///
/// Returns either a valid `MailerConfig` or a list of diagnostic errors.
pub fn load_and_validate(path: Option<&Path>) -> Result<MailerConfig, Vec<ConfigError>> {
    let loaded = match path {
        Some(path) => loader::load_config_from_path(path),
        None => loader::load_config(),
    };

    match loaded {
        Ok(config) => {
            validation::validate_config(&config)?;
            tracing::debug!(
                host = config.host.as_str(),
                port = config.port,
                "configuration loaded"
            );
            Ok(config)
        }
        Err(err) => {
            let sources = collect_yaml_sources(path);
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Load configuration from a YAML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(yaml_content: &str) -> Result<MailerConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(yaml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), yaml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect YAML source file contents for error span resolution.
fn collect_yaml_sources(explicit: Option<&Path>) -> Vec<(String, String)> {
    let paths = match explicit {
        Some(path) => vec![path.to_path_buf()],
        None => loader::config_paths(),
    };

    paths
        .into_iter()
        .filter_map(|path| {
            let content = std::fs::read_to_string(&path).ok()?;
            // figment records absolute paths in error metadata.
            let path = std::fs::canonicalize(&path).unwrap_or(path);
            Some((path.display().to_string(), content))
        })
        .collect()
}
