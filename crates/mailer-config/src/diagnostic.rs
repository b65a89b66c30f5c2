// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Readable reports for a bad `smtp.yaml`.
//!
//! Every problem becomes a [`ConfigError`], a miette diagnostic. Unknown keys
//! point at the offending line of the YAML file and, when a real key is
//! close enough by Jaro-Winkler similarity, suggest it.

#![allow(unused_assignments)] // emitted by miette's Diagnostic derive

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Similarity a known key needs before it is offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// One problem found while loading or validating configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(mailer::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        /// Comma-separated keys allowed where `key` appeared.
        valid_keys: String,
        #[label("not a recognized key")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(mailer::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required field: {key}")]
    #[diagnostic(
        code(mailer::config::missing_key),
        help("set `{key}` in smtp.yaml, or export MAILER_{}", env_name(key))
    )]
    MissingKey { key: String },

    #[error("validation error: {message}")]
    #[diagnostic(code(mailer::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(mailer::config::other))]
    Other(String),
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    let mut help = String::new();
    if let Some(suggestion) = suggestion {
        help.push_str(&format!("did you mean `{suggestion}`? "));
    }
    help.push_str(&format!("expected one of: {valid_keys}"));
    help
}

/// `auth.pass` -> `AUTH_PASS`.
fn env_name(key: &str) -> String {
    key.replace('.', "_").to_ascii_uppercase()
}

/// Split a figment failure into one diagnostic per underlying error.
///
/// `sources` are the `(path, contents)` pairs of the YAML files that were
/// merged; they let unknown keys carry a labelled span.
pub fn figment_to_config_errors(
    err: figment::Error,
    sources: &[(String, String)],
) -> Vec<ConfigError> {
    err.into_iter().map(|error| convert(&error, sources)).collect()
}

fn convert(error: &figment::Error, sources: &[(String, String)]) -> ConfigError {
    match &error.kind {
        Kind::UnknownField(key, expected) => {
            let (span, src) = locate(error, key, sources).unzip();
            ConfigError::UnknownKey {
                key: key.clone(),
                suggestion: suggest_key(key, expected),
                valid_keys: expected.join(", "),
                span,
                src,
            }
        }
        Kind::MissingField(key) => ConfigError::MissingKey {
            key: qualified(&error.path, key),
        },
        Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
            key: error.path.join("."),
            detail: format!("found {actual}"),
            expected: expected.clone(),
        },
        _ => ConfigError::Other(error.to_string()),
    }
}

/// The section enclosing `key`: figment's error path may already end with `key` itself.
fn section_of<'p>(path: &'p [String], key: &str) -> &'p [String] {
    match path.split_last() {
        Some((last, parent)) if last == key => parent,
        _ => path,
    }
}

fn qualified(path: &[String], key: &str) -> String {
    section_of(path, key)
        .iter()
        .map(String::as_str)
        .chain([key])
        .collect::<Vec<_>>()
        .join(".")
}

/// Span and source of `key` in whichever merged file the error came from.
fn locate(
    error: &figment::Error,
    key: &str,
    sources: &[(String, String)],
) -> Option<(SourceSpan, NamedSource<String>)> {
    let origin = error.metadata.as_ref().and_then(|m| m.source.as_ref());
    let (path, content) = match origin {
        Some(figment::Source::File(file)) => {
            let file = std::fs::canonicalize(file).unwrap_or_else(|_| file.clone());
            let file = file.display().to_string();
            sources.iter().find(|(p, _)| *p == file)?
        }
        // Inline YAML has no file metadata.
        _ if sources.len() == 1 => &sources[0],
        _ => return None,
    };

    let offset = find_key_offset(content, section_of(&error.path, key), key)?;
    Some((
        SourceSpan::new(offset.into(), key.len()),
        NamedSource::new(path, content.clone()),
    ))
}

/// Byte offset of `field` in block-style YAML.
///
/// With an empty `path` only unindented keys match. Otherwise the search is
/// limited to the indented block under the top-level `path[0]:` key.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let section = path.first().map(String::as_str);
    let mut inside = section.is_none();
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let key_start = line.len() - line.trim_start().len();
        let line_key = line[key_start..].split_once(':').map(|(k, _)| k);
        let blank = line.trim().is_empty();

        match (section, key_start) {
            (None, 0) if line_key == Some(field) => return Some(offset),
            (Some(section), 0) if !blank => inside = line_key == Some(section),
            (Some(_), indent) if indent > 0 && inside && line_key == Some(field) => {
                return Some(offset + indent);
            }
            _ => {}
        }
        offset += line.len();
    }

    None
}

/// Closest known key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Print every error to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut out = String::new();
        match handler.render_report(&mut out, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{out}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
