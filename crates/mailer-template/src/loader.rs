// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Template lookup and front-matter parsing.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use mailer_core::MailerError;
use regex::Regex;
use tracing::debug;

use crate::Template;

/// Subject used when the front matter has no `subject:` line.
pub const DEFAULT_SUBJECT: &str = "No Subject";

/// Extension appended when a template is given by name.
pub const TEMPLATE_EXTENSION: &str = "html";

static FRONT_MATTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A---\r?\n([\s\S]*?)\r?\n---[ \t]*(?:\r?\n|\z)")
        .expect("front matter pattern is valid")
});

static SUBJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^subject:[ \t]*(.+?)[ \t]*\r?$").expect("subject pattern is valid")
});

/// Load a template by path or by name.
///
/// An existing file path is used as-is; otherwise `name_or_path` is treated as a
/// name and resolved to `<templates_dir>/<name_or_path>.html`.
pub fn load_template(name_or_path: &str, templates_dir: &Path) -> Result<Template, MailerError> {
    let path = resolve(name_or_path, templates_dir);
    let content = std::fs::read_to_string(&path).map_err(|e| MailerError::Template {
        message: format!("cannot read template `{}`: {e}", path.display()),
        source: Some(Box::new(e)),
    })?;

    let template = parse_template(&content);
    debug!(path = %path.display(), subject = template.subject.as_str(), "template loaded");
    Ok(template)
}

fn resolve(name_or_path: &str, templates_dir: &Path) -> PathBuf {
    let direct = PathBuf::from(name_or_path);
    if direct.is_file() {
        return direct;
    }
    templates_dir.join(format!("{name_or_path}.{TEMPLATE_EXTENSION}"))
}

/// Split optional `---` front matter from the body and pick out the subject.
pub fn parse_template(content: &str) -> Template {
    let (front_matter, body) = match FRONT_MATTER.captures(content) {
        Some(caps) => {
            let whole = caps.get(0).map_or(0, |m| m.end());
            let front = caps.get(1).map_or("", |m| m.as_str());
            (front, &content[whole..])
        }
        None => ("", content),
    };

    let subject = SUBJECT_LINE
        .captures(front_matter)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_SUBJECT.to_string());

    Template {
        subject,
        body: body.to_string(),
    }
}
