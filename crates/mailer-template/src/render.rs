// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-recipient placeholder substitution.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use mailer_core::{MailerError, Recipient};
use regex::{Captures, Regex};

use crate::Template;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").expect("placeholder pattern is valid")
});

/// Subject and HTML body for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

impl Template {
    /// Fill every placeholder from the recipient's fields.
    ///
    /// Values are HTML-escaped in the body and inserted verbatim in the
    /// subject. A placeholder naming a field the recipient lacks is an error.
    pub fn render(&self, recipient: &Recipient) -> Result<RenderedEmail, MailerError> {
        Ok(RenderedEmail {
            subject: substitute(&self.subject, recipient, false)?,
            html: substitute(&self.body, recipient, true)?,
        })
    }

    /// Every distinct field name referenced by the subject or body.
    pub fn placeholders(&self) -> BTreeSet<String> {
        PLACEHOLDER
            .captures_iter(&self.subject)
            .chain(PLACEHOLDER.captures_iter(&self.body))
            .map(|caps| caps[1].to_string())
            .collect()
    }

    /// Placeholders not covered by the given column names.
    pub fn missing_fields<'h>(&self, columns: impl IntoIterator<Item = &'h str>) -> Vec<String> {
        let columns: BTreeSet<&str> = columns.into_iter().collect();
        self.placeholders()
            .into_iter()
            .filter(|field| !columns.contains(field.as_str()))
            .collect()
    }
}

fn substitute(text: &str, recipient: &Recipient, escape: bool) -> Result<String, MailerError> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;

    for caps in PLACEHOLDER.captures_iter(text) {
        let whole = caps.get(0).map_or(0..0, |m| m.range());
        out.push_str(&text[last..whole.start]);
        let value = lookup(&caps, recipient)?;
        if escape {
            push_escaped(&mut out, value);
        } else {
            out.push_str(value);
        }
        last = whole.end;
    }

    out.push_str(&text[last..]);
    Ok(out)
}

fn lookup<'r>(caps: &Captures<'_>, recipient: &'r Recipient) -> Result<&'r str, MailerError> {
    let field = &caps[1];
    recipient.get(field).ok_or_else(|| MailerError::Render {
        message: format!("template references unknown field `{field}`"),
    })
}

fn push_escaped(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
}
