// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Email templates with a front-matter subject and `{{ field }}` placeholders.
//!
//! ```text
//! ---
//! subject: Your coupon, {{ name }}
//! ---
//! <p>Hi {{ name }}, use <b>{{ coupon }}</b> at checkout.</p>
//! ```

pub mod loader;
pub mod render;

pub use loader::{load_template, parse_template, DEFAULT_SUBJECT, TEMPLATE_EXTENSION};
pub use render::RenderedEmail;

/// A parsed template: subject line plus HTML body, both possibly containing placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub subject: String,
    pub body: String,
}
