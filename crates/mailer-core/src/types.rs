// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the mailer workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Placeholder used in reports when a recipient has no email address.
pub const MISSING_EMAIL_PLACEHOLDER: &str = "N/A";

/// One addressee plus arbitrary merge fields, keyed by column name.
///
/// The dispatcher only reads `email` and `name`; every other field is
/// passed through untouched to the template renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipient {
    fields: BTreeMap<String, String>,
}

impl Recipient {
    /// Create a recipient with only an email address.
    pub fn new(email: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), email.into());
        Self { fields }
    }

    /// Create a recipient without any fields at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Builder-style name setter.
    pub fn with_name(self, name: impl Into<String>) -> Self {
        self.with_field("name", name)
    }

    /// The email address, or `None` when the field is absent or blank.
    pub fn email(&self) -> Option<&str> {
        self.non_blank("email")
    }

    /// The display name, or `None` when the field is absent or blank.
    pub fn name(&self) -> Option<&str> {
        self.non_blank("name")
    }

    /// Name if present, otherwise the email, otherwise `"N/A"`.
    pub fn display_name(&self) -> &str {
        self.name()
            .or_else(|| self.email())
            .unwrap_or(MISSING_EMAIL_PLACEHOLDER)
    }

    /// Human-readable `Name (email)` label used in progress updates.
    pub fn descriptor(&self) -> String {
        format!(
            "{} ({})",
            self.display_name(),
            self.email().unwrap_or(MISSING_EMAIL_PLACEHOLDER)
        )
    }

    /// Look up any merge field by name.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    fn non_blank(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }
}

impl From<BTreeMap<String, String>> for Recipient {
    fn from(fields: BTreeMap<String, String>) -> Self {
        Self { fields }
    }
}

/// A recipient whose send attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedRecipient {
    /// Email address, or `"N/A"` when the recipient had none.
    pub email: String,
    /// Display name (falls back to the email).
    pub name: String,
    /// Human-readable failure reason.
    pub error: String,
}

impl FailedRecipient {
    /// Build a failure entry for `recipient` with the given reason.
    pub fn new(recipient: &Recipient, error: impl Into<String>) -> Self {
        Self {
            email: recipient
                .email()
                .unwrap_or(MISSING_EMAIL_PLACEHOLDER)
                .to_string(),
            name: recipient.display_name().to_string(),
            error: error.into(),
        }
    }
}

/// Aggregate result of one dispatch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchResult {
    pub success_count: usize,
    pub failure_count: usize,
    /// Recipients never attempted because the run was cancelled.
    pub skipped_count: usize,
    /// Failures in the order they were recorded.
    pub failures: Vec<FailedRecipient>,
}

impl DispatchResult {
    /// Record a successful send.
    pub fn record_success(&mut self) {
        self.success_count += 1;
    }

    /// Record a failed attempt or a rejected recipient.
    pub fn record_failure(&mut self, failure: FailedRecipient) {
        self.failure_count += 1;
        self.failures.push(failure);
    }

    /// Record a recipient that was never attempted.
    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    /// Number of recipients that reached a final success or failure.
    pub fn processed(&self) -> usize {
        self.success_count + self.failure_count
    }

    /// True when every recipient was sent.
    pub fn is_success(&self) -> bool {
        self.failure_count == 0 && self.skipped_count == 0
    }
}

/// A fully rendered message ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}
