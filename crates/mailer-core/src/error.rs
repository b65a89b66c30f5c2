// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the mailer workspace.

use thiserror::Error;

/// The primary error type used across the mailer crates.
#[derive(Debug, Error)]
pub enum MailerError {
    /// Configuration errors (invalid values, zero rate limits, unparseable addresses).
    #[error("configuration error: {0}")]
    Config(String),

    /// Template could not be located or read.
    #[error("template error: {message}")]
    Template {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Rendering a template for one recipient failed.
    #[error("render error: {message}")]
    Render { message: String },

    /// Recipient list could not be read or parsed.
    #[error("recipients error: {message}")]
    Recipients {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Mail transport errors (connection failure, rejected message, TLS).
    #[error("transport error: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl MailerError {
    /// Shorthand for a transport error without an underlying source.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// The bare human-readable reason, without the category prefix.
    ///
    /// This is what ends up in a per-recipient failure entry.
    pub fn reason(&self) -> String {
        match self {
            Self::Config(message) | Self::Internal(message) => message.clone(),
            Self::Template { message, .. }
            | Self::Render { message }
            | Self::Recipients { message, .. }
            | Self::Transport { message, .. } => message.clone(),
        }
    }
}
