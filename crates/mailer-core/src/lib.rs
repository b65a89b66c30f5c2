// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the mailer workspace.
//!
//! This crate provides the error type, the recipient/result data model, and
//! the trait seams (`Delivery`, `EmailTransport`) the dispatcher and the
//! SMTP adapter are built on.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MailerError;
pub use traits::{Delivery, EmailTransport};
pub use types::{DispatchResult, FailedRecipient, OutgoingEmail, Recipient};
