// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mail transport trait (SMTP in production, mocks in tests).

use async_trait::async_trait;

use crate::error::MailerError;
use crate::types::OutgoingEmail;

/// Adapter for an outbound mail transport.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Checks that the server is reachable and accepts our credentials.
    async fn verify(&self) -> Result<(), MailerError>;

    /// Sends one fully rendered message.
    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError>;
}
