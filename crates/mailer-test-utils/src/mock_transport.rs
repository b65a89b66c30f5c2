// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock mail transport capturing outbound messages.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use mailer_core::{EmailTransport, MailerError, OutgoingEmail};

/// Records every message passed to `send()`; can be told to reject
/// specific recipients or to fail verification.
#[derive(Debug, Default)]
pub struct MockTransport {
    sent: Mutex<Vec<OutgoingEmail>>,
    reject: HashMap<String, String>,
    verify_error: Option<String>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages to `to` fail with `message`.
    pub fn rejecting(mut self, to: impl Into<String>, message: impl Into<String>) -> Self {
        self.reject.insert(to.into(), message.into());
        self
    }

    /// `verify()` fails with `message`.
    pub fn unreachable(mut self, message: impl Into<String>) -> Self {
        self.verify_error = Some(message.into());
        self
    }

    /// Get all messages that were sent.
    pub async fn sent_messages(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }

    /// Get the count of sent messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl EmailTransport for MockTransport {
    async fn verify(&self) -> Result<(), MailerError> {
        match &self.verify_error {
            Some(message) => Err(MailerError::transport(message.clone())),
            None => Ok(()),
        }
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
        if let Some(message) = self.reject.get(&email.to) {
            return Err(MailerError::transport(message.clone()));
        }
        self.sent.lock().await.push(email);
        Ok(())
    }
}
