// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-recipient delivery capability invoked by the dispatcher.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::MailerError;
use crate::types::Recipient;

/// Renders and transmits one email for one recipient.
///
/// The dispatcher calls this once per admitted recipient and treats it as
/// opaque: any `Err` becomes a failure entry carrying [`MailerError::reason`].
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn deliver(&self, recipient: &Recipient) -> Result<(), MailerError>;
}

#[async_trait]
impl<T: Delivery + ?Sized> Delivery for Arc<T> {
    async fn deliver(&self, recipient: &Recipient) -> Result<(), MailerError> {
        (**self).deliver(recipient).await
    }
}
