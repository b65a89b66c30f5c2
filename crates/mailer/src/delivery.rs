// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The per-recipient send: render the template, hand it to a transport.

use std::sync::Arc;

use async_trait::async_trait;
use mailer_core::{
    Delivery, DispatchResult, EmailTransport, FailedRecipient, MailerError, OutgoingEmail,
    Recipient,
};
use mailer_dispatch::precheck;
use mailer_template::Template;
use tracing::debug;

/// [`Delivery`] that renders `template` for each recipient and sends it
/// through `transport`.
pub struct TemplatedDelivery {
    template: Template,
    from: String,
    transport: Arc<dyn EmailTransport>,
}

impl TemplatedDelivery {
    pub fn new(
        template: Template,
        from: impl Into<String>,
        transport: Arc<dyn EmailTransport>,
    ) -> Self {
        Self {
            template,
            from: from.into(),
            transport,
        }
    }

    fn compose(&self, recipient: &Recipient) -> Result<OutgoingEmail, MailerError> {
        let to = recipient
            .email()
            .ok_or_else(|| MailerError::Internal("recipient has no email".to_string()))?;
        let rendered = self.template.render(recipient)?;
        Ok(OutgoingEmail {
            from: self.from.clone(),
            to: to.to_string(),
            subject: rendered.subject,
            html: rendered.html,
        })
    }
}

#[async_trait]
impl Delivery for TemplatedDelivery {
    async fn deliver(&self, recipient: &Recipient) -> Result<(), MailerError> {
        let email = self.compose(recipient)?;
        debug!(to = email.to.as_str(), subject = email.subject.as_str(), "sending");
        self.transport.send(email).await
    }
}

/// Render every recipient without sending anything.
///
/// Uses the same pre-admission check as a real run, so the counts match
/// what a real run would attempt.
pub fn preview(template: &Template, recipients: &[Recipient]) -> DispatchResult {
    let mut result = DispatchResult::default();
    for recipient in recipients {
        let outcome = precheck(recipient)
            .map_err(str::to_string)
            .and_then(|_| template.render(recipient).map_err(|e| e.reason()));
        match outcome {
            Ok(_) => result.record_success(),
            Err(reason) => result.record_failure(FailedRecipient::new(recipient, reason)),
        }
    }
    result
}
