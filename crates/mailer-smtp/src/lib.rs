// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMTP transport built on lettre's async Tokio transport.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use mailer_config::MailerConfig;
use mailer_core::{EmailTransport, MailerError, OutgoingEmail};
use tracing::{debug, info};

/// How the connection to the server is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsMode {
    /// TLS from the first byte (SMTPS, usually port 465).
    Wrapper,
    /// Plain connection upgraded with STARTTLS when the server offers it.
    Opportunistic,
}

impl TlsMode {
    pub fn from_secure(secure: bool) -> Self {
        if secure { Self::Wrapper } else { Self::Opportunistic }
    }
}

/// SMTP-backed [`EmailTransport`].
#[derive(Clone)]
pub struct SmtpTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    host: String,
}

impl SmtpTransport {
    /// Build a pooled transport from validated configuration.
    ///
    /// No connection is opened here; call [`EmailTransport::verify`] for that.
    pub fn from_config(config: &MailerConfig) -> Result<Self, MailerError> {
        let mode = TlsMode::from_secure(config.secure);
        let parameters =
            TlsParameters::new(config.host.clone()).map_err(|e| MailerError::Transport {
                message: format!("cannot set up TLS for {}: {e}", config.host),
                source: Some(Box::new(e)),
            })?;
        let tls = match mode {
            TlsMode::Wrapper => Tls::Wrapper(parameters),
            TlsMode::Opportunistic => Tls::Opportunistic(parameters),
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
            .port(config.port)
            .tls(tls);

        if !config.auth.user.is_empty() {
            builder = builder.credentials(Credentials::new(
                config.auth.user.clone(),
                config.auth.pass.clone(),
            ));
        }

        debug!(host = config.host.as_str(), port = config.port, ?mode, "smtp transport configured");
        Ok(Self {
            transport: builder.build(),
            host: config.host.clone(),
        })
    }
}

impl std::fmt::Debug for SmtpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpTransport").field("host", &self.host).finish()
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn verify(&self) -> Result<(), MailerError> {
        match self.transport.test_connection().await {
            Ok(true) => {
                info!(host = self.host.as_str(), "smtp connection verified");
                Ok(())
            }
            Ok(false) => Err(MailerError::transport(format!(
                "SMTP server {} did not accept the connection",
                self.host
            ))),
            Err(e) => Err(MailerError::Transport {
                message: e.to_string(),
                source: Some(Box::new(e)),
            }),
        }
    }

    async fn send(&self, email: OutgoingEmail) -> Result<(), MailerError> {
        let message = build_message(&email)?;
        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Transport {
                message: e.to_string(),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }
}

/// Turn a rendered email into a single-part HTML lettre message.
pub fn build_message(email: &OutgoingEmail) -> Result<Message, MailerError> {
    let from = parse_mailbox(&email.from)?;
    let to = parse_mailbox(&email.to)?;

    Message::builder()
        .from(from)
        .to(to)
        .subject(email.subject.as_str())
        .header(ContentType::TEXT_HTML)
        .body(email.html.clone())
        .map_err(|e| MailerError::transport(format!("cannot build message: {e}")))
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailerError> {
    address
        .parse()
        .map_err(|e| MailerError::transport(format!("invalid address `{address}`: {e}")))
}

/// Whether a transport error looks like a DNS lookup failure.
pub fn is_name_resolution_error(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    [
        "failed to lookup address",
        "name or service not known",
        "nodename nor servname",
        "no such host",
        "temporary failure in name resolution",
        "dns error",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
}
