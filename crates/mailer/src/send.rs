// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The send command: template + CSV in, dispatch result out.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use mailer_config::MailerConfig;
use mailer_core::{DispatchResult, EmailTransport, MailerError, Recipient};
use mailer_dispatch::{DispatchOptions, Dispatcher, ProgressFn, ProgressUpdate};
use mailer_recipients::load_recipients;
use mailer_smtp::SmtpTransport;
use mailer_template::{load_template, Template};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::delivery::{preview, TemplatedDelivery};

const BAR_TEMPLATE: &str = concat!(
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] ",
    "{pos}/{len} ({per_sec}, ETA {eta}) {msg}",
);

/// Inputs of one send run, taken from the command line.
#[derive(Debug, Clone)]
pub struct SendArgs {
    pub template: String,
    pub data: PathBuf,
    pub rate: Option<u32>,
    pub dry_run: bool,
    /// Hide the progress bar (JSON output, non-interactive use).
    pub quiet: bool,
}

/// Runs the send command against the configured SMTP server.
pub async fn run_send(
    config: &MailerConfig,
    args: &SendArgs,
    cancel: CancellationToken,
) -> Result<DispatchResult, MailerError> {
    let transport = if args.dry_run {
        None
    } else {
        let transport = SmtpTransport::from_config(config)?;
        transport.verify().await?;
        Some(transport)
    };

    let template = load_template(&args.template, Path::new(&config.templates_dir))?;
    let recipients = load_recipients(&args.data)?;

    let missing = template.missing_fields(recipients.columns.iter().map(String::as_str));
    if !missing.is_empty() {
        warn!(
            fields = ?missing,
            "template uses fields that are not CSV columns; those recipients will fail"
        );
    }

    let Some(transport) = transport else {
        info!(count = recipients.recipients.len(), "dry run, nothing will be sent");
        return Ok(preview(&template, &recipients.recipients));
    };

    let rate = args.rate.unwrap_or(config.rate_limit.emails_per_second);
    let bar = progress_bar(recipients.recipients.len(), args.quiet);
    let result = send_all(
        template,
        &config.from,
        recipients.recipients,
        Arc::new(transport),
        rate,
        &bar,
        cancel,
    )
    .await;
    bar.finish_and_clear();

    result
}

/// Dispatch `template` to every recipient through `transport`.
pub async fn send_all(
    template: Template,
    from: &str,
    recipients: Vec<Recipient>,
    transport: Arc<dyn EmailTransport>,
    rate: u32,
    bar: &ProgressBar,
    cancel: CancellationToken,
) -> Result<DispatchResult, MailerError> {
    let dispatcher = Dispatcher::new(DispatchOptions::coupled(rate))?;
    let delivery = Arc::new(TemplatedDelivery::new(template, from, transport));

    let on_progress: &ProgressFn<'_> = &|update: ProgressUpdate| {
        bar.set_position(update.processed as u64);
        bar.set_message(update.recipient);
    };

    let result = dispatcher
        .run_with_cancel(recipients, delivery, Some(on_progress), cancel)
        .await;
    bar.set_position(result.processed() as u64);
    Ok(result)
}

fn progress_bar(total: usize, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(BAR_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
    ProgressBar::new(total as u64).with_style(style)
}
