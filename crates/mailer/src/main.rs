// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mailer - send a templated email to every row of a CSV file.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod delivery;
mod report;
mod send;
mod shutdown;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;
use mailer_core::MailerError;
use tracing::error;

use crate::send::{run_send, SendArgs};

/// Mailer - send a templated email to every row of a CSV file.
#[derive(Parser, Debug)]
#[command(name = "mailer", version, about, long_about = None)]
struct Cli {
    /// Template name (looked up in `templates_dir`) or path to a template file.
    #[arg(short, long, value_name = "NAME|PATH")]
    template: String,

    /// CSV file with an `email` column and one row per recipient.
    #[arg(short, long, value_name = "CSV")]
    data: PathBuf,

    /// Explicit config file instead of the default smtp.yaml lookup.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Emails per second (overrides `rate_limit.emails_per_second`).
    #[arg(short, long, value_name = "N")]
    rate: Option<u32>,

    /// Render every email but send nothing.
    #[arg(long)]
    dry_run: bool,

    /// Print the final report as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable colored output.
    #[arg(long)]
    plain: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match mailer_config::load_and_validate(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            mailer_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.log_level);

    let use_color = !cli.plain && std::io::stderr().is_terminal();
    let args = SendArgs {
        template: cli.template,
        data: cli.data,
        rate: cli.rate,
        dry_run: cli.dry_run,
        quiet: cli.json || !std::io::stderr().is_terminal(),
    };

    let cancel = shutdown::install_signal_handler();
    let result = match run_send(&config, &args, cancel).await {
        Ok(result) => result,
        Err(err) => {
            error!(error = %err, "send aborted");
            print_fatal(&err, &config.host, use_color);
            std::process::exit(1);
        }
    };

    if cli.json {
        match report::render_json(&result) {
            Ok(json) => println!("{json}"),
            Err(err) => {
                eprintln!("error: cannot serialize report: {err}");
                std::process::exit(1);
            }
        }
    } else {
        eprint!("{}", report::render_report(&result, use_color, args.dry_run));
    }

    std::process::exit(report::exit_code(&result));
}

fn print_fatal(err: &MailerError, host: &str, use_color: bool) {
    let message = match err {
        MailerError::Transport { message, .. }
            if mailer_smtp::is_name_resolution_error(message) =>
        {
            format!(
                "Failed to connect to SMTP server: could not resolve `{host}`. \
                 Check `host` in smtp.yaml and your network connection."
            )
        }
        MailerError::Transport { message, .. } => {
            format!("Failed to connect to SMTP server: {message}")
        }
        other => other.to_string(),
    };

    if use_color {
        eprintln!("{} {message}", "error:".red().bold());
    } else {
        eprintln!("error: {message}");
    }
}

/// Initialize the tracing subscriber with an env filter.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("mailer={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
