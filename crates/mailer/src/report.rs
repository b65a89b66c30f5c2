// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-of-run summary.

use std::fmt::Write as _;

use colored::Colorize;
use mailer_core::DispatchResult;

/// Human-readable summary with itemized failures.
pub fn render_report(result: &DispatchResult, use_color: bool, dry_run: bool) -> String {
    let mut out = String::new();
    let sent_label = if dry_run { "Rendered" } else { "Sent" };

    let _ = writeln!(out);
    let _ = writeln!(out, "  {}", if dry_run { "Dry run complete" } else { "Dispatch complete" });
    let _ = writeln!(out, "  {}", "-".repeat(50));

    let sent = format!("{sent_label}: {}", result.success_count);
    let failed = format!("Failed: {}", result.failure_count);
    if use_color {
        let _ = writeln!(out, "    {}", sent.green());
        let failed = if result.failure_count > 0 { failed.red() } else { failed.normal() };
        let _ = writeln!(out, "    {failed}");
    } else {
        let _ = writeln!(out, "    {sent}");
        let _ = writeln!(out, "    {failed}");
    }

    if result.skipped_count > 0 {
        let skipped = format!("Skipped (cancelled): {}", result.skipped_count);
        if use_color {
            let _ = writeln!(out, "    {}", skipped.yellow());
        } else {
            let _ = writeln!(out, "    {skipped}");
        }
    }

    if !result.failures.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "  Failed recipients:");
        for (i, failure) in result.failures.iter().enumerate() {
            let _ = writeln!(out, "    {}. {} ({})", i + 1, failure.name, failure.email);
            let error = format!("Error: {}", failure.error);
            if use_color {
                let _ = writeln!(out, "       {}", error.red());
            } else {
                let _ = writeln!(out, "       {error}");
            }
        }
    }

    let _ = writeln!(out);
    out
}

/// Machine-readable summary.
pub fn render_json(result: &DispatchResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}

/// Process exit code for a finished run.
pub fn exit_code(result: &DispatchResult) -> i32 {
    if result.is_success() { 0 } else { 1 }
}
