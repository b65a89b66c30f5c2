// SPDX-FileCopyrightText: 2026 Mailer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient lists read from CSV.
//!
//! The first row is the header; each later row becomes one [`Recipient`]
//! whose fields are keyed by column name. An `email` column is required.
//! Rows with a blank email are kept so the dispatcher can report them.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use mailer_core::{MailerError, Recipient};
use tracing::{debug, warn};

/// Column that must be present in every recipient file.
pub const EMAIL_COLUMN: &str = "email";

/// A parsed recipient list plus the header it was read with.
#[derive(Debug, Clone, Default)]
pub struct RecipientList {
    pub columns: Vec<String>,
    pub recipients: Vec<Recipient>,
}

/// Read and parse a CSV file.
pub fn load_recipients(path: &Path) -> Result<RecipientList, MailerError> {
    let file = std::fs::File::open(path).map_err(|e| MailerError::Recipients {
        message: format!("cannot open `{}`: {e}", path.display()),
        source: Some(Box::new(e)),
    })?;
    let list = parse_recipients(file)?;
    debug!(path = %path.display(), count = list.recipients.len(), "recipients loaded");
    Ok(list)
}

/// Parse CSV from any reader.
pub fn parse_recipients<R: Read>(reader: R) -> Result<RecipientList, MailerError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    if !columns.iter().any(|c| c == EMAIL_COLUMN) {
        return Err(MailerError::Recipients {
            message: format!("missing `{EMAIL_COLUMN}` column in header"),
            source: None,
        });
    }

    let mut recipients = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if is_blank(&record) {
            continue;
        }
        if record.len() != columns.len() {
            warn!(
                line = record.position().map_or(0, |p| p.line()),
                expected = columns.len(),
                found = record.len(),
                "row has a different number of fields than the header"
            );
        }
        recipients.push(to_recipient(&columns, &record));
    }

    Ok(RecipientList {
        columns,
        recipients,
    })
}

fn to_recipient(columns: &[String], record: &StringRecord) -> Recipient {
    let fields: BTreeMap<String, String> = columns
        .iter()
        .zip(record.iter())
        .filter(|(column, _)| !column.is_empty())
        .map(|(column, value)| (column.clone(), value.to_string()))
        .collect();
    Recipient::from(fields)
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(str::is_empty)
}

fn csv_error(err: csv::Error) -> MailerError {
    MailerError::Recipients {
        message: format!("invalid CSV: {err}"),
        source: Some(Box::new(err)),
    }
}
