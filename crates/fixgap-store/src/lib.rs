//! CSV persistence for cross-reference datasets and missing-fix
//! reports. Every field is quoted on write; on read the empty string
//! and the literal `None` both denote an absent value.

use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use csv::{QuoteStyle, ReaderBuilder, StringRecord, WriterBuilder};
use fixgap_core::{MissingFixCandidate, XREF_COLUMNS, XrefDataset, XrefRow};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{path}: missing column {column}")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("{path}: malformed timestamp {value:?}: {reason}")]
    MalformedTimestamp {
        path: PathBuf,
        value: String,
        reason: String,
    },
}

/// Columns of a serialized missing-fix report. The last two are derived
/// display columns: upstream id when known, local id otherwise.
pub const REPORT_COLUMNS: [&str; 7] = [
    "Missing_commit_upstream",
    "Missing_commit_stable",
    "Missing_commit_summary",
    "Based_on_commit_upstream",
    "Based_on_commit_stable",
    "Missing_commit",
    "Based_on_commit",
];

/// Writes a dataset as fully quoted CSV under the [`XREF_COLUMNS`]
/// header.
pub fn write_dataset(dataset: &XrefDataset, path: &Path) -> Result<(), StoreError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?;
    writer.write_record(XREF_COLUMNS)?;
    for row in dataset.rows() {
        writer.write_record(encode_row(row))?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), rows = dataset.len(), "wrote dataset");
    Ok(())
}

/// Reads a dataset previously written by [`write_dataset`].
///
/// Columns are located by header name, so column order and extra
/// columns do not matter; each of the seven known columns must be
/// present.
///
/// # Errors
///
/// Fails on unreadable files, absent required columns and timestamps
/// that parse neither as RFC 3339 nor as `%Y-%m-%d %H:%M:%S%:z`.
pub fn read_dataset(path: &Path) -> Result<XrefDataset, StoreError> {
    let mut reader = ReaderBuilder::new().from_path(path)?;
    let header = reader.headers()?.clone();

    let column_index = |column: &'static str| -> Result<usize, StoreError> {
        header
            .iter()
            .position(|name| name == column)
            .ok_or(StoreError::MissingColumn {
                path: path.to_path_buf(),
                column,
            })
    };
    let commit_datetime = column_index("Commit_datetime")?;
    let commit_hexsha = column_index("Commit_hexsha")?;
    let commit_summary = column_index("Commit_summary")?;
    let commit_upstream = column_index("Commit_upstream_hexsha")?;
    let refcommit_datetime = column_index("Refcommit_datetime")?;
    let refcommit_hexsha = column_index("Refcommit_hexsha")?;
    let refcommit_upstream = column_index("Refcommit_upstream_hexsha")?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(XrefRow {
            commit_hexsha: field(&record, commit_hexsha).to_owned(),
            commit_summary: field(&record, commit_summary).to_owned(),
            commit_datetime: parse_datetime(path, field(&record, commit_datetime))?,
            commit_upstream_hexsha: optional(field(&record, commit_upstream)),
            refcommit_hexsha: optional(field(&record, refcommit_hexsha)),
            refcommit_datetime: match optional(field(&record, refcommit_datetime)) {
                Some(value) => Some(parse_datetime(path, &value)?),
                None => None,
            },
            refcommit_upstream_hexsha: optional(field(&record, refcommit_upstream)),
        });
    }
    tracing::debug!(path = %path.display(), rows = rows.len(), "read dataset");
    Ok(XrefDataset::new(rows))
}

/// Writes a missing-fix report as fully quoted CSV under the
/// [`REPORT_COLUMNS`] header.
pub fn write_report(candidates: &[MissingFixCandidate], path: &Path) -> Result<(), StoreError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_path(path)?;
    writer.write_record(REPORT_COLUMNS)?;
    for candidate in candidates {
        writer.write_record([
            candidate.missing_commit_upstream.as_deref().unwrap_or(""),
            &candidate.missing_commit_stable,
            &candidate.missing_commit_summary,
            candidate.based_on_commit_upstream.as_deref().unwrap_or(""),
            &candidate.based_on_commit_stable,
            candidate.missing_commit(),
            candidate.based_on_commit(),
        ])?;
    }
    writer.flush()?;
    tracing::info!(path = %path.display(), candidates = candidates.len(), "wrote report");
    Ok(())
}

fn encode_row(row: &XrefRow) -> [String; 7] {
    // Matches XREF_COLUMNS order.
    [
        row.commit_datetime.to_rfc3339(),
        row.commit_hexsha.clone(),
        row.commit_summary.clone(),
        row.commit_upstream_hexsha.clone().unwrap_or_default(),
        row.refcommit_datetime
            .map(|datetime| datetime.to_rfc3339())
            .unwrap_or_default(),
        row.refcommit_hexsha.clone().unwrap_or_default(),
        row.refcommit_upstream_hexsha.clone().unwrap_or_default(),
    ]
}

fn field<'a>(record: &'a StringRecord, index: usize) -> &'a str {
    record.get(index).unwrap_or("")
}

fn optional(value: &str) -> Option<String> {
    if value.is_empty() || value == "None" {
        None
    } else {
        Some(value.to_owned())
    }
}

fn parse_datetime(path: &Path, value: &str) -> Result<DateTime<FixedOffset>, StoreError> {
    DateTime::parse_from_rfc3339(value)
        // Files produced by older tooling carry a space separator.
        .or_else(|_| DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%:z"))
        .map_err(|err| StoreError::MalformedTimestamp {
            path: path.to_path_buf(),
            value: value.to_owned(),
            reason: err.to_string(),
        })
}
