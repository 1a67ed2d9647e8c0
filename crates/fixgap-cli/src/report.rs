//! Report rendering shared by the `missing` and `audit` subcommands.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use fixgap_core::MissingFixCandidate;
use fixgap_store::write_report;

const ID_WIDTH: usize = 12;
const SUMMARY_WIDTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Table,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("invalid format '{other}', expected table or json")),
        }
    }
}

pub fn parse_report_format(value: &str) -> Result<ReportFormat, String> {
    value.parse()
}

pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Announces the result, persists the report and renders it.
///
/// An empty candidate list prints `No missing fixes` and writes
/// nothing, so a clean audit leaves no report file behind.
pub fn emit(
    candidates: &[MissingFixCandidate],
    target_name: &str,
    reference_name: &str,
    out_path: &Path,
    format: ReportFormat,
    out: &mut dyn Write,
) -> Result<()> {
    writeln!(
        out,
        "[+] {target_name} is missing the below commits based on commits in {reference_name}:"
    )?;
    if candidates.is_empty() {
        writeln!(out, "No missing fixes")?;
        return Ok(());
    }

    write_report(candidates, out_path)
        .with_context(|| format!("failed to write {}", out_path.display()))?;
    writeln!(out, "[+] Wrote: {}", out_path.display())?;

    match format {
        ReportFormat::Table => {
            writeln!(out)?;
            render_table(candidates, out)?;
            writeln!(out)?;
        }
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, candidates)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Plain aligned table with commit ids truncated to 12 characters and
/// summaries to 64.
pub fn render_table(candidates: &[MissingFixCandidate], out: &mut dyn Write) -> Result<()> {
    let headers = ["Missing_commit", "Missing_commit_summary", "Based_on_commit"];
    let rows: Vec<[String; 3]> = candidates
        .iter()
        .map(|candidate| {
            [
                truncate(candidate.missing_commit(), ID_WIDTH),
                truncate(&candidate.missing_commit_summary, SUMMARY_WIDTH),
                truncate(candidate.based_on_commit(), ID_WIDTH),
            ]
        })
        .collect();

    let mut widths = headers.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    write_table_line(out, &headers.map(String::from), &widths)?;
    let rules = widths.map(|width| "-".repeat(width));
    write_table_line(out, &rules, &widths)?;
    for row in &rows {
        write_table_line(out, row, &widths)?;
    }
    Ok(())
}

fn write_table_line(out: &mut dyn Write, cells: &[String; 3], widths: &[usize; 3]) -> Result<()> {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(out, "{}", line.trim_end())?;
    Ok(())
}

fn truncate(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}
