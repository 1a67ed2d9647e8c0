use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fixgap_missing::{Blacklist, find_missing};
use fixgap_store::read_dataset;

use crate::report::{self, ReportFormat, parse_report_format};

#[derive(Debug, Args)]
pub struct MissingArgs {
    /// Dataset of the branch checked for missing fixes
    pub csv1: PathBuf,

    /// Dataset of the branch fixes are taken from
    pub csv2: PathBuf,

    /// Text file of commit ids to leave out of the report
    #[arg(long)]
    pub blacklist: Option<PathBuf>,

    /// Output CSV file
    #[arg(long, default_value = "missing.csv")]
    pub out: PathBuf,

    /// Report format: table or json
    #[arg(long, default_value = "table", value_parser = parse_report_format)]
    pub output: ReportFormat,
}

pub fn run(args: &MissingArgs, out: &mut dyn Write) -> Result<()> {
    // A bad blacklist path must fail before any correlation work.
    let blacklist = args
        .blacklist
        .as_deref()
        .map(Blacklist::from_path)
        .transpose()?;

    writeln!(out, "[+] Reading input csv files, this might take a few minutes")?;
    let target = read_dataset(&args.csv1)
        .with_context(|| format!("failed to read {}", args.csv1.display()))?;
    let reference = read_dataset(&args.csv2)
        .with_context(|| format!("failed to read {}", args.csv2.display()))?;

    let candidates = find_missing(&target, &reference, blacklist.as_ref());
    report::emit(
        &candidates,
        &report::display_name(&args.csv1),
        &report::display_name(&args.csv2),
        &args.out,
        args.output,
        out,
    )
}
