use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use fixgap_core::GitContext;
use fixgap_store::write_dataset;

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Revision range to scan, e.g. v5.4^..origin/linux-5.4.y
    pub rev: String,

    /// Git repository to read
    #[arg(long, default_value = ".")]
    pub git_dir: PathBuf,

    /// Output CSV file
    #[arg(long, default_value = "xrefdb.csv")]
    pub out: PathBuf,
}

pub fn run(args: &ExtractArgs, out: &mut dyn Write) -> Result<()> {
    let context = GitContext::open(&args.git_dir)
        .with_context(|| format!("failed to open repository {}", args.git_dir.display()))?;

    writeln!(out, "[+] Reading commit history, this might take a few minutes")?;
    let dataset = fixgap_xref::extract(&context, &args.rev)
        .with_context(|| format!("failed to scan revision range {}", args.rev))?;

    write_dataset(&dataset, &args.out)
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    writeln!(out, "[+] Wrote file: {}", args.out.display())?;
    Ok(())
}
