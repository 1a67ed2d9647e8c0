use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Args;
use fixgap_config::load_audit_config;
use fixgap_core::{GitContext, XrefDataset};
use fixgap_missing::{Blacklist, find_missing};
use fixgap_store::{read_dataset, write_dataset};

use crate::report::{self, ReportFormat};

#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Git repository audited for missing fixes
    #[arg(long)]
    pub stable: PathBuf,

    /// Git repository fixes are taken from
    #[arg(long)]
    pub other: PathBuf,

    /// Destination directory for datasets and reports
    #[arg(long, default_value = "./missing_fixes")]
    pub dst: PathBuf,

    /// Audit checklist TOML file
    #[arg(long)]
    pub config: PathBuf,

    /// Remove an existing destination directory instead of failing
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &AuditArgs, out: &mut dyn Write) -> Result<()> {
    let config = load_audit_config(&args.config)
        .with_context(|| format!("failed to load {}", args.config.display()))?;
    let stable = GitContext::open(&args.stable)
        .with_context(|| format!("failed to open repository {}", args.stable.display()))?;
    let other = GitContext::open(&args.other)
        .with_context(|| format!("failed to open repository {}", args.other.display()))?;

    // Every revision and blacklist in the checklist is validated before
    // any extraction starts, so a typo late in the checklist cannot
    // waste an hour of history scanning.
    let config_dir = args.config.parent().unwrap_or(Path::new("."));
    let mut blacklists = Vec::with_capacity(config.check.len());
    for item in &config.check {
        stable.verify_range(&item.stable_rev).with_context(|| {
            format!("in repository {}", args.stable.display())
        })?;
        other.verify_range(&item.other_rev).with_context(|| {
            format!("in repository {}", args.other.display())
        })?;
        blacklists.push(
            item.blacklist
                .as_deref()
                .map(|name| Blacklist::from_path(&config_dir.join(name)))
                .transpose()?,
        );
    }

    if args.dst.exists() {
        if !args.force {
            bail!(
                "destination {} already exists, pass --force to remove it",
                args.dst.display()
            );
        }
        fs::remove_dir_all(&args.dst)
            .with_context(|| format!("failed to remove {}", args.dst.display()))?;
    }
    fs::create_dir_all(&args.dst)
        .with_context(|| format!("failed to create {}", args.dst.display()))?;

    writeln!(out, "[+] Reading commit history, this might take a few minutes")?;
    for (item, blacklist) in config.check.iter().zip(&blacklists) {
        let stable_out = args.dst.join(&item.stable_out);
        let other_out = args.dst.join(&item.other_out);
        let missing_out = args.dst.join(&item.missing_out);

        let target = dataset_for(&stable, &item.stable_rev, &stable_out)?;
        let reference = dataset_for(&other, &item.other_rev, &other_out)?;

        let candidates = find_missing(&target, &reference, blacklist.as_ref());
        report::emit(
            &candidates,
            &item.stable_out,
            &item.other_out,
            &missing_out,
            ReportFormat::Table,
            out,
        )?;
        writeln!(out)?;
    }

    writeln!(out, "[+] Done, for more details, see: {}", args.dst.display())?;
    Ok(())
}

/// Extracts a dataset, or reuses a file an earlier checklist item
/// already produced. Checklist items commonly share their reference
/// dataset, which is only worth scanning once per run.
fn dataset_for(context: &GitContext, range: &str, path: &Path) -> Result<XrefDataset> {
    if path.is_file() {
        tracing::info!(path = %path.display(), "reusing existing dataset");
        return read_dataset(path).with_context(|| format!("failed to read {}", path.display()));
    }
    let dataset = fixgap_xref::extract(context, range)
        .with_context(|| format!("failed to scan revision range {range}"))?;
    write_dataset(&dataset, path).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(dataset)
}
