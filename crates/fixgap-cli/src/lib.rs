pub mod audit;
pub mod extract;
pub mod missing;
pub mod report;

use std::io::Write;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "fixgap", version, about = "Find fixes missing from a git branch")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a revision range and write its cross-reference dataset
    Extract(extract::ExtractArgs),
    /// Correlate two datasets and report missing fixes
    Missing(missing::MissingArgs),
    /// Run a configured checklist of extract/missing steps
    Audit(audit::AuditArgs),
}

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    match cli.command {
        Command::Extract(args) => extract::run(&args, out),
        Command::Missing(args) => missing::run(&args, out),
        Command::Audit(args) => audit::run(&args, out),
    }
}

/// Logs go to stderr so stdout stays machine-readable; RUST_LOG
/// overrides the default level.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
