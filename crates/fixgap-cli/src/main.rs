use std::process::ExitCode;

use clap::Parser;
use fixgap_cli::Cli;

fn main() -> ExitCode {
    fixgap_cli::init_tracing();
    let cli = Cli::parse();
    match fixgap_cli::run(cli, &mut std::io::stdout()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
