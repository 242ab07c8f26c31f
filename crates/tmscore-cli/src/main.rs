mod cli;
mod config;
mod error;
mod logging;

use crate::cli::Cli;
use crate::error::Result;
use clap::Parser;
use tmscoring::workflows::superpose;
use tracing::{debug, info};

fn main() {
    if let Err(e) = run_app() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    info!("tmscore v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    let config = config::resolve(&cli)?;
    let report = superpose::run(&cli.structure_1, &cli.structure_2, &config)?;

    println!("TM-score = {:.6}", report.tm_score);
    println!("RMSD     = {:.6}", report.rmsd);
    println!("Matched  = {} atom pairs (N = {})", report.matched, report.n);
    println!("Transform matrix:");
    for row in 0..4 {
        println!(
            "  [{:>10.5} {:>10.5} {:>10.5} {:>10.5}]",
            report.matrix[(row, 0)],
            report.matrix[(row, 1)],
            report.matrix[(row, 2)],
            report.matrix[(row, 3)],
        );
    }
    if let Some(output) = &config.output {
        println!("Transformed copy written to {}", output.display());
    }

    Ok(())
}
