//! `sieve`: republish only the items of a feed that are free to read.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use engine_logging::{engine_debug, engine_error};

mod cli;
mod config;
mod logging;
mod run;

use cli::Args;
use config::SieveConfig;

fn main() -> ExitCode {
    // Parse before logging so --help works without logs.
    let args = Args::parse();

    logging::initialize(
        logging::LogDestination::from_log_file(args.log_file.as_deref()),
        logging::level_for(args.verbose, args.quiet),
    );
    engine_debug!("CLI arguments parsed: {:?}", args);

    match run_app(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            engine_error!("run failed: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run_app(args: &Args) -> Result<()> {
    let mut config = SieveConfig::load(args.config.as_deref())?;
    config.apply_args(args);
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let report = runtime.block_on(run::execute(&config))?;

    if args.report_json {
        let json = serde_json::to_string_pretty(&report).context("encoding run report")?;
        println!("{json}");
    }
    Ok(())
}
