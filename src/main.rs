//! Command-line interface for the FIT-to-Parquet converter.

use anyhow::Result;
use clap::Parser;
use fit_parquet::{Config, ConversionStats, FitTransformer};
use log::{error, info, LevelFilter};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Convert FIT activity files to Parquet format",
    long_about = "Converts FIT binary activity recordings to Apache Parquet tables.\n\n\
                  The output column set is driven by a parquet_config-style parameter file; \
                  without one, every column is enabled and timestamps use the Unix epoch."
)]
struct Args {
    /// Input FIT file
    #[arg(value_name = "FIT_FILE")]
    input: String,

    /// Output Parquet file
    #[arg(value_name = "PARQUET_FILE")]
    output: String,

    /// Optional parameter file (`key : value` lines)
    #[arg(short, long, value_name = "FILE")]
    config: Option<String>,
}

fn run(args: &Args) -> Result<ConversionStats> {
    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut transformer = FitTransformer::new(config);
    Ok(transformer.convert(&args.input, &args.output)?)
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help/--version exit clean; anything else is a usage failure.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let start = Instant::now();
    match run(&args) {
        Ok(stats) => {
            info!("{}", stats.summary());
            info!(
                "data transformation completed in {:.3} sec",
                start.elapsed().as_secs_f64()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
