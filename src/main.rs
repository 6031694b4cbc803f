//! structret
//!
//! Lists Go functions and methods that return a struct by value, including
//! structs reached through any chain of aliases and named types.

mod analysis;
mod frontend;
mod report;
mod types;
mod utils;

use std::io;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;

use analysis::{Pipeline, ScanConfig};
use report::{write_report, OutputFormat};

/// Find Go declarations returning struct values
#[derive(Parser, Debug)]
#[command(name = "structret")]
#[command(version)]
#[command(about = "List Go functions whose results are struct types")]
struct Cli {
    /// Root of the Go source tree
    #[arg(value_name = "DIR")]
    dir: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Ignore `_test.go` files
    #[arg(long)]
    skip_tests: bool,

    /// Directory name not to descend into (repeatable)
    #[arg(long = "skip-dir", value_name = "NAME")]
    skip_dirs: Vec<String>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {:#}", err);
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ScanConfig {
        skip_tests: cli.skip_tests,
        skip_dirs: cli.skip_dirs,
    };
    let report = Pipeline::new(config).run(&cli.dir)?;

    let stdout = io::stdout();
    write_report(cli.format, &report, &mut stdout.lock()).context("writing report")?;
    Ok(())
}
