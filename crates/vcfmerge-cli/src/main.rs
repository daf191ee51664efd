mod error;
mod merge;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::error::{exit_code_for, report_error, EXIT_FAILURE};

#[derive(Debug, Parser)]
#[command(
    name = "vcfmerge",
    version,
    about = "Merge vCard contacts with strict phone normalization."
)]
struct Cli {
    /// Path to input .vcf file
    input: PathBuf,
    /// Output file path [default: merged_contacts.vcf]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// ISO country code used for numbers without a leading + [default: DE]
    #[arg(short, long)]
    country: Option<String>,
    /// Config file [default: $XDG_CONFIG_HOME/vcfmerge/config.toml]
    #[arg(long)]
    config: Option<PathBuf>,
    /// Print a JSON report instead of the summary line
    #[arg(long)]
    json: bool,
    /// Debug logging and full error chains on stderr
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    if std::env::args_os().len() <= 1 {
        let _ = Cli::command().write_help(&mut io::stderr());
        return ExitCode::from(EXIT_FAILURE);
    }

    let cli = Cli::parse();
    let verbose = cli.verbose;
    init_logging(verbose);
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, verbose);
            exit_code_for(&err)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        input,
        output,
        country,
        config,
        json,
        verbose: _,
    } = cli;

    merge::merge_file(merge::MergeArgs {
        input,
        output,
        country,
        config,
        json,
    })
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .try_init();
}
