//! Command-line runner for album-check
//!
//! Usage:
//!   `album-check [OPTIONS] [FILTER]`
//!
//! Environment variables:
//!   ALBUM_CHECK_OUTPUT   - Output tree to verify (defaults to `public/`)
//!   ALBUM_CHECK_FIXTURES - Fixture table to use instead of the built-in one

use album_check::runner::{list_checks, print_report};
use album_check::{FixtureTable, Overrides, ResolvedConfig, RunOptions, collect_checks, run_checks};
use camino::Utf8PathBuf;
use clap::Parser;
use eyre::Result;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Verify the generated HTML of a photo album site
#[derive(Debug, Parser)]
#[command(name = "album-check", version)]
struct Args {
    /// Root of the generated output tree
    #[arg(short, long, env = "ALBUM_CHECK_OUTPUT")]
    output: Option<Utf8PathBuf>,

    /// Fixture table (YAML) to use instead of the built-in one
    #[arg(long, env = "ALBUM_CHECK_FIXTURES")]
    fixtures: Option<Utf8PathBuf>,

    /// Only run checks whose name contains NAME
    #[arg(short, long = "filter", value_name = "NAME")]
    filter_flag: Option<String>,

    /// Same as --filter
    #[arg(value_name = "FILTER", conflicts_with = "filter_flag")]
    filter: Option<String>,

    /// List all checks without running them
    #[arg(short, long)]
    list: bool,

    /// Maximum number of checks running at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Per-check timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("album_check=info".parse()?),
        )
        .init();

    let args = Args::parse();
    let filter = args.filter_flag.or(args.filter);

    let config = ResolvedConfig::discover(Overrides {
        output: args.output,
        fixtures: args.fixtures,
        timeout: args.timeout.map(Duration::from_secs),
        jobs: args.jobs,
    })?;

    let table = match &config.fixtures {
        Some(path) => FixtureTable::load(path)?,
        None => FixtureTable::builtin()?,
    };
    let checks = collect_checks(&table);

    if args.list {
        list_checks(&checks, filter.as_deref());
        return Ok(());
    }

    println!();
    println!("{} {}", "Checking".bold(), config.output_dir);
    println!();

    let options = RunOptions::from_config(&config, filter);
    let runtime = tokio::runtime::Runtime::new()?;
    let summary = runtime.block_on(run_checks(checks, &options));

    print_report(&summary);

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
