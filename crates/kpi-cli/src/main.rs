//! `kpi`: PDL release comparison generator and reader.

use clap::{ColorChoice, Parser};
use kpi_cli::logging::{LogConfig, LogFormat, init_logging};
use std::io::{self, IsTerminal};
use tracing::level_filters::LevelFilter;

mod cli;
mod commands;
mod summary;

use crate::cli::{Cli, Command};
use crate::commands::{
    load_config, run_generate, run_report, run_sql, run_tables, run_topics,
};
use crate::summary::{print_dashboard, print_generation_summary};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = load_config(cli.config.as_deref())?;
    let code = match &cli.command {
        Command::Generate(args) => {
            let report = run_generate(args, &config)?;
            print_generation_summary(&report);
            if report.has_failures() { 1 } else { 0 }
        }
        Command::Report(args) => {
            let dashboard = run_report(args, &config)?;
            print_dashboard(&dashboard);
            if dashboard.error_count() > 0 { 1 } else { 0 }
        }
        Command::Sql(args) => {
            run_sql(args, &config)?;
            0
        }
        Command::Tables(args) => {
            run_tables(args, &config)?;
            0
        }
        Command::Topics => {
            run_topics(&config)?;
            0
        }
    };
    Ok(code)
}

/// Logging settings from CLI flags. `--log-level` wins over `-v`/`-q`, and
/// either disables `RUST_LOG`.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        level_filter: cli
            .log_level
            .map_or_else(|| cli.verbosity.tracing_level_filter(), LevelFilter::from),
        use_env_filter: !(cli.verbosity.is_present() || cli.log_level.is_some()),
        format: LogFormat::from(cli.log_format),
        log_file: cli.log_file.clone(),
        with_ansi,
        ..LogConfig::default()
    }
}
