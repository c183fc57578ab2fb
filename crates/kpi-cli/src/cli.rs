//! CLI argument definitions for the `kpi` binary.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use kpi_cli::logging::LogFormat;
use kpi_model::{Field, TableKind, Topic};
use kpi_sql::RankSource;
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "kpi",
    version,
    about = "PDL release comparison - generate and read KPI tables",
    long_about = "Compare two releases of the PDL dataset.\n\n\
                  `generate` builds KPI, comparison and top-N benchmark tables in the\n\
                  warehouse; `report` reads them back as a dashboard."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Comparison configuration (TOML). Built-in defaults when omitted.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create KPI and comparison tables for a topic.
    Generate(GenerateArgs),

    /// Read the tables of a topic back as a dashboard.
    Report(ReportArgs),

    /// Print the SQL of a topic run without executing it.
    Sql(SqlArgs),

    /// List the fully-qualified tables a topic run produces.
    Tables(TablesArgs),

    /// List topics and their fields.
    Topics,
}

/// Fields, countries and table kinds shared by every planning command.
#[derive(Args)]
pub struct ScopeArgs {
    /// Topic to process.
    #[arg(long = "topic", value_name = "TOPIC")]
    pub topic: Topic,

    /// Field to process (repeatable). Defaults to every field of the topic.
    #[arg(long = "field", value_name = "FIELD")]
    pub fields: Vec<Field>,

    /// Country scope (repeatable). Unscoped tables when omitted.
    #[arg(long = "country", value_name = "COUNTRY", conflicts_with = "all_countries")]
    pub countries: Vec<String>,

    /// Scope to every configured country.
    #[arg(long = "all-countries")]
    pub all_countries: bool,

    /// Table kinds to produce (repeatable). Defaults to all three.
    #[arg(long = "kind", value_enum)]
    pub kinds: Vec<TableKindArg>,

    /// Values kept in top-N benchmark tables (default from config).
    #[arg(long = "top-n", value_name = "N")]
    pub top_n: Option<NonZeroUsize>,

    /// Source whose counts rank top-N tables.
    #[arg(long = "rank-by", value_enum, default_value = "benchmark")]
    pub rank_by: RankByArg,
}

#[derive(Args)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,

    /// Append statements to `<DIR>/<topic>.sql` instead of executing them.
    #[arg(long = "dry-run", value_name = "DIR")]
    pub dry_run: Option<PathBuf>,
}

#[derive(Args)]
pub struct SqlArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Args)]
pub struct TablesArgs {
    #[command(flatten)]
    pub scope: ScopeArgs,
}

#[derive(Args)]
pub struct ReportArgs {
    /// Topic to read.
    #[arg(long = "topic", value_name = "TOPIC")]
    pub topic: Topic,

    /// Country scope. Unscoped tables when omitted.
    #[arg(long = "country", value_name = "COUNTRY")]
    pub country: Option<String>,

    /// Field panel to show (repeatable). Defaults to the topic's first field.
    #[arg(long = "field", value_name = "FIELD")]
    pub fields: Vec<Field>,

    /// Values shown in the counts and percentages panels (default from config).
    #[arg(long = "top-n", value_name = "N")]
    pub top_n: Option<NonZeroUsize>,

    /// Read tables from `<DIR>/<TABLE>.csv` instead of the warehouse.
    #[arg(long = "snapshot-dir", value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Write each panel as long-form CSV files to this directory.
    #[arg(long = "export", value_name = "DIR")]
    pub export: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableKindArg {
    Kpi,
    Comp,
    Complc,
}

impl From<TableKindArg> for TableKind {
    fn from(arg: TableKindArg) -> Self {
        match arg {
            TableKindArg::Kpi => TableKind::Kpi,
            TableKindArg::Comp => TableKind::Comparison,
            TableKindArg::Complc => TableKind::BenchmarkComparison,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RankByArg {
    Base,
    New,
    Benchmark,
}

impl From<RankByArg> for RankSource {
    fn from(arg: RankByArg) -> Self {
        match arg {
            RankByArg::Base => RankSource::Base,
            RankByArg::New => RankSource::New,
            RankByArg::Benchmark => RankSource::Benchmark,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}
