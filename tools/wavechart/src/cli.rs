//! Command-line interface definitions for wavechart.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Baseline vs SIMD wave benchmark charts.
#[derive(Parser)]
#[command(name = "wavechart", version, about)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Shared input/output options.
    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options accepted by every subcommand.
#[derive(Args, Clone, Default)]
pub struct GlobalArgs {
    /// Configuration file (default: ./wavechart.toml if present).
    #[arg(long, short = 'c', global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the `{w}waves` result files.
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Directory the charts are written to.
    #[arg(long, global = true, value_name = "DIR")]
    pub graph_dir: Option<PathBuf>,

    /// First wave count to load.
    #[arg(long, global = true, value_name = "N")]
    pub first: Option<u32>,

    /// Last wave count to load (inclusive).
    #[arg(long, global = true, value_name = "N")]
    pub last: Option<u32>,

    /// TrueType font used for chart text.
    #[arg(long, global = true, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Only print errors.
    #[arg(long, short = 'q', global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print resolved configuration and phase timings.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Load results, print the summary and render every chart.
    Plot,
    /// Load results and print the summary without rendering.
    Summary(SummaryArgs),
}

/// Arguments for the `summary` subcommand.
#[derive(Args)]
pub struct SummaryArgs {
    /// Also write the per-wave summary as JSON.
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,
}
