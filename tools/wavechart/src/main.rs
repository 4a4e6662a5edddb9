//! Baseline vs SIMD wave benchmark charts.
//!
//! Reads one `{w}waves` result file per wave count, prints a per-wave
//! summary and renders the standard PNG chart set.
//!
//! Pipeline: resolve config → register font (plot only) → load results →
//!           summarize → plan charts → render.

mod cli;
mod config;
mod verbose;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use wave_perf::chart::{self, BitmapRenderer, ChartRequest, ChartSink};
use wave_perf::{RunCollection, fonts, loader, metrics, output};

use crate::config::ResolvedConfig;
use crate::verbose::{Timer, Verbosity, dprintln, vprintln};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    verbose::set(Verbosity::from_flags(cli.global.quiet, cli.global.verbose));

    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    let config = config::load_config(&cli.global, &cwd)?;
    if verbose::current() == Verbosity::Verbose {
        config::print_resolved(&config);
    }

    match cli.command {
        cli::Command::Plot => cmd_plot(&config),
        cli::Command::Summary(ref args) => cmd_summary(&config, args),
    }
}

// ===========================================================================
// Commands
// ===========================================================================

/// Load, summarize and render every chart.
fn cmd_plot(config: &ResolvedConfig) -> Result<()> {
    // Fail before touching any data if chart text cannot be drawn.
    let font = fonts::register_font(config.font.as_deref())
        .context("chart text needs a TrueType font (use --font or [render] font)")?;
    vprintln!("Font: {}", font.display());

    let runs = load(config)?;
    print_summary(&runs)?;

    let requests = chart::plan_charts(&runs)?;
    let _t = Timer::start(format!("render {} charts", requests.len()));
    let mut sink = Announce(BitmapRenderer);
    let written = chart::render_all(&requests, &config.graph_dir, &mut sink)
        .with_context(|| format!("rendering charts into {}", config.graph_dir.display()))?;

    dprintln!(
        "\n{} charts written to {}",
        written.len(),
        config.graph_dir.display()
    );
    Ok(())
}

/// Load and summarize without rendering.
fn cmd_summary(config: &ResolvedConfig, args: &cli::SummaryArgs) -> Result<()> {
    let runs = load(config)?;
    let summaries = print_summary(&runs)?;

    if let Some(ref path) = args.json {
        output::write_summary_json(&summaries, path)?;
        dprintln!("Summary written to {}", path.display());
    }
    Ok(())
}

// ===========================================================================
// Helpers
// ===========================================================================

/// Load every configured wave file.
fn load(config: &ResolvedConfig) -> Result<RunCollection> {
    dprintln!(
        "Loading waves {} from {}...",
        config.waves,
        config.data_dir.display()
    );
    let _t = Timer::start("load");
    let runs = loader::load_runs(&config.data_dir, config.waves)?;

    for ds in runs.iter() {
        vprintln!(
            "  {}: {} iterations",
            loader::wave_file_name(ds.waves().get()),
            ds.iterations()
        );
    }
    Ok(runs)
}

/// Summarize the runs and print the table unless quiet.
fn print_summary(runs: &RunCollection) -> Result<Vec<metrics::WaveSummary>> {
    let summaries = metrics::summarize(runs)?;
    if verbose::current() > Verbosity::Quiet {
        output::print_summary_table(&summaries);
    }
    Ok(summaries)
}

/// Prints each chart path as soon as the wrapped sink has written it.
struct Announce<S>(S);

impl<S: ChartSink> ChartSink for Announce<S> {
    fn render(&mut self, graph_dir: &Path, request: &ChartRequest) -> wave_perf::Result<PathBuf> {
        let path = self.0.render(graph_dir, request)?;
        dprintln!("Generated: {}", path.display());
        Ok(path)
    }
}
