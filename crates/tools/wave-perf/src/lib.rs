//! Baseline vs SIMD wave benchmark analysis.
//!
//! Loads per-wave-count result files (`{w}waves`, alternating baseline and
//! SIMD samples), derives mean cycles, speedup, speedup efficiency and
//! cumulative savings, prints summaries and renders the standard chart set
//! as PNG images.
//!
//! Pipeline: [`loader::load_runs`] → [`metrics::summarize`] /
//! [`chart::plan_charts`] → [`chart::render_all`].

pub mod chart;
pub mod error;
pub mod fonts;
pub mod loader;
pub mod metrics;
pub mod output;

pub use error::{PerfError, Result};
pub use loader::{RunCollection, Sample, WaveDataset, WaveRange};
