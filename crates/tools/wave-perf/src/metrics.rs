//! Derived metrics: means, speedup, efficiency and cumulative savings.
//!
//! Everything here is a pure function of the loaded samples.

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::{PerfError, Result};
use crate::loader::{RunCollection, Sample, WaveDataset};

/// Arithmetic mean of the cycle counts, `None` for no samples.
pub fn mean_cycles(samples: &[Sample]) -> Option<f64> {
    mean_of(samples.iter().map(|s| s.cycles))
}

/// Arithmetic mean of the elapsed times, `None` for no samples.
pub fn mean_elapsed(samples: &[Sample]) -> Option<f64> {
    mean_of(samples.iter().map(|s| s.elapsed))
}

fn mean_of(values: impl ExactSizeIterator<Item = u64>) -> Option<f64> {
    let n = values.len();
    if n == 0 {
        return None;
    }
    let sum: u128 = values.map(u128::from).sum();
    Some(sum as f64 / n as f64)
}

/// Ratio of baseline mean cost to SIMD mean cost.
///
/// A zero or non-finite SIMD mean yields [`PerfError::DegenerateMetric`].
pub fn speedup(baseline_mean: f64, simd_mean: f64) -> Result<f64> {
    if !baseline_mean.is_finite() || !simd_mean.is_finite() {
        return Err(PerfError::DegenerateMetric {
            what: format!("speedup of non-finite means ({baseline_mean} / {simd_mean})"),
        });
    }
    if simd_mean == 0.0 {
        return Err(PerfError::DegenerateMetric {
            what: "speedup with a zero SIMD mean".into(),
        });
    }
    Ok(baseline_mean / simd_mean)
}

/// Speedup normalized by the wave count.
pub fn speedup_efficiency(speedup: f64, waves: NonZeroU32) -> f64 {
    speedup / f64::from(waves.get())
}

/// Running total of `baseline[i] - simd[i]`, left to right.
///
/// The result is as long as the shorter input; loaded datasets always have
/// equal-length sequences.
pub fn cumulative_savings(baseline: &[u64], simd: &[u64]) -> Vec<i128> {
    baseline
        .iter()
        .zip(simd)
        .scan(0i128, |total, (&b, &s)| {
            *total += i128::from(b) - i128::from(s);
            Some(*total)
        })
        .collect()
}

impl WaveDataset {
    /// Mean baseline cycles.
    ///
    /// A dataset never holds an empty sequence ([`WaveDataset::new`] rejects
    /// it), so the `0.0` fallback is unreachable.
    pub fn baseline_mean_cycles(&self) -> f64 {
        mean_cycles(self.baseline()).unwrap_or(0.0)
    }

    /// Mean SIMD cycles. Never empty, like [`Self::baseline_mean_cycles`].
    pub fn simd_mean_cycles(&self) -> f64 {
        mean_cycles(self.simd()).unwrap_or(0.0)
    }

    /// Baseline / SIMD mean cycles for this wave count.
    pub fn speedup(&self) -> Result<f64> {
        speedup(self.baseline_mean_cycles(), self.simd_mean_cycles()).map_err(|e| match e {
            PerfError::DegenerateMetric { what } => PerfError::DegenerateMetric {
                what: format!("{what} at {} waves", self.waves()),
            },
            other => other,
        })
    }

    /// Speedup divided by the wave count.
    pub fn speedup_efficiency(&self) -> Result<f64> {
        Ok(speedup_efficiency(self.speedup()?, self.waves()))
    }

    /// Cumulative cycles saved per iteration.
    pub fn cumulative_savings(&self) -> Vec<i128> {
        cumulative_savings(&self.baseline_cycles(), &self.simd_cycles())
    }
}

/// Distribution of one cycle series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    /// Minimum cycles.
    pub min: u64,
    /// Maximum cycles.
    pub max: u64,
    /// Median cycles.
    pub median: u64,
    /// Mean cycles.
    pub mean: f64,
    /// Sample standard deviation (`n - 1` denominator).
    pub stddev: f64,
    /// Number of samples.
    pub count: usize,
}

impl SeriesStats {
    /// Compute statistics, `None` for an empty series.
    pub fn from_cycles(cycles: &[u64]) -> Option<Self> {
        let n = cycles.len();
        if n == 0 {
            return None;
        }

        let mut sorted = cycles.to_vec();
        sorted.sort_unstable();

        let min = sorted[0];
        let max = sorted[n - 1];
        let median = if n % 2 == 0 {
            let (lo, hi) = (sorted[n / 2 - 1], sorted[n / 2]);
            lo + (hi - lo) / 2
        } else {
            sorted[n / 2]
        };
        let mean = mean_of(cycles.iter().copied())?;
        let stddev = if n > 1 {
            let var_sum: f64 = cycles
                .iter()
                .map(|&c| {
                    let d = c as f64 - mean;
                    d * d
                })
                .sum();
            (var_sum / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        Some(Self {
            min,
            max,
            median,
            mean,
            stddev,
            count: n,
        })
    }
}

/// Everything derived for one wave count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaveSummary {
    /// Wave count.
    pub waves: u32,
    /// Baseline cycle distribution.
    pub baseline: SeriesStats,
    /// SIMD cycle distribution.
    pub simd: SeriesStats,
    /// Mean baseline elapsed time.
    pub baseline_mean_elapsed: f64,
    /// Mean SIMD elapsed time.
    pub simd_mean_elapsed: f64,
    /// Baseline / SIMD mean cycles.
    pub speedup: f64,
    /// Speedup / wave count.
    pub speedup_efficiency: f64,
    /// Total cycles saved over all iterations.
    pub cycles_saved: i128,
}

/// Summarize every wave in ascending wave order.
pub fn summarize(runs: &RunCollection) -> Result<Vec<WaveSummary>> {
    runs.iter().map(summarize_wave).collect()
}

fn summarize_wave(ds: &WaveDataset) -> Result<WaveSummary> {
    let empty = || PerfError::DegenerateMetric {
        what: format!("no samples at {} waves", ds.waves()),
    };
    let baseline = SeriesStats::from_cycles(&ds.baseline_cycles()).ok_or_else(empty)?;
    let simd = SeriesStats::from_cycles(&ds.simd_cycles()).ok_or_else(empty)?;
    let speedup = ds.speedup()?;

    Ok(WaveSummary {
        waves: ds.waves().get(),
        baseline_mean_elapsed: mean_elapsed(ds.baseline()).unwrap_or(0.0),
        simd_mean_elapsed: mean_elapsed(ds.simd()).unwrap_or(0.0),
        speedup,
        speedup_efficiency: speedup_efficiency(speedup, ds.waves()),
        cycles_saved: ds.cumulative_savings().last().copied().unwrap_or(0),
        baseline,
        simd,
    })
}
