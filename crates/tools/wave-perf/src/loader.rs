//! Text result file loading.
//!
//! Each wave count has its own file named `{w}waves` in the data directory.
//! Every line holds `elapsed_time cpu_cycles`; lines alternate between a
//! baseline sample and the matching SIMD sample, starting with baseline.

use std::collections::BTreeMap;
use std::io;
use std::num::NonZeroU32;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PerfError, Result};

/// One measured benchmark iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Sample {
    /// Elapsed time, in the benchmark's time units.
    pub elapsed: u64,
    /// CPU cycles spent.
    pub cycles: u64,
}

/// Inclusive range of wave counts, `1 <= first <= last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveRange {
    first: NonZeroU32,
    last: NonZeroU32,
}

impl WaveRange {
    /// Build a range, rejecting `first == 0` and empty ranges.
    pub fn new(first: u32, last: u32) -> Result<Self> {
        match (NonZeroU32::new(first), NonZeroU32::new(last)) {
            (Some(f), Some(l)) if f <= l => Ok(Self { first: f, last: l }),
            _ => Err(PerfError::InvalidWaveRange { first, last }),
        }
    }

    /// First wave count.
    pub fn first(&self) -> NonZeroU32 {
        self.first
    }

    /// Last wave count (inclusive).
    pub fn last(&self) -> NonZeroU32 {
        self.last
    }

    /// Iterate the wave counts in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NonZeroU32> + use<> {
        (self.first.get()..=self.last.get()).filter_map(NonZeroU32::new)
    }
}

impl TryFrom<RangeInclusive<u32>> for WaveRange {
    type Error = PerfError;

    fn try_from(range: RangeInclusive<u32>) -> Result<Self> {
        Self::new(*range.start(), *range.end())
    }
}

impl std::fmt::Display for WaveRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.first, self.last)
    }
}

/// Baseline and SIMD samples for a single wave count.
#[derive(Debug, Clone, PartialEq)]
pub struct WaveDataset {
    waves: NonZeroU32,
    baseline: Vec<Sample>,
    simd: Vec<Sample>,
}

impl WaveDataset {
    /// Pair up two sample sequences.
    ///
    /// Both sequences must be non-empty and of equal length. `origin` is only
    /// used in error messages.
    pub fn new(
        waves: NonZeroU32,
        baseline: Vec<Sample>,
        simd: Vec<Sample>,
        origin: &Path,
    ) -> Result<Self> {
        if baseline.is_empty() && simd.is_empty() {
            return Err(PerfError::EmptyWaveFile {
                path: origin.to_path_buf(),
            });
        }
        if baseline.len() != simd.len() {
            return Err(PerfError::UnpairedSample {
                path: origin.to_path_buf(),
                baseline: baseline.len(),
                simd: simd.len(),
            });
        }
        Ok(Self {
            waves,
            baseline,
            simd,
        })
    }

    /// Wave count this dataset was measured at.
    pub fn waves(&self) -> NonZeroU32 {
        self.waves
    }

    /// Baseline samples in iteration order.
    pub fn baseline(&self) -> &[Sample] {
        &self.baseline
    }

    /// SIMD samples in iteration order.
    pub fn simd(&self) -> &[Sample] {
        &self.simd
    }

    /// Number of iterations (equal for both sequences).
    pub fn iterations(&self) -> usize {
        self.baseline.len()
    }

    /// Baseline cycle counts in iteration order.
    pub fn baseline_cycles(&self) -> Vec<u64> {
        self.baseline.iter().map(|s| s.cycles).collect()
    }

    /// SIMD cycle counts in iteration order.
    pub fn simd_cycles(&self) -> Vec<u64> {
        self.simd.iter().map(|s| s.cycles).collect()
    }
}

/// All loaded wave datasets, keyed and iterated by ascending wave count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunCollection {
    runs: BTreeMap<u32, WaveDataset>,
}

impl RunCollection {
    /// Collect datasets; a later dataset replaces an earlier one with the same wave count.
    pub fn from_datasets(datasets: impl IntoIterator<Item = WaveDataset>) -> Self {
        let runs = datasets
            .into_iter()
            .map(|d| (d.waves().get(), d))
            .collect();
        Self { runs }
    }

    /// Dataset for wave count `waves`, if loaded.
    pub fn get(&self, waves: u32) -> Option<&WaveDataset> {
        self.runs.get(&waves)
    }

    /// Iterate datasets in ascending wave order.
    pub fn iter(&self) -> impl Iterator<Item = &WaveDataset> {
        self.runs.values()
    }

    /// Loaded wave counts in ascending order.
    pub fn wave_counts(&self) -> Vec<u32> {
        self.runs.keys().copied().collect()
    }

    /// Number of loaded wave counts.
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns `true` if nothing was loaded.
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// File name holding the results for `waves`.
pub fn wave_file_name(waves: u32) -> String {
    format!("{waves}waves")
}

/// Load `{w}waves` for every `w` in `range` from `data_dir`.
///
/// Stops at the first missing or malformed file; no partial collection is
/// returned.
pub fn load_runs(data_dir: &Path, range: WaveRange) -> Result<RunCollection> {
    let mut datasets = Vec::new();
    for waves in range.iter() {
        let path = data_dir.join(wave_file_name(waves.get()));
        let text = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => PerfError::MissingInputFile { path: path.clone() },
            _ => PerfError::io(&path, e),
        })?;
        datasets.push(parse_wave_file(waves, &text, &path)?);
    }
    Ok(RunCollection::from_datasets(datasets))
}

/// Parse the contents of one result file.
///
/// Odd lines (1st, 3rd, ...) become baseline samples, even lines SIMD
/// samples. The first malformed line fails the whole file.
pub fn parse_wave_file(waves: NonZeroU32, text: &str, origin: &Path) -> Result<WaveDataset> {
    let mut baseline = Vec::new();
    let mut simd = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let sample = parse_sample(line).map_err(|reason| PerfError::MalformedSample {
            path: origin.to_path_buf(),
            line: idx + 1,
            reason,
        })?;
        if idx % 2 == 0 {
            baseline.push(sample);
        } else {
            simd.push(sample);
        }
    }

    WaveDataset::new(waves, baseline, simd, origin)
}

/// Parse `elapsed cycles` from one line.
fn parse_sample(line: &str) -> std::result::Result<Sample, String> {
    let mut tokens = line.split_whitespace();
    let (Some(elapsed), Some(cycles)) = (tokens.next(), tokens.next()) else {
        return Err(format!("expected two integers, got {:?}", line.trim()));
    };
    if let Some(extra) = tokens.next() {
        return Err(format!("unexpected trailing token {extra:?}"));
    }
    Ok(Sample {
        elapsed: parse_field(elapsed, "elapsed time")?,
        cycles: parse_field(cycles, "cpu cycles")?,
    })
}

fn parse_field(token: &str, what: &str) -> std::result::Result<u64, String> {
    token
        .parse::<u64>()
        .map_err(|e| format!("invalid {what} {token:?}: {e}"))
}

/// Where a dataset came from when it was not read from disk.
pub fn in_memory_origin(waves: u32) -> PathBuf {
    PathBuf::from(format!("<memory>/{}", wave_file_name(waves)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[test]
    fn file_name_format() {
        assert_eq!(wave_file_name(1), "1waves");
        assert_eq!(wave_file_name(12), "12waves");
    }

    #[test]
    fn lines_alternate_baseline_then_simd() {
        let text = "100 1000\n40 400\n110 1100\n45 450\n";
        let ds = parse_wave_file(w(3), text, &in_memory_origin(3)).unwrap();
        assert_eq!(ds.waves().get(), 3);
        assert_eq!(ds.baseline_cycles(), vec![1000, 1100]);
        assert_eq!(ds.simd_cycles(), vec![400, 450]);
        assert_eq!(
            ds.baseline()[1],
            Sample {
                elapsed: 110,
                cycles: 1100
            }
        );
        assert_eq!(ds.iterations(), 2);
    }

    #[test]
    fn tolerates_extra_whitespace_and_crlf() {
        let text = "  7\t70 \r\n8   80\r\n";
        let ds = parse_wave_file(w(1), text, &in_memory_origin(1)).unwrap();
        assert_eq!(ds.baseline_cycles(), vec![70]);
        assert_eq!(ds.simd_cycles(), vec![80]);
    }

    #[test]
    fn odd_line_count_is_unpaired() {
        let text = "1 10\n2 20\n3 30\n";
        let err = parse_wave_file(w(2), text, &in_memory_origin(2)).unwrap_err();
        assert!(
            matches!(err, PerfError::UnpairedSample { baseline: 2, simd: 1, .. }),
            "unexpected error: {err}"
        );
    }

    #[test]
    fn empty_file_is_rejected() {
        let err = parse_wave_file(w(1), "", &in_memory_origin(1)).unwrap_err();
        assert!(matches!(err, PerfError::EmptyWaveFile { .. }));
    }

    #[test]
    fn malformed_lines_report_line_number() {
        let cases = [
            ("1 10\n2\n", 2),
            ("1 10\n2 20 30\n", 2),
            ("x 10\n2 20\n", 1),
            ("1 -10\n2 20\n", 1),
            ("1 10\n\n3 30\n4 40\n", 2),
        ];
        for (text, expected_line) in cases {
            match parse_wave_file(w(1), text, &in_memory_origin(1)) {
                Err(PerfError::MalformedSample { line, .. }) => {
                    assert_eq!(line, expected_line, "input {text:?}");
                }
                other => panic!("expected MalformedSample for {text:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn wave_range_rejects_zero_and_reversed() {
        assert!(WaveRange::new(0, 8).is_err());
        assert!(WaveRange::new(5, 4).is_err());
        let range = WaveRange::try_from(1..=8).unwrap();
        assert_eq!(range.iter().map(NonZeroU32::get).collect::<Vec<_>>(), (1..=8).collect::<Vec<_>>());
        assert_eq!(range.to_string(), "1..=8");
    }

    #[test]
    fn collection_iterates_in_wave_order() {
        let make = |n: u32| {
            parse_wave_file(w(n), "1 10\n1 5\n", &in_memory_origin(n)).unwrap()
        };
        let runs = RunCollection::from_datasets([make(4), make(1), make(2)]);
        assert_eq!(runs.wave_counts(), vec![1, 2, 4]);
        assert_eq!(runs.len(), 3);
        assert!(runs.get(3).is_none());
    }
}
