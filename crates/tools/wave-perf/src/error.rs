//! Error types for wave benchmark analysis.

use std::io;
use std::path::PathBuf;

/// Errors that can occur while loading, analyzing or charting wave results.
#[derive(thiserror::Error, Debug)]
pub enum PerfError {
    /// An expected `{w}waves` result file does not exist.
    #[error("input file not found: {}", .path.display())]
    MissingInputFile {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// A line did not hold exactly two unsigned integers.
    #[error("{}:{line}: malformed sample: {reason}", .path.display())]
    MalformedSample {
        /// File the line came from.
        path: PathBuf,
        /// 1-based line number.
        line: usize,
        /// What was wrong with the line.
        reason: String,
    },
    /// A file ended with a baseline sample that has no SIMD partner.
    #[error(
        "{}: unpaired samples ({baseline} baseline, {simd} SIMD)",
        .path.display()
    )]
    UnpairedSample {
        /// File with the odd line count.
        path: PathBuf,
        /// Baseline samples read.
        baseline: usize,
        /// SIMD samples read.
        simd: usize,
    },
    /// A result file contained no samples at all.
    #[error("{}: no samples", .path.display())]
    EmptyWaveFile {
        /// The empty file.
        path: PathBuf,
    },
    /// Wave range does not satisfy `1 <= first <= last`.
    #[error("invalid wave range {first}..={last} (expected 1 <= first <= last)")]
    InvalidWaveRange {
        /// First wave count requested.
        first: u32,
        /// Last wave count requested.
        last: u32,
    },
    /// A ratio could not be computed (zero or non-finite divisor).
    #[error("degenerate metric: {what}")]
    DegenerateMetric {
        /// Which metric and why.
        what: String,
    },
    /// No TrueType font could be registered for chart text.
    #[error("no usable font for chart text (tried: {})", .tried.join(", "))]
    FontUnavailable {
        /// Every location that was tried.
        tried: Vec<String>,
    },
    /// The plotting backend failed to draw or encode an image.
    #[error("failed to render {}: {message}", .path.display())]
    Render {
        /// Image being written.
        path: PathBuf,
        /// Backend error message.
        message: String,
    },
    /// Any other filesystem error.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// Serializing the summary to JSON failed.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PerfError>;

impl PerfError {
    /// Wrap an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
