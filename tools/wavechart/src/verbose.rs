//! Console output levels for wavechart.
//!
//! `-q` keeps only errors (which always go to stderr), the default prints
//! progress, the summary table and every generated file, `-v` adds the
//! resolved configuration and phase timings.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

/// Output verbosity level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Quiet = 0,
    Default = 1,
    Verbose = 2,
}

impl Verbosity {
    /// Level selected by the `-q`/`-v` flags; quiet wins.
    pub fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Verbosity::Quiet,
            (false, true) => Verbosity::Verbose,
            (false, false) => Verbosity::Default,
        }
    }
}

static LEVEL: AtomicU8 = AtomicU8::new(Verbosity::Default as u8);

/// Set the process-wide level. Called once from `main`.
pub fn set(level: Verbosity) {
    LEVEL.store(level as u8, Ordering::Relaxed);
}

/// Current process-wide level.
pub fn current() -> Verbosity {
    match LEVEL.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Default,
    }
}

/// Print only with `-v`.
macro_rules! vprintln {
    ($($arg:tt)*) => {
        if $crate::verbose::current() >= $crate::verbose::Verbosity::Verbose {
            println!($($arg)*);
        }
    };
}

pub(crate) use vprintln;

/// Print unless `-q`.
macro_rules! dprintln {
    ($($arg:tt)*) => {
        if $crate::verbose::current() >= $crate::verbose::Verbosity::Default {
            println!($($arg)*);
        }
    };
}

pub(crate) use dprintln;

/// Reports how long a phase took when dropped, in verbose mode only.
pub struct Timer {
    phase: String,
    start: Instant,
}

impl Timer {
    /// Start timing `phase`.
    pub fn start(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        vprintln!("  {}: {:.1?}", self.phase, self.start.elapsed());
    }
}
