//! Terminal and file output for wave summaries.

use std::path::Path;

use crate::error::{PerfError, Result};
use crate::metrics::WaveSummary;

/// Scale `num` to the largest of `K`, `M`, `G` that keeps it under 1000.
///
/// No decimals up to `G`; anything still at or above 1000 after that is
/// shown in `T` with one decimal.
pub fn readable_form(num: f64) -> String {
    let mut num = num;
    for unit in ["", "K", "M", "G"] {
        if num.abs() < 1000.0 {
            return format!("{num:.0}{unit}");
        }
        num /= 1000.0;
    }
    format!("{num:.1}T")
}

/// Print wave summaries as a formatted table.
pub fn print_summary_table(summaries: &[WaveSummary]) {
    if summaries.is_empty() {
        println!("  No wave results to display.");
        return;
    }

    println!();
    println!(
        "  {:>5}  {:>14}  {:>14}  {:>9}  {:>10}  {:>14}  {:>8}",
        "Waves", "Baseline (cy)", "SIMD (cy)", "Speedup", "Efficiency", "Saved (cy)", "Samples"
    );
    println!(
        "  {:->5}  {:->14}  {:->14}  {:->9}  {:->10}  {:->14}  {:->8}",
        "", "", "", "", "", "", ""
    );

    for s in summaries {
        println!(
            "  {:>5}  {:>14}  {:>14}  {:>8.2}x  {:>10.3}  {:>14}  {:>8}",
            s.waves,
            readable_form(s.baseline.mean),
            readable_form(s.simd.mean),
            s.speedup,
            s.speedup_efficiency,
            readable_form(s.cycles_saved as f64),
            s.baseline.count,
        );
    }

    if let Some(best) = summaries
        .iter()
        .max_by(|a, b| a.speedup.total_cmp(&b.speedup))
    {
        println!();
        println!(
            "  Best speedup: {:.2}x at {} wave{}",
            best.speedup,
            best.waves,
            if best.waves > 1 { "s" } else { "" }
        );
    }
    println!();
}

/// Write wave summaries as pretty-printed JSON.
pub fn write_summary_json(summaries: &[WaveSummary], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summaries)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PerfError::io(parent, e))?;
    }
    std::fs::write(path, json).map_err(|e| PerfError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{SeriesStats, WaveSummary};

    #[test]
    fn readable_units() {
        assert_eq!(readable_form(999.0), "999");
        assert_eq!(readable_form(1000.0), "1K");
        assert_eq!(readable_form(1_500_000.0), "2M");
        assert_eq!(readable_form(2_500_000_000_000.0), "2.5T");
    }

    #[test]
    fn readable_small_and_negative() {
        assert_eq!(readable_form(0.0), "0");
        assert_eq!(readable_form(12.4), "12");
        assert_eq!(readable_form(-4_200.0), "-4K");
        assert_eq!(readable_form(7_000_000_000.0), "7G");
    }

    #[test]
    fn summary_json_roundtrips_through_serde() {
        let stats = SeriesStats::from_cycles(&[10, 20]).unwrap();
        let summary = WaveSummary {
            waves: 2,
            baseline: stats.clone(),
            simd: stats,
            baseline_mean_elapsed: 1.0,
            simd_mean_elapsed: 1.0,
            speedup: 1.0,
            speedup_efficiency: 0.5,
            cycles_saved: 0,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/summary.json");
        write_summary_json(std::slice::from_ref(&summary), &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<WaveSummary> = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, vec![summary]);
    }
}
