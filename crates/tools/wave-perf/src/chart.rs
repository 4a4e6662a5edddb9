//! Chart planning and PNG rendering.
//!
//! [`plan_charts`] turns a run collection into backend-independent
//! [`ChartRequest`]s; a [`ChartSink`] turns each request into an image.
//! [`BitmapRenderer`] is the `plotters` bitmap implementation.

use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{PerfError, Result};
use crate::fonts::FAMILY;
use crate::loader::RunCollection;
use crate::output::readable_form;

// Font sizes
const TITLE_FONT_SIZE: u32 = 24;
const AXIS_FONT_SIZE: u32 = 18;
const TICK_FONT_SIZE: u32 = 14;
const LEGEND_FONT_SIZE: u32 = 14;
const VALUE_FONT_SIZE: u32 = 12;

const MAX_ITERATION_TICKS: usize = 12;

// Tick positions closer than this to an integer count as that integer.
const TICK_EPSILON: f64 = 1e-9;

/// Baseline bars.
pub const STEELBLUE: RGBColor = RGBColor(70, 130, 180);
/// SIMD bars.
pub const SEAGREEN: RGBColor = RGBColor(46, 139, 87);
/// Speedup bars.
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
/// Speedup efficiency line.
pub const EFFICIENCY_GREEN: RGBColor = RGBColor(0, 128, 0);

/// Line colors, cycled per series.
pub const PALETTE: &[RGBColor] = &[
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
    RGBColor(227, 119, 194),
    RGBColor(127, 127, 127),
    RGBColor(188, 189, 34),
    RGBColor(23, 190, 207),
];

/// Directory (under the graph directory) holding the per-wave charts.
pub const FLUCTUATIONS_DIR: &str = "per_wave_fluctuations";

/// How a chart draws its series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// One bar per series side by side in each category.
    GroupedBars,
    /// A single bar per category.
    Bars,
    /// One line per series.
    Lines,
    /// One line per series with a marker on each point.
    MarkedLine,
}

/// What the x axis is indexed by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XAxis {
    /// Evenly spaced named categories; value `i` sits at category `i`.
    Categories(Vec<String>),
    /// Iteration numbers; value `i` sits at `first + i`.
    Iterations {
        /// Iteration number of the first value.
        first: u32,
    },
}

/// Text drawn next to every bar or point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueLabels {
    /// No labels.
    None,
    /// [`readable_form`] of the value.
    Readable,
    /// `"{:.2}x"`.
    Multiplier,
    /// `"{:.2}"`.
    Fixed2,
}

impl ValueLabels {
    /// Label for `value`, if labels are drawn.
    pub fn format(self, value: f64) -> Option<String> {
        match self {
            ValueLabels::None => None,
            ValueLabels::Readable => Some(readable_form(value)),
            ValueLabels::Multiplier => Some(format!("{value:.2}x")),
            ValueLabels::Fixed2 => Some(format!("{value:.2}")),
        }
    }
}

/// Y axis tick formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YTicks {
    /// Backend default.
    Plain,
    /// [`readable_form`].
    Readable,
}

/// One named sequence of values.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend text.
    pub label: String,
    /// Values aligned with the x axis.
    pub values: Vec<f64>,
    /// Draw color.
    pub color: RGBColor,
}

/// A fully described chart, independent of the drawing backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRequest {
    /// Output path relative to the graph directory.
    pub file: PathBuf,
    /// Caption.
    pub title: String,
    /// X axis description.
    pub x_desc: String,
    /// Y axis description.
    pub y_desc: String,
    /// Image size in pixels.
    pub size: (u32, u32),
    /// Drawing style.
    pub kind: ChartKind,
    /// X axis indexing.
    pub x_axis: XAxis,
    /// Data.
    pub series: Vec<Series>,
    /// Per-value annotations.
    pub value_labels: ValueLabels,
    /// Y tick formatting.
    pub y_ticks: YTicks,
    /// Whether to draw a legend box.
    pub legend: bool,
}

impl ChartRequest {
    /// Number of x positions the chart spans.
    pub fn x_len(&self) -> usize {
        match &self.x_axis {
            XAxis::Categories(c) => c.len(),
            XAxis::Iterations { .. } => self.series.iter().map(|s| s.values.len()).max().unwrap_or(0),
        }
    }

    /// X coordinate of the `i`-th value.
    pub fn x_at(&self, i: usize) -> f64 {
        match self.x_axis {
            XAxis::Categories(_) => i as f64,
            XAxis::Iterations { first } => f64::from(first) + i as f64,
        }
    }
}

/// Something that can turn a [`ChartRequest`] into an image.
pub trait ChartSink {
    /// Render `request` below `graph_dir` and return the written path.
    fn render(&mut self, graph_dir: &Path, request: &ChartRequest) -> Result<PathBuf>;
}

/// Build the standard chart set for a run collection.
///
/// Order: mean cycles, speedup, one fluctuation chart per wave, speedup
/// efficiency, cumulative savings.
pub fn plan_charts(runs: &RunCollection) -> Result<Vec<ChartRequest>> {
    if runs.is_empty() {
        return Ok(Vec::new());
    }

    let categories: Vec<String> = runs.wave_counts().iter().map(u32::to_string).collect();
    let baseline_means: Vec<f64> = runs.iter().map(|d| d.baseline_mean_cycles()).collect();
    let simd_means: Vec<f64> = runs.iter().map(|d| d.simd_mean_cycles()).collect();
    let speedups = runs
        .iter()
        .map(|d| d.speedup())
        .collect::<Result<Vec<f64>>>()?;
    let efficiencies = runs
        .iter()
        .map(|d| d.speedup_efficiency())
        .collect::<Result<Vec<f64>>>()?;

    let mut charts = Vec::with_capacity(runs.len() + 4);

    charts.push(ChartRequest {
        file: PathBuf::from("cpu_cycles_vs_waves.png"),
        title: "CPU Cycles vs Number of Waves — Baseline vs AVX2".into(),
        x_desc: "Number of Waves".into(),
        y_desc: "CPU Cycles (average)".into(),
        size: (1000, 600),
        kind: ChartKind::GroupedBars,
        x_axis: XAxis::Categories(categories.clone()),
        series: vec![
            Series {
                label: "Baseline".into(),
                values: baseline_means,
                color: STEELBLUE,
            },
            Series {
                label: "AVX2 SIMD".into(),
                values: simd_means,
                color: SEAGREEN,
            },
        ],
        value_labels: ValueLabels::Readable,
        y_ticks: YTicks::Readable,
        legend: true,
    });

    charts.push(ChartRequest {
        file: PathBuf::from("speedup_vs_waves.png"),
        title: "Speedup vs Number of Waves (Baseline / AVX2)".into(),
        x_desc: "Number of Waves".into(),
        y_desc: "Speedup (x)".into(),
        size: (1000, 600),
        kind: ChartKind::Bars,
        x_axis: XAxis::Categories(categories.clone()),
        series: vec![Series {
            label: "Speedup".into(),
            values: speedups,
            color: ORANGE,
        }],
        value_labels: ValueLabels::Multiplier,
        y_ticks: YTicks::Plain,
        legend: false,
    });

    for ds in runs.iter() {
        let waves = ds.waves().get();
        charts.push(ChartRequest {
            file: Path::new(FLUCTUATIONS_DIR).join(format!("{waves}waves_fluctuation.png")),
            title: format!(
                "CPU Cycles per Iteration - {waves} Wave{}",
                if waves > 1 { "s" } else { "" }
            ),
            x_desc: "Iteration".into(),
            y_desc: "CPU Cycles".into(),
            size: (1200, 400),
            kind: ChartKind::Lines,
            x_axis: XAxis::Iterations { first: 0 },
            series: vec![
                Series {
                    label: "Baseline".into(),
                    values: ds.baseline().iter().map(|s| s.cycles as f64).collect(),
                    color: PALETTE[0],
                },
                Series {
                    label: "AVX2".into(),
                    values: ds.simd().iter().map(|s| s.cycles as f64).collect(),
                    color: PALETTE[1],
                },
            ],
            value_labels: ValueLabels::None,
            y_ticks: YTicks::Readable,
            legend: true,
        });
    }

    charts.push(ChartRequest {
        file: PathBuf::from("speedup_efficiency_vs_waves.png"),
        title: "Speedup Efficiency vs Number of Waves".into(),
        x_desc: "Number of Waves".into(),
        y_desc: "Speedup Efficiency (Speedup / Waves)".into(),
        size: (1000, 600),
        kind: ChartKind::MarkedLine,
        x_axis: XAxis::Categories(categories),
        series: vec![Series {
            label: "Speedup Efficiency".into(),
            values: efficiencies,
            color: EFFICIENCY_GREEN,
        }],
        value_labels: ValueLabels::Fixed2,
        y_ticks: YTicks::Plain,
        legend: false,
    });

    charts.push(ChartRequest {
        file: PathBuf::from("cumulative_time_saved.png"),
        title: "Cumulative Time Saved per Iteration for Different Wave Counts".into(),
        x_desc: "Iteration".into(),
        y_desc: "Cumulative Time Saved (CPU Cycles)".into(),
        size: (1000, 600),
        kind: ChartKind::Lines,
        x_axis: XAxis::Iterations { first: 1 },
        series: runs
            .iter()
            .enumerate()
            .map(|(i, ds)| Series {
                label: format!("{} Waves", ds.waves()),
                values: ds.cumulative_savings().into_iter().map(|v| v as f64).collect(),
                color: PALETTE[i % PALETTE.len()],
            })
            .collect(),
        value_labels: ValueLabels::None,
        y_ticks: YTicks::Readable,
        legend: true,
    });

    Ok(charts)
}

/// Render every request in order, creating `graph_dir` first.
///
/// Stops at the first failure.
pub fn render_all(
    requests: &[ChartRequest],
    graph_dir: &Path,
    sink: &mut impl ChartSink,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(graph_dir).map_err(|e| PerfError::io(graph_dir, e))?;
    requests
        .iter()
        .map(|request| sink.render(graph_dir, request))
        .collect()
}

/// PNG renderer on the `plotters` bitmap backend.
///
/// Chart text needs a font registered through [`crate::fonts::register_font`].
#[derive(Debug, Default, Clone, Copy)]
pub struct BitmapRenderer;

impl ChartSink for BitmapRenderer {
    fn render(&mut self, graph_dir: &Path, request: &ChartRequest) -> Result<PathBuf> {
        let path = graph_dir.join(&request.file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| PerfError::io(parent, e))?;
        }
        draw(request, &path).map_err(|e| PerfError::Render {
            path: path.clone(),
            message: e.to_string(),
        })?;
        Ok(path)
    }
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;
type DrawResult = std::result::Result<(), Box<dyn std::error::Error>>;

fn draw(request: &ChartRequest, path: &Path) -> DrawResult {
    let root = BitMapBackend::new(path, request.size).into_drawing_area();
    root.fill(&WHITE)?;

    match request.kind {
        ChartKind::GroupedBars | ChartKind::Bars => draw_bars(&root, request)?,
        ChartKind::Lines | ChartKind::MarkedLine => draw_lines(&root, request)?,
    }

    root.present()?;
    Ok(())
}

fn draw_bars(root: &Area<'_>, request: &ChartRequest) -> DrawResult {
    let n = request.x_len();
    let groups = request.series.len().max(1);
    let y_max = request
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0_f64, f64::max);
    let y_top = if y_max > 0.0 { y_max * 1.15 } else { 1.0 };

    let mut chart = ChartBuilder::on(root)
        .caption(&request.title, (FAMILY, TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(-0.5..(n as f64 - 0.5), 0.0..y_top)?;

    let x_fmt = |x: &f64| x_label(request, *x);
    let readable_fmt = |y: &f64| readable_form(*y);
    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .x_desc(request.x_desc.as_str())
        .y_desc(request.y_desc.as_str())
        .label_style((FAMILY, TICK_FONT_SIZE))
        .axis_desc_style((FAMILY, AXIS_FONT_SIZE));
    if request.y_ticks == YTicks::Readable {
        mesh.y_label_formatter(&readable_fmt);
    }
    mesh.draw()?;

    let group_width = 0.8;
    let bar_width = group_width / groups as f64;
    let value_style = value_text_style();

    for (idx, series) in request.series.iter().enumerate() {
        let color = series.color;
        let offset = (idx as f64 - (groups as f64 - 1.0) / 2.0) * bar_width;

        chart
            .draw_series(series.values.iter().enumerate().map(|(i, &v)| {
                let left = i as f64 + offset - bar_width / 2.0 + 0.01;
                let right = i as f64 + offset + bar_width / 2.0 - 0.01;
                Rectangle::new([(left, 0.0), (right, v)], color.filled())
            }))?
            .label(series.label.as_str())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 15, y + 5)], color.filled()));

        chart.draw_series(series.values.iter().enumerate().filter_map(|(i, &v)| {
            let text = request.value_labels.format(v)?;
            Some(Text::new(
                text,
                (i as f64 + offset, v + y_top * 0.01),
                value_style.clone(),
            ))
        }))?;
    }

    if request.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FAMILY, LEGEND_FONT_SIZE))
            .draw()?;
    }

    Ok(())
}

fn draw_lines(root: &Area<'_>, request: &ChartRequest) -> DrawResult {
    let n = request.x_len();
    let x_range = match request.x_axis {
        XAxis::Categories(_) => -0.5..(n as f64 - 0.5),
        XAxis::Iterations { first } => {
            let start = f64::from(first);
            start..start + (n.max(2) - 1) as f64
        }
    };

    let (lo, hi) = request
        .series
        .iter()
        .flat_map(|s| s.values.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let (lo, hi) = if lo.is_finite() { (lo, hi) } else { (0.0, 0.0) };
    let span = (hi - lo).max(hi.abs() * 0.1).max(1.0);
    let headroom = if request.value_labels == ValueLabels::None {
        0.05
    } else {
        0.15
    };
    let y_range = (lo - span * 0.05)..(hi + span * headroom);

    let mut chart = ChartBuilder::on(root)
        .caption(&request.title, (FAMILY, TITLE_FONT_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(80)
        .build_cartesian_2d(x_range, y_range)?;

    let x_fmt = |x: &f64| x_label(request, *x);
    let readable_fmt = |y: &f64| readable_form(*y);
    let mut mesh = chart.configure_mesh();
    mesh.x_label_formatter(&x_fmt)
        .x_desc(request.x_desc.as_str())
        .y_desc(request.y_desc.as_str())
        .label_style((FAMILY, TICK_FONT_SIZE))
        .axis_desc_style((FAMILY, AXIS_FONT_SIZE));
    match request.x_axis {
        XAxis::Categories(_) => {
            mesh.disable_x_mesh().x_labels(n);
        }
        XAxis::Iterations { .. } => {
            mesh.x_labels(n.clamp(2, MAX_ITERATION_TICKS));
        }
    }
    if request.y_ticks == YTicks::Readable {
        mesh.y_label_formatter(&readable_fmt);
    }
    mesh.draw()?;

    let value_style = value_text_style();

    for series in &request.series {
        let color = series.color;
        let points: Vec<(f64, f64)> = series
            .values
            .iter()
            .enumerate()
            .map(|(i, &v)| (request.x_at(i), v))
            .collect();

        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(series.label.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
            });

        if request.kind == ChartKind::MarkedLine {
            chart.draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, 4, color.filled())),
            )?;
        }

        chart.draw_series(points.iter().filter_map(|&(x, y)| {
            let text = request.value_labels.format(y)?;
            Some(Text::new(text, (x, y + span * 0.02), value_style.clone()))
        }))?;
    }

    if request.legend {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FAMILY, LEGEND_FONT_SIZE))
            .draw()?;
    }

    Ok(())
}

fn value_text_style() -> TextStyle<'static> {
    (FAMILY, VALUE_FONT_SIZE)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Bottom))
}

/// Tick text at x coordinate `x`: the category name, or the iteration number.
///
/// Only integral positions are labeled; ticks between two categories or two
/// iterations stay blank.
fn x_label(request: &ChartRequest, x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > TICK_EPSILON || idx < 0.0 {
        return String::new();
    }
    match &request.x_axis {
        XAxis::Categories(categories) => categories.get(idx as usize).cloned().unwrap_or_default(),
        XAxis::Iterations { .. } => format!("{idx:.0}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{in_memory_origin, parse_wave_file};
    use std::num::NonZeroU32;

    fn runs() -> RunCollection {
        let make = |waves: u32, text: &str| {
            parse_wave_file(NonZeroU32::new(waves).unwrap(), text, &in_memory_origin(waves)).unwrap()
        };
        RunCollection::from_datasets([
            make(1, "1 100\n1 50\n1 100\n1 50\n1 100\n1 50\n"),
            make(2, "1 400\n1 100\n1 400\n1 100\n1 400\n1 100\n"),
        ])
    }

    #[derive(Default)]
    struct Recorder {
        seen: Vec<PathBuf>,
    }

    impl ChartSink for Recorder {
        fn render(&mut self, graph_dir: &Path, request: &ChartRequest) -> Result<PathBuf> {
            let path = graph_dir.join(&request.file);
            self.seen.push(path.clone());
            Ok(path)
        }
    }

    #[test]
    fn plans_five_kinds_with_one_fluctuation_per_wave() {
        let charts = plan_charts(&runs()).unwrap();
        let files: Vec<String> = charts
            .iter()
            .map(|c| c.file.to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(
            files,
            vec![
                "cpu_cycles_vs_waves.png",
                "speedup_vs_waves.png",
                "per_wave_fluctuations/1waves_fluctuation.png",
                "per_wave_fluctuations/2waves_fluctuation.png",
                "speedup_efficiency_vs_waves.png",
                "cumulative_time_saved.png",
            ]
        );
    }

    #[test]
    fn bar_series_align_with_wave_categories() {
        let charts = plan_charts(&runs()).unwrap();

        let cycles = &charts[0];
        assert_eq!(cycles.kind, ChartKind::GroupedBars);
        assert_eq!(cycles.x_axis, XAxis::Categories(vec!["1".into(), "2".into()]));
        assert_eq!(cycles.series[0].values, vec![100.0, 400.0]);
        assert_eq!(cycles.series[1].values, vec![50.0, 100.0]);

        let speedup = &charts[1];
        assert_eq!(speedup.series[0].values, vec![2.0, 4.0]);
        assert_eq!(speedup.value_labels.format(4.0).as_deref(), Some("4.00x"));

        let efficiency = &charts[4];
        assert_eq!(efficiency.kind, ChartKind::MarkedLine);
        assert_eq!(efficiency.series[0].values, vec![2.0, 2.0]);
    }

    #[test]
    fn fluctuation_titles_and_axes() {
        let charts = plan_charts(&runs()).unwrap();
        assert_eq!(charts[2].title, "CPU Cycles per Iteration - 1 Wave");
        assert_eq!(charts[3].title, "CPU Cycles per Iteration - 2 Waves");
        assert_eq!(charts[2].size, (1200, 400));
        assert_eq!(charts[2].x_at(0), 0.0);
        assert_eq!(charts[3].series[1].values, vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn cumulative_series_per_wave() {
        let charts = plan_charts(&runs()).unwrap();
        let cumulative = charts.last().unwrap();
        assert_eq!(cumulative.x_axis, XAxis::Iterations { first: 1 });
        assert_eq!(cumulative.x_at(0), 1.0);
        assert_eq!(cumulative.x_len(), 3);
        let labels: Vec<&str> = cumulative.series.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["1 Waves", "2 Waves"]);
        assert_eq!(cumulative.series[1].values, vec![300.0, 600.0, 900.0]);
    }

    #[test]
    fn empty_collection_plans_nothing() {
        assert!(plan_charts(&RunCollection::default()).unwrap().is_empty());
    }

    #[test]
    fn render_all_creates_graph_dir_and_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let graph_dir = dir.path().join("graphs");
        let charts = plan_charts(&runs()).unwrap();

        let mut recorder = Recorder::default();
        let written = render_all(&charts, &graph_dir, &mut recorder).unwrap();

        assert!(graph_dir.is_dir());
        assert_eq!(written.len(), charts.len());
        assert_eq!(written, recorder.seen);
        assert_eq!(written[0], graph_dir.join("cpu_cycles_vs_waves.png"));
    }

    #[test]
    fn category_ticks_only_on_integers() {
        let charts = plan_charts(&runs()).unwrap();
        assert_eq!(x_label(&charts[0], 1.0), "2");
        assert_eq!(x_label(&charts[0], 0.5), "");
        assert_eq!(x_label(&charts[0], 7.0), "");
        assert_eq!(x_label(&charts[2], 12.0), "12");
    }

    #[test]
    fn iteration_ticks_skip_fractional_positions() {
        let charts = plan_charts(&runs()).unwrap();
        let fluctuation = &charts[2];
        let labels: Vec<String> = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 1.4, 1.6, 2.0]
            .into_iter()
            .map(|x| x_label(fluctuation, x))
            .collect();
        assert_eq!(labels, vec!["0", "", "", "", "", "1", "", "", "2"]);
        assert_eq!(x_label(fluctuation, 0.6), "");

        let cumulative = charts.last().unwrap();
        assert_eq!(x_label(cumulative, 1.0), "1");
        assert_eq!(x_label(cumulative, 1.5), "");
        assert_eq!(x_label(cumulative, 3.0 - 1e-12), "3");
    }
}
