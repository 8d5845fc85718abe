//! Chart configurations for exploratory data analysis.
//!
//! The builders only produce plain data; rendering belongs to whatever
//! consumes the serialized [`ChartConfig`].

use std::{fmt, str::FromStr};

use log::debug;
use serde::Serialize;

use crate::{
    columns::{Point, get_paired_numeric_data, numeric_column, text_column},
    dataset::Dataset,
    error::{AnalysisError, Result},
    frequency::FrequencyTable,
    stats::{median_sorted, quantile_sorted, sorted},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FiveNumberSummary {
    pub label: String,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum ChartConfig {
    Histogram {
        title: String,
        labels: Vec<String>,
        counts: Vec<usize>,
    },
    Bar {
        title: String,
        labels: Vec<String>,
        counts: Vec<usize>,
    },
    Scatter {
        title: String,
        x_label: String,
        y_label: String,
        points: Vec<Point>,
    },
    #[serde(rename = "boxplot")]
    BoxPlot {
        title: String,
        boxes: Vec<FiveNumberSummary>,
    },
}

impl ChartConfig {
    pub fn title(&self) -> &str {
        match self {
            ChartConfig::Histogram { title, .. }
            | ChartConfig::Bar { title, .. }
            | ChartConfig::Scatter { title, .. }
            | ChartConfig::BoxPlot { title, .. } => title,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotKind {
    Histogram,
    Bar,
    Scatter,
    BoxPlot,
}

impl PlotKind {
    pub const ALL: [PlotKind; 4] = [
        PlotKind::Histogram,
        PlotKind::Bar,
        PlotKind::Scatter,
        PlotKind::BoxPlot,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PlotKind::Histogram => "histogram",
            PlotKind::Bar => "bar",
            PlotKind::Scatter => "scatter",
            PlotKind::BoxPlot => "boxplot",
        }
    }
}

impl fmt::Display for PlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PlotKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "histogram" => Ok(PlotKind::Histogram),
            "bar" => Ok(PlotKind::Bar),
            "scatter" => Ok(PlotKind::Scatter),
            "boxplot" | "box-plot" | "box" => Ok(PlotKind::BoxPlot),
            _ => Err(format!(
                "Unknown plot type '{s}'. Expected one of: histogram, bar, scatter, boxplot"
            )),
        }
    }
}

/// Builds the requested chart. Scatter plots require `second`; the other
/// kinds ignore it.
pub fn generate_plot(
    dataset: &Dataset,
    kind: PlotKind,
    first: &str,
    second: Option<&str>,
) -> Result<ChartConfig> {
    debug!("Generating {kind} for '{first}'");
    match kind {
        PlotKind::Histogram => histogram(dataset, first),
        PlotKind::Bar => bar_chart(dataset, first),
        PlotKind::Scatter => {
            let second = second.ok_or_else(|| AnalysisError::MissingArgument {
                operation: "A scatter plot".to_string(),
                argument: "a second variable".to_string(),
            })?;
            scatter_plot(dataset, first, second)
        }
        PlotKind::BoxPlot => box_plot(dataset, first),
    }
}

/// Histogram with `ceil(sqrt(n))` equal-width bins. The maximum value lands in
/// the last bin; a column whose values are all equal yields a single bin.
pub fn histogram(dataset: &Dataset, column: &str) -> Result<ChartConfig> {
    let values = numeric_column(dataset, column)?;
    let (labels, counts) = bin_values(&values)
        .ok_or_else(|| AnalysisError::insufficient(format!("A histogram of '{column}'"), 1, 0))?;
    Ok(ChartConfig::Histogram {
        title: format!("Frequency of {column}"),
        labels,
        counts,
    })
}

fn bin_values(values: &[f64]) -> Option<(Vec<String>, Vec<usize>)> {
    let low = values.iter().copied().reduce(f64::min)?;
    let high = values.iter().copied().reduce(f64::max)?;
    let range = high - low;
    if range == 0.0 {
        return Some((vec![format!("[{low:.2}, {high:.2}]")], vec![values.len()]));
    }

    let bins = (values.len() as f64).sqrt().ceil() as usize;
    let n = bins as f64;
    // `high - low` overflows to infinity when the values span more than f64::MAX.
    let overflowed = !range.is_finite();
    let width = if overflowed { high / n - low / n } else { range / n };
    let edge = |i: usize| {
        if i == bins {
            high
        } else if overflowed {
            let t = i as f64 / n;
            low * (1.0 - t) + high * t
        } else {
            low + i as f64 * width
        }
    };
    let labels = (0..bins)
        .map(|i| format!("[{:.2}, {:.2})", edge(i), edge(i + 1)))
        .collect();
    let mut counts = vec![0; bins];
    for &value in values {
        let idx = if value == high {
            bins - 1
        } else {
            let offset = if overflowed {
                value / width - low / width
            } else {
                (value - low) / width
            };
            (offset.floor() as usize).min(bins - 1)
        };
        counts[idx] += 1;
    }
    Some((labels, counts))
}

/// Count per distinct value, in first-seen order.
pub fn bar_chart(dataset: &Dataset, column: &str) -> Result<ChartConfig> {
    let values = text_column(dataset, column)?;
    let table = FrequencyTable::from_values(values.iter().map(String::as_str));
    Ok(ChartConfig::Bar {
        title: format!("Count of {column}"),
        labels: table.labels(),
        counts: table.counts(),
    })
}

pub fn scatter_plot(dataset: &Dataset, x: &str, y: &str) -> Result<ChartConfig> {
    let paired = get_paired_numeric_data(dataset, x, y)?;
    Ok(ChartConfig::Scatter {
        title: format!("{x} vs. {y}"),
        x_label: x.to_string(),
        y_label: y.to_string(),
        points: paired.points(),
    })
}

pub fn box_plot(dataset: &Dataset, column: &str) -> Result<ChartConfig> {
    let values = sorted(&numeric_column(dataset, column)?);
    let summary = five_number_summary(column, &values)
        .ok_or_else(|| AnalysisError::insufficient(format!("A box plot of '{column}'"), 1, 0))?;
    Ok(ChartConfig::BoxPlot {
        title: format!("Distribution of {column}"),
        boxes: vec![summary],
    })
}

fn five_number_summary(label: &str, sorted: &[f64]) -> Option<FiveNumberSummary> {
    Some(FiveNumberSummary {
        label: label.to_string(),
        min: *sorted.first()?,
        q1: quantile_sorted(sorted, 0.25)?,
        median: median_sorted(sorted)?,
        q3: quantile_sorted(sorted, 0.75)?,
        max: *sorted.last()?,
    })
}
