//! Descriptive statistics and per-column summaries.
//!
//! The helpers here return `None` instead of `NaN` when a statistic is not
//! defined for the input (empty slice, single value for a sample deviation).

use serde::Serialize;

use crate::{frequency::FrequencyTable, schema::ColumnType};

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn sum_squared_deviations(values: &[f64]) -> Option<f64> {
    let mean = mean(values)?;
    Some(values.iter().map(|v| (v - mean).powi(2)).sum())
}

/// Sample variance with `n - 1` in the denominator.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    sum_squared_deviations(values).map(|ss| ss / (values.len() as f64 - 1.0))
}

pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Population standard deviation (`n` in the denominator).
pub fn population_std_dev(values: &[f64]) -> Option<f64> {
    sum_squared_deviations(values).map(|ss| (ss / values.len() as f64).sqrt())
}

pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

pub fn median(values: &[f64]) -> Option<f64> {
    median_sorted(&sorted(values))
}

pub fn median_sorted(sorted: &[f64]) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let mid = sorted.len() / 2;
    if sorted.len().is_multiple_of(2) {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Quantile of an ascending slice.
///
/// Uses `idx = n * p`: a fractional index rounds up to the next rank, an
/// integral index on an even-length input averages the two neighbouring
/// values.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() || !(0.0..=1.0).contains(&p) {
        return None;
    }
    let len = sorted.len();
    if p == 1.0 {
        return sorted.last().copied();
    }
    if p == 0.0 {
        return sorted.first().copied();
    }
    let idx = len as f64 * p;
    if idx.fract() != 0.0 {
        Some(sorted[idx.ceil() as usize - 1])
    } else {
        let idx = idx as usize;
        if len.is_multiple_of(2) {
            Some((sorted[idx - 1] + sorted[idx]) / 2.0)
        } else {
            Some(sorted[idx])
        }
    }
}

pub fn min(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::min)
}

pub fn max(values: &[f64]) -> Option<f64> {
    values.iter().copied().reduce(f64::max)
}

/// Summary recorded for every column at ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicStats {
    pub count: usize,
    pub missing: usize,
    #[serde(flatten)]
    pub detail: BasicDetail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BasicDetail {
    Numeric {
        mean: Option<f64>,
        median: Option<f64>,
        #[serde(rename = "stdDev")]
        std_dev: Option<f64>,
        min: Option<f64>,
        max: Option<f64>,
    },
    Categorical {
        unique: usize,
        top: Option<String>,
    },
}

impl BasicStats {
    /// Summarises one column. `total_rows` includes rows where the value is
    /// missing so that `missing = total_rows - count`.
    pub fn compute<'a, I>(cells: I, total_rows: usize, datatype: ColumnType) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let values = cells.into_iter().collect::<Vec<_>>();
        let count = values.len();
        let detail = match datatype {
            ColumnType::Numeric => {
                let numbers = values
                    .iter()
                    .filter_map(|v| crate::schema::parse_numeric(v))
                    .collect::<Vec<_>>();
                BasicDetail::Numeric {
                    mean: mean(&numbers),
                    median: median(&numbers),
                    std_dev: population_std_dev(&numbers),
                    min: min(&numbers),
                    max: max(&numbers),
                }
            }
            ColumnType::Categorical => {
                let table = FrequencyTable::from_values(values.iter().copied());
                BasicDetail::Categorical {
                    unique: table.len(),
                    top: table.most_frequent().map(|(value, _)| value.to_string()),
                }
            }
        };
        BasicStats {
            count,
            missing: total_rows.saturating_sub(count),
            detail,
        }
    }

    /// Cells for the CLI profile table:
    /// count, missing, mean, median, std_dev, min, max, unique, top.
    pub fn render_cells(&self) -> Vec<String> {
        let mut cells = vec![self.count.to_string(), self.missing.to_string()];
        match &self.detail {
            BasicDetail::Numeric {
                mean,
                median,
                std_dev,
                min,
                max,
            } => {
                for metric in [mean, median, std_dev] {
                    cells.push(metric.map(|v| format!("{v:.2}")).unwrap_or_default());
                }
                for metric in [min, max] {
                    cells.push(metric.map(format_number).unwrap_or_default());
                }
                cells.push(String::new());
                cells.push(String::new());
            }
            BasicDetail::Categorical { unique, top } => {
                cells.extend(std::iter::repeat_n(String::new(), 5));
                cells.push(unique.to_string());
                cells.push(top.clone().unwrap_or_default());
            }
        }
        cells
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.4}")
    }
}
