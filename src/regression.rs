//! Simple linear regression by ordinary least squares.

use std::fmt::Write as _;

use log::info;
use serde::Serialize;

use crate::{
    columns::{Point, get_paired_numeric_data},
    dataset::Dataset,
    error::{AnalysisError, Result},
    stats::mean,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegressionResult {
    pub predictor: String,
    pub response: String,
    pub n: usize,
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub mse: f64,
    pub rmse: f64,
    pub predicted: Vec<f64>,
    pub residuals: Vec<f64>,
    /// Raw observations, for drawing alongside [`Self::line`].
    pub points: Vec<Point>,
    /// Fitted values at the smallest and largest observed predictor.
    pub line: [Point; 2],
    pub interpretation: String,
    pub summary: String,
}

impl RegressionResult {
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// One-line model description for the analysis log.
    pub fn log_entry(&self) -> String {
        format!(
            "Performed Simple Linear Regression of '{}' on '{}'. Equation: Y = {:.4} * X + {:.4}, R-squared: {:.4}.",
            self.response, self.predictor, self.slope, self.intercept, self.r_squared
        )
    }
}

/// Fits `response = slope * predictor + intercept` over rows where both
/// columns hold numbers.
pub fn linear_regression(dataset: &Dataset, predictor: &str, response: &str) -> Result<RegressionResult> {
    let paired = get_paired_numeric_data(dataset, predictor, response)?;
    let n = paired.len();
    if n < 2 {
        return Err(AnalysisError::insufficient(
            "Simple linear regression (paired observations)",
            2,
            n,
        ));
    }
    let (x, y) = (&paired.first, &paired.second);
    let (Some(mean_x), Some(mean_y)) = (mean(x), mean(y)) else {
        return Err(AnalysisError::insufficient("Simple linear regression", 2, n));
    };

    let (sxx, sxy) = x
        .iter()
        .zip(y)
        .fold((0.0, 0.0), |(sxx, sxy), (xi, yi)| {
            let dx = xi - mean_x;
            (sxx + dx * dx, sxy + dx * (yi - mean_y))
        });
    if sxx == 0.0 {
        return Err(AnalysisError::DegenerateData(format!(
            "Simple linear regression requires '{predictor}' to vary, but every paired value is {mean_x}"
        )));
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let predicted = x.iter().map(|xi| slope * xi + intercept).collect::<Vec<_>>();
    let residuals = y
        .iter()
        .zip(&predicted)
        .map(|(yi, fitted)| yi - fitted)
        .collect::<Vec<_>>();
    let sse = residuals.iter().map(|r| r * r).sum::<f64>();
    let sst = y.iter().map(|yi| (yi - mean_y).powi(2)).sum::<f64>();
    let r_squared = if sst == 0.0 { 1.0 } else { 1.0 - sse / sst };
    let mse = sse / n as f64;
    let rmse = mse.sqrt();

    let min_x = x.iter().copied().fold(f64::INFINITY, f64::min);
    let max_x = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let line = [
        Point {
            x: min_x,
            y: slope * min_x + intercept,
        },
        Point {
            x: max_x,
            y: slope * max_x + intercept,
        },
    ];

    let direction = if slope > 0.0 { "increase" } else { "decrease" };
    let interpretation = format!(
        "The R-squared value indicates that {}% of the variance in '{response}' can be explained by '{predictor}'.\nFor every one-unit increase in '{predictor}', '{response}' is predicted to {direction} by {:.4} units.",
        (r_squared * 100.0).round(),
        slope.abs()
    );

    let mut summary = String::new();
    let _ = writeln!(summary, "Simple Linear Regression Results");
    let _ = writeln!(summary, "------------------------------------");
    let _ = writeln!(summary, "Dependent Variable (Y): {response}");
    let _ = writeln!(summary, "Independent Variable (X): {predictor}\n");
    let _ = writeln!(summary, "Equation: Y = {slope:.4} * X + {intercept:.4}\n");
    let _ = writeln!(summary, "R-squared (R²): {r_squared:.4}");
    let _ = writeln!(summary, "Mean Squared Error (MSE): {mse:.4}");
    let _ = writeln!(summary, "Root Mean Squared Error (RMSE): {rmse:.4}\n");
    let _ = writeln!(summary, "Interpretation:");
    summary.push_str(&interpretation);

    info!("Fitted '{response}' on '{predictor}' over {n} point(s), R² = {r_squared:.4}");
    Ok(RegressionResult {
        predictor: predictor.to_string(),
        response: response.to_string(),
        n,
        slope,
        intercept,
        r_squared,
        mse,
        rmse,
        predicted,
        residuals,
        points: paired.points(),
        line,
        interpretation,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_line_is_recovered() {
        let ds = Dataset::parse(None, "x,y\n1,3\n2,5\n3,7\n4,9\n").unwrap();
        let fit = linear_regression(&ds, "x", "y").unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!(fit.rmse.abs() < 1e-12);
        assert_eq!(fit.line[0], Point { x: 1.0, y: 3.0 });
        assert_eq!(fit.line[1], Point { x: 4.0, y: 9.0 });
        assert!(fit.summary.contains("Equation: Y = 2.0000 * X + 1.0000"));
        assert!(fit.summary.contains("100% of the variance in 'y'"));
        assert!(fit.summary.ends_with("predicted to increase by 2.0000 units."));
    }

    #[test]
    fn negative_slope_reads_as_decrease() {
        let ds = Dataset::parse(None, "x,y\n1,10\n2,7\n3,5\n4,1\n").unwrap();
        let fit = linear_regression(&ds, "x", "y").unwrap();
        assert!(fit.slope < 0.0);
        assert!(fit.r_squared > 0.9 && fit.r_squared < 1.0);
        assert!(fit.interpretation.contains("predicted to decrease by"));
        let sum: f64 = fit.residuals.iter().sum();
        assert!(sum.abs() < 1e-9);
        assert!((fit.mse - fit.residuals.iter().map(|r| r * r).sum::<f64>() / 4.0).abs() < 1e-12);
    }

    #[test]
    fn skips_incomplete_rows() {
        let ds = Dataset::parse(None, "x,y\n1,3\n2,\n,5\n3,7\n").unwrap();
        let fit = linear_regression(&ds, "x", "y").unwrap();
        assert_eq!(fit.n, 2);
        assert_eq!(fit.points.len(), 2);
    }

    #[test]
    fn needs_two_points_and_varying_predictor() {
        let ds = Dataset::parse(None, "x,y\n1,3\n").unwrap();
        assert!(matches!(
            linear_regression(&ds, "x", "y"),
            Err(AnalysisError::InsufficientData { required: 2, actual: 1, .. })
        ));
        let ds = Dataset::parse(None, "x,y\n2,3\n2,5\n").unwrap();
        assert!(matches!(
            linear_regression(&ds, "x", "y"),
            Err(AnalysisError::DegenerateData(_))
        ));
    }

    #[test]
    fn constant_response_is_a_perfect_fit() {
        let ds = Dataset::parse(None, "x,y\n1,4\n2,4\n3,4\n").unwrap();
        let fit = linear_regression(&ds, "x", "y").unwrap();
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 1.0);
        assert!(fit.interpretation.contains("decrease by 0.0000"));
    }
}
