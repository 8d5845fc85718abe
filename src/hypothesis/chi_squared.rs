//! Chi-squared goodness-of-fit and test of independence.

use std::collections::HashMap;

use log::warn;

use crate::{
    columns::{paired_labels, text_column},
    dataset::Dataset,
    error::{AnalysisError, Result},
    frequency::FrequencyTable,
};

use super::{
    ContingencyTable, DegreesOfFreedom, GofRow, TestKind, TestResult, chi_squared_upper_tail,
};

const CHI_SQUARED: &str = "Chi-Squared (χ²)";
const PROPORTION_TOLERANCE: f64 = 0.001;
const MIN_EXPECTED_CELL: usize = 5;

/// Distinct categories of `column` in first-seen order, each paired with a
/// uniform proportion `1/k`.
pub fn default_proportions(dataset: &Dataset, column: &str) -> Result<Vec<(String, f64)>> {
    let values = text_column(dataset, column)?;
    let table = FrequencyTable::from_values(values.iter().map(String::as_str));
    let k = table.len();
    Ok(table
        .labels()
        .into_iter()
        .map(|label| (label, 1.0 / k as f64))
        .collect())
}

fn validate_proportions<'a>(
    categories: &[String],
    proportions: &'a [(String, f64)],
) -> Result<HashMap<&'a str, f64>> {
    if proportions.len() != categories.len() {
        return Err(AnalysisError::ProportionMismatch(format!(
            "expected {} proportion(s), one per observed category, but received {}",
            categories.len(),
            proportions.len()
        )));
    }
    let mut lookup = HashMap::with_capacity(proportions.len());
    for (category, proportion) in proportions {
        if !proportion.is_finite() || *proportion <= 0.0 {
            return Err(AnalysisError::ProportionMismatch(format!(
                "proportion for '{category}' must be a positive number, got {proportion}"
            )));
        }
        if lookup.insert(category.as_str(), *proportion).is_some() {
            return Err(AnalysisError::ProportionMismatch(format!(
                "category '{category}' was given more than one proportion"
            )));
        }
    }
    if let Some(missing) = categories.iter().find(|c| !lookup.contains_key(c.as_str())) {
        return Err(AnalysisError::ProportionMismatch(format!(
            "no proportion supplied for observed category '{missing}'"
        )));
    }
    let total = proportions.iter().map(|(_, p)| p).sum::<f64>();
    if (total - 1.0).abs() > PROPORTION_TOLERANCE {
        return Err(AnalysisError::ProportionMismatch(format!(
            "proportions must sum to 1, they currently sum to {total:.4}"
        )));
    }
    Ok(lookup)
}

pub fn chi_squared_goodness_of_fit(
    dataset: &Dataset,
    column: &str,
    proportions: &[(String, f64)],
) -> Result<TestResult> {
    let kind = TestKind::ChiSquaredGof;
    let values = text_column(dataset, column)?;
    if values.is_empty() {
        return Err(AnalysisError::insufficient(kind.display_name(), 1, 0));
    }
    let observed = FrequencyTable::from_values(values.iter().map(String::as_str));
    let categories = observed.labels();
    let lookup = validate_proportions(&categories, proportions)?;

    let total = observed.total() as f64;
    let gof_table = observed
        .iter()
        .map(|(category, count)| GofRow {
            category: category.to_string(),
            observed: count,
            expected: total * lookup[category],
        })
        .collect::<Vec<_>>();
    let statistic = gof_table
        .iter()
        .map(|row| (row.observed as f64 - row.expected).powi(2) / row.expected)
        .sum::<f64>();

    let mut result = TestResult::new(kind).statistic(CHI_SQUARED, statistic);
    result.df = Some(DegreesOfFreedom::Single(categories.len() - 1));
    result.gof_table = gof_table;
    result.limitation = Some(
        "A p-value is not calculated for this test. A larger Chi-Squared value suggests a poorer fit between the observed and expected frequencies."
            .to_string(),
    );
    Ok(result.finish())
}

pub fn chi_squared_independence(dataset: &Dataset, first: &str, second: &str) -> Result<TestResult> {
    let kind = TestKind::ChiSquared;
    let pairs = paired_labels(dataset, first, second)?;
    let rows = FrequencyTable::from_values(pairs.iter().map(|(a, _)| *a));
    let cols = FrequencyTable::from_values(pairs.iter().map(|(_, b)| *b));
    for (column, table) in [(first, &rows), (second, &cols)] {
        if table.len() < 2 {
            return Err(AnalysisError::group_count(column, "at least 2", table.len()));
        }
    }

    let mut data = vec![vec![0usize; cols.len()]; rows.len()];
    for (a, b) in &pairs {
        if let (Some(i), Some(j)) = (rows.position(a), cols.position(b)) {
            data[i][j] += 1;
        }
    }
    let row_labels = rows.labels();
    let col_labels = cols.labels();

    let total = pairs.len() as f64;
    let row_totals = rows.counts();
    let col_totals = cols.counts();
    let mut statistic = 0.0;
    for (i, row) in data.iter().enumerate() {
        for (j, &observed) in row.iter().enumerate() {
            let expected = row_totals[i] as f64 * col_totals[j] as f64 / total;
            statistic += (observed as f64 - expected).powi(2) / expected;
        }
    }
    let df = (row_labels.len() - 1) * (col_labels.len() - 1);
    let p = chi_squared_upper_tail(statistic, df as f64)?;

    let mut result = TestResult::new(kind).statistic(CHI_SQUARED, statistic);
    if data.iter().flatten().any(|&count| count < MIN_EXPECTED_CELL) {
        let warning = format!(
            "Some cells have counts < {MIN_EXPECTED_CELL}. The Chi-Squared test may be inaccurate."
        );
        warn!("{first} x {second}: {warning}");
        result.warnings.push(warning);
    }
    result.df = Some(DegreesOfFreedom::Single(df));
    result.p_value = Some(p);
    result.contingency_table = Some(ContingencyTable {
        rows: row_labels,
        cols: col_labels,
        data,
    });
    Ok(result.finish())
}
