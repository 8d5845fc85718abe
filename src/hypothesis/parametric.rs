//! t-tests, one-way ANOVA and Pearson correlation.

use log::debug;

use crate::{
    columns::{Group, get_paired_numeric_data, grouped_numeric, numeric_column},
    dataset::Dataset,
    error::{AnalysisError, Result},
    stats::{mean, sample_std_dev, sample_variance},
};

use super::{
    Correlation, DegreesOfFreedom, EffectSize, GroupStats, TestKind, TestResult,
    students_t_two_sided,
};

const T_STATISTIC: &str = "T-Statistic";

fn mean_group_stats(name: &str, values: &[f64]) -> GroupStats {
    GroupStats {
        name: name.to_string(),
        n: values.len(),
        mean: mean(values),
        median: None,
        std_dev: sample_std_dev(values),
    }
}

/// One-sample t statistic and two-sided p-value for `values` against `mu`.
fn t_against(kind: TestKind, values: &[f64], mu: f64) -> Result<(f64, f64)> {
    let n = values.len();
    if n < 2 {
        return Err(AnalysisError::insufficient(kind.display_name(), 2, n));
    }
    let (Some(mean), Some(sd)) = (mean(values), sample_std_dev(values)) else {
        return Err(AnalysisError::insufficient(kind.display_name(), 2, n));
    };
    if sd == 0.0 {
        return Err(AnalysisError::DegenerateData(format!(
            "{} cannot be computed because all {n} values are identical (zero variance)",
            kind.display_name()
        )));
    }
    let t = (mean - mu) / (sd / (n as f64).sqrt());
    let p = students_t_two_sided(t, (n - 1) as f64)?;
    Ok((t, p))
}

pub fn one_sample_t_test(dataset: &Dataset, column: &str, hypothesized_mean: f64) -> Result<TestResult> {
    let kind = TestKind::OneSampleTTest;
    let data = numeric_column(dataset, column)?;
    let (t, p) = t_against(kind, &data, hypothesized_mean)?;
    debug!("{column}: t = {t}, p = {p}");

    let mut result = TestResult::new(kind).statistic(T_STATISTIC, t);
    result.hypothesized_mean = Some(hypothesized_mean);
    result.df = Some(DegreesOfFreedom::Single(data.len() - 1));
    result.p_value = Some(p);
    result.group_stats = vec![mean_group_stats(column, &data)];
    Ok(result.finish())
}

fn require_group_count(
    column: &str,
    groups: &[Group],
    accepts: impl Fn(usize) -> bool,
    expected: &str,
) -> Result<()> {
    if accepts(groups.len()) {
        Ok(())
    } else {
        Err(AnalysisError::group_count(column, expected, groups.len()))
    }
}

pub fn independent_t_test(dataset: &Dataset, numeric: &str, group: &str) -> Result<TestResult> {
    let kind = TestKind::IndependentTTest;
    let groups = grouped_numeric(dataset, numeric, group)?;
    require_group_count(group, &groups, |k| k == 2, "exactly 2")?;
    let (first, second) = (&groups[0].values, &groups[1].values);
    let (n1, n2) = (first.len(), second.len());
    if n1 < 2 || n2 < 2 {
        return Err(AnalysisError::insufficient(
            format!("Each group of the {}", kind.display_name()),
            2,
            n1.min(n2),
        ));
    }

    let (Some(mean1), Some(mean2), Some(var1), Some(var2)) = (
        mean(first),
        mean(second),
        sample_variance(first),
        sample_variance(second),
    ) else {
        return Err(AnalysisError::insufficient(kind.display_name(), 2, n1.min(n2)));
    };
    let df = n1 + n2 - 2;
    let pooled_variance =
        ((n1 - 1) as f64 * var1 + (n2 - 1) as f64 * var2) / df as f64;
    if pooled_variance == 0.0 {
        return Err(AnalysisError::DegenerateData(format!(
            "{} cannot be computed because both groups have zero variance",
            kind.display_name()
        )));
    }
    let t = (mean1 - mean2) / (pooled_variance * (1.0 / n1 as f64 + 1.0 / n2 as f64)).sqrt();
    let p = students_t_two_sided(t, df as f64)?;
    let cohens_d = (mean1 - mean2) / pooled_variance.sqrt();
    debug!("{numeric} by {group}: t = {t}, d = {cohens_d}");

    let mut result = TestResult::new(kind).statistic(T_STATISTIC, t);
    result.df = Some(DegreesOfFreedom::Single(df));
    result.p_value = Some(p);
    result.group_stats = groups
        .iter()
        .map(|g| mean_group_stats(&g.name, &g.values))
        .collect();
    result.effect_size = Some(EffectSize {
        name: "Cohen's d".to_string(),
        value: cohens_d,
    });
    Ok(result.finish())
}

pub fn paired_t_test(dataset: &Dataset, first: &str, second: &str) -> Result<TestResult> {
    let kind = TestKind::PairedTTest;
    let paired = get_paired_numeric_data(dataset, first, second)?;
    let differences = paired
        .first
        .iter()
        .zip(&paired.second)
        .map(|(x, y)| x - y)
        .collect::<Vec<_>>();
    let (t, p) = t_against(kind, &differences, 0.0)?;

    let mut result = TestResult::new(kind).statistic(T_STATISTIC, t);
    result.df = Some(DegreesOfFreedom::Single(differences.len() - 1));
    result.p_value = Some(p);
    result.group_stats = vec![mean_group_stats(
        &format!("Difference ({first}-{second})"),
        &differences,
    )];
    Ok(result.finish())
}

pub fn one_way_anova(dataset: &Dataset, numeric: &str, group: &str) -> Result<TestResult> {
    let kind = TestKind::OneWayAnova;
    let groups = grouped_numeric(dataset, numeric, group)?;
    require_group_count(group, &groups, |k| k >= 3, "at least 3")?;
    let k = groups.len();
    let n = groups.iter().map(|g| g.values.len()).sum::<usize>();
    if n <= k {
        return Err(AnalysisError::insufficient(kind.display_name(), k + 1, n));
    }

    let grand_mean = groups.iter().flat_map(|g| &g.values).sum::<f64>() / n as f64;
    let mut between = 0.0;
    let mut within = 0.0;
    for g in &groups {
        let group_mean = g.values.iter().sum::<f64>() / g.values.len() as f64;
        between += g.values.len() as f64 * (group_mean - grand_mean).powi(2);
        within += g.values.iter().map(|v| (v - group_mean).powi(2)).sum::<f64>();
    }
    if within == 0.0 {
        return Err(AnalysisError::DegenerateData(format!(
            "{} cannot be computed because every group has zero variance",
            kind.display_name()
        )));
    }
    let (df_between, df_within) = (k - 1, n - k);
    let f = (between / df_between as f64) / (within / df_within as f64);
    debug!("{numeric} by {group}: F = {f} ({df_between}, {df_within})");

    let mut result = TestResult::new(kind).statistic("F-Statistic", f);
    result.df = Some(DegreesOfFreedom::BetweenWithin {
        between: df_between,
        within: df_within,
    });
    result.limitation = Some(
        "A p-value is not calculated for this test. A higher F-value suggests a greater difference between group means; compare it against the F distribution with the degrees of freedom above to judge significance."
            .to_string(),
    );
    result.group_stats = groups
        .iter()
        .map(|g| mean_group_stats(&g.name, &g.values))
        .collect();
    Ok(result.finish())
}

pub fn pearson_correlation(dataset: &Dataset, first: &str, second: &str) -> Result<TestResult> {
    let kind = TestKind::PearsonCorrelation;
    let paired = get_paired_numeric_data(dataset, first, second)?;
    let n = paired.len();
    if n < 2 {
        return Err(AnalysisError::insufficient(kind.display_name(), 2, n));
    }
    let (Some(mean_x), Some(mean_y)) = (mean(&paired.first), mean(&paired.second)) else {
        return Err(AnalysisError::insufficient(kind.display_name(), 2, n));
    };
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in paired.first.iter().zip(&paired.second) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(AnalysisError::DegenerateData(format!(
            "{} is undefined because '{}' has zero variance",
            kind.display_name(),
            if sxx == 0.0 { first } else { second }
        )));
    }
    let r = (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0);

    let mut result = TestResult::new(kind);
    result.correlation = Some(Correlation { r, n });
    result.limitation = Some(
        "'r' measures the strength and direction of a linear relationship. Values near +1 or -1 indicate a strong relationship, while values near 0 indicate a weak one. A p-value is not calculated for this test; assess significance from 'r' and 'n'."
            .to_string(),
    );
    Ok(result.finish())
}
