//! Rank-based tests.

use log::debug;

use crate::{
    columns::{Group, grouped_numeric},
    dataset::Dataset,
    error::{AnalysisError, Result},
    stats::median,
};

use super::{
    DegreesOfFreedom, GroupStats, TestKind, TestResult, chi_squared_upper_tail, normal_two_sided,
};

/// Ranks of the pooled values (1-based, ties share their average rank) and
/// the tie term `sum(t^3 - t)` over every run of tied values.
fn average_ranks(values: &[f64]) -> (Vec<f64>, f64) {
    let mut order = (0..values.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    let mut ranks = vec![0.0; values.len()];
    let mut ties = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && values[order[end]] == values[order[start]] {
            end += 1;
        }
        let rank = (start + end + 1) as f64 / 2.0;
        for &idx in &order[start..end] {
            ranks[idx] = rank;
        }
        let run = (end - start) as f64;
        ties += run.powi(3) - run;
        start = end;
    }
    (ranks, ties)
}

/// Rank sum per group, in group order, plus the pooled tie term.
fn group_rank_sums(groups: &[Group]) -> (Vec<f64>, f64) {
    let pooled = groups
        .iter()
        .flat_map(|g| g.values.iter().copied())
        .collect::<Vec<_>>();
    let (ranks, ties) = average_ranks(&pooled);
    let mut sums = Vec::with_capacity(groups.len());
    let mut offset = 0;
    for g in groups {
        sums.push(ranks[offset..offset + g.values.len()].iter().sum());
        offset += g.values.len();
    }
    (sums, ties)
}

fn median_group_stats(groups: &[Group]) -> Vec<GroupStats> {
    groups
        .iter()
        .map(|g| GroupStats {
            name: g.name.clone(),
            n: g.values.len(),
            mean: None,
            median: median(&g.values),
            std_dev: None,
        })
        .collect()
}

/// Mann-Whitney U with a tie- and continuity-corrected normal approximation
/// for the two-sided p-value. Reports `U = min(U1, U2)`.
pub fn mann_whitney_u(dataset: &Dataset, numeric: &str, group: &str) -> Result<TestResult> {
    let kind = TestKind::MannWhitneyU;
    let groups = grouped_numeric(dataset, numeric, group)?;
    if groups.len() != 2 {
        return Err(AnalysisError::group_count(group, "exactly 2", groups.len()));
    }
    let n1 = groups[0].values.len() as f64;
    let n2 = groups[1].values.len() as f64;
    let n = n1 + n2;
    let (sums, ties) = group_rank_sums(&groups);
    let u1 = sums[0] - n1 * (n1 + 1.0) / 2.0;
    let u2 = n1 * n2 - u1;
    let u = u1.min(u2);

    let variance = n1 * n2 / 12.0 * ((n + 1.0) - ties / (n * (n - 1.0)));
    if variance <= 0.0 {
        return Err(AnalysisError::DegenerateData(format!(
            "{} cannot be computed because every value is tied",
            kind.display_name()
        )));
    }
    let z = ((u - n1 * n2 / 2.0).abs() - 0.5).max(0.0) / variance.sqrt();
    let p = normal_two_sided(z)?;
    debug!("{numeric} by {group}: U = {u}, z = {z}");

    let mut result = TestResult::new(kind).statistic("U-Statistic", u);
    result.p_value = Some(p);
    result.group_stats = median_group_stats(&groups);
    Ok(result.finish())
}

/// Kruskal-Wallis H, tie-corrected, with the p-value from the chi-squared
/// distribution on `k - 1` degrees of freedom.
pub fn kruskal_wallis(dataset: &Dataset, numeric: &str, group: &str) -> Result<TestResult> {
    let kind = TestKind::KruskalWallis;
    let groups = grouped_numeric(dataset, numeric, group)?;
    if groups.len() < 2 {
        return Err(AnalysisError::group_count(group, "at least 2", groups.len()));
    }
    let n = groups.iter().map(|g| g.values.len()).sum::<usize>() as f64;
    let (sums, ties) = group_rank_sums(&groups);
    let correction = 1.0 - ties / (n.powi(3) - n);
    if correction <= 0.0 {
        return Err(AnalysisError::DegenerateData(format!(
            "{} cannot be computed because every value is tied",
            kind.display_name()
        )));
    }
    let weighted = groups
        .iter()
        .zip(&sums)
        .map(|(g, r)| r * r / g.values.len() as f64)
        .sum::<f64>();
    let h = (12.0 / (n * (n + 1.0)) * weighted - 3.0 * (n + 1.0)) / correction;
    let df = groups.len() - 1;
    let p = chi_squared_upper_tail(h, df as f64)?;
    debug!("{numeric} by {group}: H = {h}, df = {df}");

    let mut result = TestResult::new(kind).statistic("H-Statistic", h);
    result.df = Some(DegreesOfFreedom::Single(df));
    result.p_value = Some(p);
    result.group_stats = median_group_stats(&groups);
    Ok(result.finish())
}

/// No signed-rank algorithm is provided; always
/// [`AnalysisError::UnsupportedTest`].
pub fn wilcoxon_signed_rank(_dataset: &Dataset, _first: &str, _second: &str) -> Result<TestResult> {
    Err(AnalysisError::UnsupportedTest {
        test: TestKind::WilcoxonSignedRank.display_name().to_string(),
    })
}
