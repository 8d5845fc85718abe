//! Plain-text rendering of [`TestResult`] values.
//!
//! The summary is self-contained prose: paragraphs separated by blank lines,
//! ending in either a significance conclusion at [`ALPHA`] or a note that no
//! p-value is available for the test.

use std::fmt::Write as _;

use crate::hypothesis::{ALPHA, DegreesOfFreedom, TestResult};

const RULE: &str = "------------------------------";

pub fn format_p_value(p: f64) -> String {
    if p < 0.001 {
        "< 0.001".to_string()
    } else {
        format!("{p:.4}")
    }
}

pub fn render(result: &TestResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Test: {}", result.test_name);
    let _ = writeln!(out, "{RULE}");
    if let Some(mean) = result.hypothesized_mean {
        let _ = writeln!(out, "Hypothesized Mean: {mean}");
    }
    if let (Some(name), Some(value)) = (&result.statistic_name, result.statistic_value) {
        let _ = writeln!(out, "{name}: {value:.4}");
    }
    match result.df {
        Some(DegreesOfFreedom::Single(df)) => {
            let _ = writeln!(out, "Degrees of Freedom (df): {df}");
        }
        Some(DegreesOfFreedom::BetweenWithin { between, within }) => {
            let _ = writeln!(out, "Degrees of Freedom (between, within): {between}, {within}");
        }
        None => {}
    }
    if let Some(p) = result.p_value {
        let _ = writeln!(out, "P-value: {}", format_p_value(p));
    }
    out.push('\n');

    if !result.group_stats.is_empty() {
        out.push_str("Group Statistics:\n");
        for group in &result.group_stats {
            let _ = writeln!(out, "  - Group '{}':", group.name);
            let _ = writeln!(out, "    - N: {}", group.n);
            if let Some(mean) = group.mean {
                let _ = writeln!(out, "    - Mean: {mean:.2}");
            }
            if let Some(median) = group.median {
                let _ = writeln!(out, "    - Median: {median:.2}");
            }
            if let Some(std_dev) = group.std_dev {
                let _ = writeln!(out, "    - Std Dev: {std_dev:.2}");
            }
        }
        out.push('\n');
    }

    if let Some(effect) = &result.effect_size {
        let _ = writeln!(out, "Effect Size:\n  - {}: {:.4}\n", effect.name, effect.value);
    }

    if let Some(correlation) = &result.correlation {
        let _ = writeln!(out, "Pearson's r: {:.4}", correlation.r);
        let _ = writeln!(out, "Sample Size (n): {}\n", correlation.n);
    }

    if let Some(table) = &result.contingency_table {
        let matrix = serde_json::to_string(&table.data).unwrap_or_default();
        let _ = writeln!(out, "Contingency Table (Observed):");
        let _ = writeln!(out, "Rows: {}", table.rows.join(", "));
        let _ = writeln!(out, "Columns: {}", table.cols.join(", "));
        let _ = writeln!(out, "{matrix}\n");
    }

    if !result.gof_table.is_empty() {
        out.push_str("Goodness-of-Fit Frequencies:\n");
        out.push_str("Category\tObserved\tExpected\n");
        for row in &result.gof_table {
            let _ = writeln!(
                out,
                "{}\t\t{}\t\t{:.2}",
                row.category, row.observed, row.expected
            );
        }
        out.push('\n');
    }

    if !result.warnings.is_empty() {
        out.push_str("Warnings:\n");
        for warning in &result.warnings {
            let _ = writeln!(out, "  - {warning}");
        }
        out.push('\n');
    }

    match (result.p_value, &result.limitation) {
        (Some(p), _) => {
            out.push_str("Conclusion:\n");
            let formatted = format_p_value(p);
            if p < ALPHA {
                let _ = write!(
                    out,
                    "The p-value ({formatted}) is less than {ALPHA}, suggesting a statistically significant result. We reject the null hypothesis."
                );
            } else {
                let _ = write!(
                    out,
                    "The p-value ({formatted}) is >= {ALPHA}, so we fail to reject the null hypothesis. There is not enough evidence to conclude a significant effect or association."
                );
            }
        }
        (None, Some(limitation)) => {
            let _ = write!(out, "Note: {limitation}");
        }
        (None, None) => {
            out.push_str("Note: No p-value is available for this test.");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::{ContingencyTable, GroupStats, TestKind};

    #[test]
    fn p_values_below_threshold_are_abbreviated() {
        assert_eq!(format_p_value(0.0004), "< 0.001");
        assert_eq!(format_p_value(0.04567), "0.0457");
        assert_eq!(format_p_value(1.0), "1.0000");
    }

    #[test]
    fn significant_result_rejects_null() {
        let mut result = TestResult::new(TestKind::OneSampleTTest).statistic("T-Statistic", 3.5);
        result.hypothesized_mean = Some(2.5);
        result.df = Some(DegreesOfFreedom::Single(9));
        result.p_value = Some(0.0068);
        result.group_stats.push(GroupStats {
            name: "score".to_string(),
            n: 10,
            mean: Some(4.0),
            median: None,
            std_dev: Some(1.3554),
        });
        let summary = render(&result);
        assert!(summary.starts_with("Test: One-Sample T-Test\n"));
        assert!(summary.contains("Hypothesized Mean: 2.5\n"));
        assert!(summary.contains("T-Statistic: 3.5000\n"));
        assert!(summary.contains("Degrees of Freedom (df): 9\n"));
        assert!(summary.contains("P-value: 0.0068\n"));
        assert!(summary.contains("    - Std Dev: 1.36\n"));
        assert!(summary.ends_with("We reject the null hypothesis."));
    }

    #[test]
    fn non_significant_result_fails_to_reject() {
        let mut result = TestResult::new(TestKind::ChiSquared).statistic("Chi-Squared (χ²)", 0.2);
        result.p_value = Some(0.65);
        result.contingency_table = Some(ContingencyTable {
            rows: vec!["a".into(), "b".into()],
            cols: vec!["x".into(), "y".into()],
            data: vec![vec![1, 2], vec![3, 4]],
        });
        let summary = render(&result);
        assert!(summary.contains("[[1,2],[3,4]]"));
        assert!(summary.contains("fail to reject the null hypothesis"));
    }

    #[test]
    fn missing_p_value_states_limitation() {
        let mut result = TestResult::new(TestKind::OneWayAnova).statistic("F-Statistic", 4.0);
        result.df = Some(DegreesOfFreedom::BetweenWithin {
            between: 2,
            within: 12,
        });
        result.limitation = Some("A p-value is not computed for this test.".to_string());
        let summary = render(&result);
        assert!(summary.contains("Degrees of Freedom (between, within): 2, 12"));
        assert!(!summary.contains("P-value"));
        assert!(!summary.contains("Conclusion"));
        assert!(summary.ends_with("Note: A p-value is not computed for this test."));
    }
}
