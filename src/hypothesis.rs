//! Hypothesis test suite.
//!
//! Each test reads its columns through [`crate::columns`], validates its
//! preconditions before computing anything, and returns a self-contained
//! [`TestResult`] whose `summary` is rendered by [`crate::summary`].
//!
//! Some statistics are reported without a p-value (goodness-of-fit, ANOVA,
//! Pearson correlation). In that case `p_value` is `None` and `limitation`
//! explains why; callers branch on field presence, not on an error.

mod chi_squared;
mod parametric;
mod rank;

use std::{fmt, str::FromStr};

use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

use crate::{
    dataset::Dataset,
    error::{AnalysisError, Result},
    frequency::FrequencyTable,
    schema::ColumnType,
};

pub use chi_squared::{chi_squared_goodness_of_fit, chi_squared_independence, default_proportions};
pub use parametric::{
    independent_t_test, one_sample_t_test, one_way_anova, paired_t_test, pearson_correlation,
};
pub use rank::{kruskal_wallis, mann_whitney_u, wilcoxon_signed_rank};

/// Significance level used for every conclusion.
pub const ALPHA: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestKind {
    OneSampleTTest,
    IndependentTTest,
    PairedTTest,
    ChiSquaredGof,
    ChiSquared,
    OneWayAnova,
    PearsonCorrelation,
    MannWhitneyU,
    KruskalWallis,
    WilcoxonSignedRank,
}

impl TestKind {
    pub const ALL: [TestKind; 10] = [
        TestKind::OneSampleTTest,
        TestKind::IndependentTTest,
        TestKind::PairedTTest,
        TestKind::ChiSquaredGof,
        TestKind::ChiSquared,
        TestKind::OneWayAnova,
        TestKind::PearsonCorrelation,
        TestKind::MannWhitneyU,
        TestKind::KruskalWallis,
        TestKind::WilcoxonSignedRank,
    ];

    /// Identifier accepted by [`FromStr`].
    pub fn id(&self) -> &'static str {
        match self {
            TestKind::OneSampleTTest => "one-sample-t-test",
            TestKind::IndependentTTest => "independent-t-test",
            TestKind::PairedTTest => "paired-t-test",
            TestKind::ChiSquaredGof => "chi-squared-gof",
            TestKind::ChiSquared => "chi-squared",
            TestKind::OneWayAnova => "one-way-anova",
            TestKind::PearsonCorrelation => "pearson-correlation",
            TestKind::MannWhitneyU => "mann-whitney-u",
            TestKind::KruskalWallis => "kruskal-wallis",
            TestKind::WilcoxonSignedRank => "wilcoxon-signed-rank",
        }
    }

    /// Human-readable name used in summaries and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            TestKind::OneSampleTTest => "One-Sample T-Test",
            TestKind::IndependentTTest => "Independent Samples T-Test",
            TestKind::PairedTTest => "Paired Samples T-Test",
            TestKind::ChiSquaredGof => "Chi-Squared Goodness-of-Fit Test",
            TestKind::ChiSquared => "Chi-Squared Test of Independence",
            TestKind::OneWayAnova => "One-Way ANOVA",
            TestKind::PearsonCorrelation => "Pearson Correlation",
            TestKind::MannWhitneyU => "Mann-Whitney U Test",
            TestKind::KruskalWallis => "Kruskal-Wallis H Test",
            TestKind::WilcoxonSignedRank => "Wilcoxon Signed-Rank Test",
        }
    }

    /// Which columns may fill the first and (optional) second variable slot.
    pub fn roles(&self) -> (VariableRole, Option<VariableRole>) {
        use VariableRole::*;
        match self {
            TestKind::OneSampleTTest => (Numeric, None),
            TestKind::ChiSquaredGof => (Categorical, None),
            TestKind::IndependentTTest | TestKind::MannWhitneyU => {
                (Numeric, Some(CategoricalTwoGroups))
            }
            TestKind::OneWayAnova => (Numeric, Some(CategoricalThreeOrMoreGroups)),
            TestKind::KruskalWallis => (Numeric, Some(CategoricalMultiGroup)),
            TestKind::ChiSquared => (Categorical, Some(Categorical)),
            TestKind::PearsonCorrelation | TestKind::PairedTTest | TestKind::WilcoxonSignedRank => {
                (Numeric, Some(Numeric))
            }
        }
    }
}

impl fmt::Display for TestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for TestKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        TestKind::ALL
            .into_iter()
            .find(|kind| kind.id() == normalized)
            .ok_or_else(|| {
                let known = TestKind::ALL.iter().map(TestKind::id).collect::<Vec<_>>();
                format!(
                    "Unknown test '{value}'. Expected one of: {}",
                    known.join(", ")
                )
            })
    }
}

/// Column eligibility for a variable slot, used to offer sensible choices
/// before a test is run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableRole {
    Numeric,
    Categorical,
    CategoricalTwoGroups,
    CategoricalMultiGroup,
    CategoricalThreeOrMoreGroups,
}

impl VariableRole {
    pub fn describe(&self) -> &'static str {
        match self {
            VariableRole::Numeric => "numeric",
            VariableRole::Categorical => "categorical",
            VariableRole::CategoricalTwoGroups => "categorical (2 groups)",
            VariableRole::CategoricalMultiGroup => "categorical (2+ groups)",
            VariableRole::CategoricalThreeOrMoreGroups => "categorical (3+ groups)",
        }
    }

    fn accepts(&self, datatype: ColumnType, distinct: usize) -> bool {
        match self {
            VariableRole::Numeric => datatype == ColumnType::Numeric,
            VariableRole::Categorical => datatype == ColumnType::Categorical,
            VariableRole::CategoricalTwoGroups => {
                datatype == ColumnType::Categorical && distinct == 2
            }
            VariableRole::CategoricalMultiGroup => {
                datatype == ColumnType::Categorical && distinct >= 2
            }
            VariableRole::CategoricalThreeOrMoreGroups => {
                datatype == ColumnType::Categorical && distinct >= 3
            }
        }
    }
}

/// Columns whose inferred type and cardinality fit `role`, in header order.
pub fn eligible_columns<'a>(dataset: &'a Dataset, role: VariableRole) -> Vec<&'a str> {
    dataset
        .column_types()
        .filter(|(name, datatype)| {
            let distinct = dataset
                .cells(name)
                .map(|cells| FrequencyTable::from_values(cells.flatten()).len())
                .unwrap_or(0);
            role.accepts(*datatype, distinct)
        })
        .map(|(name, _)| name)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DegreesOfFreedom {
    Single(usize),
    BetweenWithin { between: usize, within: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupStats {
    pub name: String,
    pub n: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectSize {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Correlation {
    pub r: f64,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContingencyTable {
    pub rows: Vec<String>,
    pub cols: Vec<String>,
    pub data: Vec<Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GofRow {
    pub category: String,
    pub observed: usize,
    pub expected: f64,
}

/// Structured outcome of one hypothesis test.
///
/// Field presence per test:
///
/// | test | statistic | df | p-value | extras |
/// |---|---|---|---|---|
/// | one-sample t | t | n-1 | yes | hypothesized mean, group stats |
/// | independent t | t | n1+n2-2 | yes | group stats, Cohen's d |
/// | paired t | t | n-1 | yes | difference stats |
/// | goodness-of-fit | χ² | k-1 | no | gof table |
/// | independence | χ² | (r-1)(c-1) | yes | contingency table, warnings |
/// | ANOVA | F | (k-1, n-k) | no | group stats |
/// | Pearson | none | none | no | correlation |
/// | Mann-Whitney | U | none | yes | group medians |
/// | Kruskal-Wallis | H | k-1 | yes | group medians |
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub kind: TestKind,
    pub test_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hypothesized_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistic_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<DegreesOfFreedom>,
    pub p_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limitation: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub group_stats: Vec<GroupStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_size: Option<EffectSize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation: Option<Correlation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contingency_table: Option<ContingencyTable>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub gof_table: Vec<GofRow>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub summary: String,
}

impl TestResult {
    pub(crate) fn new(kind: TestKind) -> Self {
        TestResult {
            kind,
            test_name: kind.display_name().to_string(),
            hypothesized_mean: None,
            statistic_name: None,
            statistic_value: None,
            df: None,
            p_value: None,
            limitation: None,
            group_stats: Vec::new(),
            effect_size: None,
            correlation: None,
            contingency_table: None,
            gof_table: Vec::new(),
            warnings: Vec::new(),
            summary: String::new(),
        }
    }

    pub(crate) fn statistic(mut self, name: &str, value: f64) -> Self {
        self.statistic_name = Some(name.to_string());
        self.statistic_value = Some(value);
        self
    }

    /// Renders the summary; called once every other field is populated.
    pub(crate) fn finish(mut self) -> Self {
        self.summary = crate::summary::render(&self);
        self
    }

    pub fn is_significant(&self) -> Option<bool> {
        self.p_value.map(|p| p < ALPHA)
    }

    /// Final paragraph of the summary (the conclusion or the limitation note).
    pub fn conclusion(&self) -> &str {
        self.summary
            .trim_end()
            .rsplit("\n\n")
            .next()
            .unwrap_or_default()
    }
}

/// A fully specified test invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum TestRequest {
    OneSampleT {
        column: String,
        hypothesized_mean: f64,
    },
    IndependentT {
        numeric: String,
        group: String,
    },
    PairedT {
        first: String,
        second: String,
    },
    ChiSquaredGoodnessOfFit {
        column: String,
        proportions: Vec<(String, f64)>,
    },
    ChiSquaredIndependence {
        first: String,
        second: String,
    },
    OneWayAnova {
        numeric: String,
        group: String,
    },
    PearsonCorrelation {
        first: String,
        second: String,
    },
    MannWhitneyU {
        numeric: String,
        group: String,
    },
    KruskalWallis {
        numeric: String,
        group: String,
    },
    WilcoxonSignedRank {
        first: String,
        second: String,
    },
}

/// Optional inputs used by some test kinds when building a [`TestRequest`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestOptions {
    pub hypothesized_mean: Option<f64>,
    /// Expected proportion per category; empty means a uniform distribution.
    pub proportions: Vec<(String, f64)>,
}

impl TestRequest {
    /// Builds a request from a kind and generic variable slots.
    pub fn build(
        dataset: &Dataset,
        kind: TestKind,
        first: &str,
        second: Option<&str>,
        options: &TestOptions,
    ) -> Result<Self> {
        let second_var = || {
            second
                .map(str::to_string)
                .ok_or_else(|| AnalysisError::MissingArgument {
                    operation: kind.display_name().to_string(),
                    argument: "a second variable".to_string(),
                })
        };
        let first = first.to_string();
        Ok(match kind {
            TestKind::OneSampleTTest => TestRequest::OneSampleT {
                column: first,
                hypothesized_mean: options.hypothesized_mean.ok_or_else(|| {
                    AnalysisError::MissingArgument {
                        operation: kind.display_name().to_string(),
                        argument: "a hypothesized mean".to_string(),
                    }
                })?,
            },
            TestKind::ChiSquaredGof => {
                let proportions = if options.proportions.is_empty() {
                    default_proportions(dataset, &first)?
                } else {
                    options.proportions.clone()
                };
                TestRequest::ChiSquaredGoodnessOfFit {
                    column: first,
                    proportions,
                }
            }
            TestKind::IndependentTTest => TestRequest::IndependentT {
                numeric: first,
                group: second_var()?,
            },
            TestKind::PairedTTest => TestRequest::PairedT {
                first,
                second: second_var()?,
            },
            TestKind::ChiSquared => TestRequest::ChiSquaredIndependence {
                first,
                second: second_var()?,
            },
            TestKind::OneWayAnova => TestRequest::OneWayAnova {
                numeric: first,
                group: second_var()?,
            },
            TestKind::PearsonCorrelation => TestRequest::PearsonCorrelation {
                first,
                second: second_var()?,
            },
            TestKind::MannWhitneyU => TestRequest::MannWhitneyU {
                numeric: first,
                group: second_var()?,
            },
            TestKind::KruskalWallis => TestRequest::KruskalWallis {
                numeric: first,
                group: second_var()?,
            },
            TestKind::WilcoxonSignedRank => TestRequest::WilcoxonSignedRank {
                first,
                second: second.unwrap_or_default().to_string(),
            },
        })
    }

    pub fn kind(&self) -> TestKind {
        match self {
            TestRequest::OneSampleT { .. } => TestKind::OneSampleTTest,
            TestRequest::IndependentT { .. } => TestKind::IndependentTTest,
            TestRequest::PairedT { .. } => TestKind::PairedTTest,
            TestRequest::ChiSquaredGoodnessOfFit { .. } => TestKind::ChiSquaredGof,
            TestRequest::ChiSquaredIndependence { .. } => TestKind::ChiSquared,
            TestRequest::OneWayAnova { .. } => TestKind::OneWayAnova,
            TestRequest::PearsonCorrelation { .. } => TestKind::PearsonCorrelation,
            TestRequest::MannWhitneyU { .. } => TestKind::MannWhitneyU,
            TestRequest::KruskalWallis { .. } => TestKind::KruskalWallis,
            TestRequest::WilcoxonSignedRank { .. } => TestKind::WilcoxonSignedRank,
        }
    }

    pub fn run(&self, dataset: &Dataset) -> Result<TestResult> {
        match self {
            TestRequest::OneSampleT {
                column,
                hypothesized_mean,
            } => one_sample_t_test(dataset, column, *hypothesized_mean),
            TestRequest::IndependentT { numeric, group } => {
                independent_t_test(dataset, numeric, group)
            }
            TestRequest::PairedT { first, second } => paired_t_test(dataset, first, second),
            TestRequest::ChiSquaredGoodnessOfFit {
                column,
                proportions,
            } => chi_squared_goodness_of_fit(dataset, column, proportions),
            TestRequest::ChiSquaredIndependence { first, second } => {
                chi_squared_independence(dataset, first, second)
            }
            TestRequest::OneWayAnova { numeric, group } => one_way_anova(dataset, numeric, group),
            TestRequest::PearsonCorrelation { first, second } => {
                pearson_correlation(dataset, first, second)
            }
            TestRequest::MannWhitneyU { numeric, group } => {
                mann_whitney_u(dataset, numeric, group)
            }
            TestRequest::KruskalWallis { numeric, group } => {
                kruskal_wallis(dataset, numeric, group)
            }
            TestRequest::WilcoxonSignedRank { first, second } => {
                wilcoxon_signed_rank(dataset, first, second)
            }
        }
    }
}

fn distribution_error(err: impl fmt::Display) -> AnalysisError {
    AnalysisError::Distribution(err.to_string())
}

/// Two-sided p-value of a Student t statistic.
pub(crate) fn students_t_two_sided(t: f64, df: f64) -> Result<f64> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(distribution_error)?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Upper-tail p-value of a chi-squared statistic.
pub(crate) fn chi_squared_upper_tail(statistic: f64, df: f64) -> Result<f64> {
    let dist = ChiSquared::new(df).map_err(distribution_error)?;
    Ok((1.0 - dist.cdf(statistic)).clamp(0.0, 1.0))
}

/// Two-sided p-value of a standard normal z score.
pub(crate) fn normal_two_sided(z: f64) -> Result<f64> {
    let dist = Normal::new(0.0, 1.0).map_err(distribution_error)?;
    Ok((2.0 * (1.0 - dist.cdf(z.abs()))).clamp(0.0, 1.0))
}
