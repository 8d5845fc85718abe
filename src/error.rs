//! Error taxonomy for the analysis engine.
//!
//! Every public operation validates its inputs before computing anything, so
//! an `Err` never leaves a [`crate::dataset::Dataset`] or its analysis log
//! partially modified. Messages are phrased so the caller can tell what to
//! change (minimum sample size, required number of groups, and so on).
//!
//! A statistic whose reference computation cannot produce a p-value is not an
//! error; see [`crate::hypothesis::TestResult::limitation`].

use thiserror::Error;

pub type Result<T, E = AnalysisError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("Failed to parse dataset: {0}")]
    Parse(String),

    #[error("Column '{name}' does not exist in the dataset")]
    InvalidColumn { name: String },

    #[error("{context} requires at least {required} data point(s), but only {actual} available")]
    InsufficientData {
        context: String,
        required: usize,
        actual: usize,
    },

    #[error("Column '{column}' must have {expected} non-empty group(s), found {actual}")]
    InvalidGroupCount {
        column: String,
        expected: String,
        actual: usize,
    },

    #[error("Invalid expected proportions: {0}")]
    ProportionMismatch(String),

    #[error("{test} is not supported. Please choose another test.")]
    UnsupportedTest { test: String },

    #[error("{0}")]
    DegenerateData(String),

    #[error("{operation} requires {argument}")]
    MissingArgument { operation: String, argument: String },

    #[error("Failed to build reference distribution: {0}")]
    Distribution(String),
}

impl AnalysisError {
    pub(crate) fn insufficient(context: impl Into<String>, required: usize, actual: usize) -> Self {
        AnalysisError::InsufficientData {
            context: context.into(),
            required,
            actual,
        }
    }

    pub(crate) fn group_count(
        column: impl Into<String>,
        expected: impl Into<String>,
        actual: usize,
    ) -> Self {
        AnalysisError::InvalidGroupCount {
            column: column.into(),
            expected: expected.into(),
            actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_fix() {
        let err = AnalysisError::insufficient("One-Sample T-Test", 2, 1);
        assert_eq!(
            err.to_string(),
            "One-Sample T-Test requires at least 2 data point(s), but only 1 available"
        );

        let err = AnalysisError::group_count("region", "exactly 2", 3);
        assert_eq!(
            err.to_string(),
            "Column 'region' must have exactly 2 non-empty group(s), found 3"
        );
    }
}
