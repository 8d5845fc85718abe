//! Column semantics and type inference.
//!
//! Every column is classified as either [`ColumnType::Numeric`] or
//! [`ColumnType::Categorical`]. A column is numeric only when every
//! non-missing value parses as a number *and* it has more than
//! [`NUMERIC_DISTINCT_THRESHOLD`] distinct non-missing values. Low cardinality
//! numeric columns (ratings, codes, flags) stay categorical.

use std::{collections::HashSet, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// A column needs strictly more distinct values than this to be numeric.
pub const NUMERIC_DISTINCT_THRESHOLD: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Categorical,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "numeric" => Ok(ColumnType::Numeric),
            "categorical" => Ok(ColumnType::Categorical),
            other => Err(format!(
                "Unknown column type '{other}'. Expected 'numeric' or 'categorical'"
            )),
        }
    }
}

/// Parses a raw cell as a finite number. Surrounding whitespace is ignored;
/// empty text, `NaN` and infinities are treated as non-numeric.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|parsed| parsed.is_finite())
}

#[derive(Default)]
struct TypeCandidate<'a> {
    distinct: HashSet<&'a str>,
    non_numeric: usize,
}

impl<'a> TypeCandidate<'a> {
    fn update(&mut self, value: &'a str) {
        self.distinct.insert(value);
        if parse_numeric(value).is_none() {
            self.non_numeric += 1;
        }
    }

    fn decide(&self) -> ColumnType {
        if self.non_numeric == 0 && self.distinct.len() > NUMERIC_DISTINCT_THRESHOLD {
            ColumnType::Numeric
        } else {
            ColumnType::Categorical
        }
    }
}

/// Classifies a single column from its cells; `None` marks a missing value.
pub fn infer_column_type<'a, I>(values: I) -> ColumnType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut candidate = TypeCandidate::default();
    for value in values.into_iter().flatten() {
        candidate.update(value);
    }
    candidate.decide()
}

/// Classifies every column of a row-major table. The result is index-aligned
/// with `headers`.
pub fn infer_column_types(headers: &[String], rows: &[Vec<Option<String>>]) -> Vec<ColumnType> {
    (0..headers.len())
        .map(|idx| {
            infer_column_type(
                rows.iter()
                    .map(|row| row.get(idx).and_then(|cell| cell.as_deref())),
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_numeric_rejects_non_finite_and_blank() {
        assert_eq!(parse_numeric(" 12.5 "), Some(12.5));
        assert_eq!(parse_numeric("-3e2"), Some(-300.0));
        assert_eq!(parse_numeric(""), None);
        assert_eq!(parse_numeric("NaN"), None);
        assert_eq!(parse_numeric("inf"), None);
        assert_eq!(parse_numeric("abc"), None);
    }

    #[test]
    fn low_cardinality_numbers_are_categorical() {
        let values = ["1", "2", "3", "2", "1", "3", "2", "1", "3", "2", "1", "3"];
        assert_eq!(
            infer_column_type(values.iter().map(|v| Some(*v))),
            ColumnType::Categorical
        );
    }

    #[test]
    fn eleven_distinct_numbers_are_numeric() {
        let values = (0..11).map(|v| v.to_string()).collect::<Vec<_>>();
        let mut cells = values.iter().map(|v| Some(v.as_str())).collect::<Vec<_>>();
        cells.push(None);
        assert_eq!(infer_column_type(cells), ColumnType::Numeric);
    }

    #[test]
    fn single_non_numeric_value_forces_categorical() {
        let mut values = (0..20).map(|v| v.to_string()).collect::<Vec<_>>();
        values.push("n/a".to_string());
        assert_eq!(
            infer_column_type(values.iter().map(|v| Some(v.as_str()))),
            ColumnType::Categorical
        );
    }

    #[test]
    fn empty_column_is_categorical() {
        assert_eq!(
            infer_column_type(vec![None, None]),
            ColumnType::Categorical
        );
    }

    #[test]
    fn column_type_round_trips_through_text() {
        assert_eq!("Numeric".parse::<ColumnType>().unwrap(), ColumnType::Numeric);
        assert_eq!(ColumnType::Categorical.to_string(), "categorical");
        assert!("text".parse::<ColumnType>().is_err());
    }
}
