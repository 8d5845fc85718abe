//! Column accessors.
//!
//! Every analysis reads the dataset through these functions. Results are
//! freshly allocated and never alias the dataset's rows.

use indexmap::IndexMap;

use serde::Serialize;

use crate::{dataset::Dataset, error::Result, schema::parse_numeric};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnMode {
    Numeric,
    #[default]
    Text,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Extracts a column in row order.
///
/// `Numeric` mode keeps only values that parse as finite numbers; `Text` mode
/// drops missing values and keeps the rest verbatim. An unknown column name is
/// [`crate::error::AnalysisError::InvalidColumn`].
pub fn get_column(dataset: &Dataset, name: &str, mode: ColumnMode) -> Result<ColumnData> {
    Ok(match mode {
        ColumnMode::Numeric => ColumnData::Numeric(numeric_column(dataset, name)?),
        ColumnMode::Text => ColumnData::Text(text_column(dataset, name)?),
    })
}

pub fn numeric_column(dataset: &Dataset, name: &str) -> Result<Vec<f64>> {
    Ok(dataset
        .cells(name)?
        .filter_map(|cell| cell.and_then(parse_numeric))
        .collect())
}

pub fn text_column(dataset: &Dataset, name: &str) -> Result<Vec<String>> {
    Ok(dataset.cells(name)?.flatten().map(str::to_string).collect())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Two index-aligned numeric sequences produced by listwise deletion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PairedData {
    pub first: Vec<f64>,
    pub second: Vec<f64>,
}

impl PairedData {
    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    pub fn points(&self) -> Vec<Point> {
        self.first
            .iter()
            .zip(&self.second)
            .map(|(&x, &y)| Point { x, y })
            .collect()
    }
}

/// Row-aligned numeric pairs. A row is kept only when both values parse.
pub fn get_paired_numeric_data(dataset: &Dataset, first: &str, second: &str) -> Result<PairedData> {
    let left = dataset.column_index(first)?;
    let right = dataset.column_index(second)?;
    let mut paired = PairedData::default();
    for row in dataset.rows() {
        let x = row[left].as_deref().and_then(parse_numeric);
        let y = row[right].as_deref().and_then(parse_numeric);
        if let (Some(x), Some(y)) = (x, y) {
            paired.first.push(x);
            paired.second.push(y);
        }
    }
    Ok(paired)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub name: String,
    pub values: Vec<f64>,
}

/// Splits a numeric column by the value of a grouping column.
///
/// A row joins a group only when its group label is present and its numeric
/// value parses. Groups appear in first-seen order, so every returned group is
/// non-empty.
pub fn grouped_numeric(dataset: &Dataset, numeric: &str, group_by: &str) -> Result<Vec<Group>> {
    let value_idx = dataset.column_index(numeric)?;
    let group_idx = dataset.column_index(group_by)?;
    let mut groups: IndexMap<&str, Vec<f64>> = IndexMap::new();
    for row in dataset.rows() {
        let (Some(label), Some(value)) = (
            row[group_idx].as_deref(),
            row[value_idx].as_deref().and_then(parse_numeric),
        ) else {
            continue;
        };
        groups.entry(label).or_default().push(value);
    }
    Ok(groups
        .into_iter()
        .map(|(name, values)| Group {
            name: name.to_string(),
            values,
        })
        .collect())
}

/// Row-aligned label pairs for rows where both columns are present.
pub fn paired_labels<'a>(
    dataset: &'a Dataset,
    first: &str,
    second: &str,
) -> Result<Vec<(&'a str, &'a str)>> {
    let left = dataset.column_index(first)?;
    let right = dataset.column_index(second)?;
    Ok(dataset
        .rows()
        .iter()
        .filter_map(|row| Some((row[left].as_deref()?, row[right].as_deref()?)))
        .collect())
}
