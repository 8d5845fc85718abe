//! Dataset store and ingestion.
//!
//! A [`Dataset`] owns the parsed rows, the header list, the inferred
//! [`ColumnType`] for every column, basic per-column statistics, and an
//! append-only analysis log. It is built wholesale by [`Dataset::parse`]:
//! type inference and basic statistics are computed before the value is
//! returned, so a caller never observes a partially populated store.
//!
//! ## Ingestion format
//!
//! - Lines are split on LF or CRLF; whitespace-only lines are discarded.
//! - Fields are split on every comma. Quoting and escaping are not supported.
//! - Every field is trimmed; an empty field is a missing value.
//! - The first line is the header record. Header names must be non-empty and
//!   unique.
//! - Short rows are padded with missing values. A row carrying non-empty
//!   fields beyond the header width is rejected.

use std::collections::HashSet;

use itertools::Itertools;
use log::{debug, info};

use crate::{
    error::{AnalysisError, Result},
    schema::{ColumnType, infer_column_types},
    stats::BasicStats,
};

pub type Row = Vec<Option<String>>;

#[derive(Debug, Clone)]
pub struct Dataset {
    file_name: Option<String>,
    headers: Vec<String>,
    rows: Vec<Row>,
    column_types: Vec<ColumnType>,
    basic_stats: Vec<BasicStats>,
    analysis_log: Vec<String>,
}

impl Dataset {
    /// Parses raw comma-separated text into a fully populated dataset.
    pub fn parse(file_name: Option<&str>, text: &str) -> Result<Self> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let (headers, rows) = parse_records(text)?;
        Ok(Self::from_parts(file_name, headers, rows))
    }

    fn from_parts(file_name: Option<&str>, headers: Vec<String>, rows: Vec<Row>) -> Self {
        let column_types = infer_column_types(&headers, &rows);
        let basic_stats = column_types
            .iter()
            .enumerate()
            .map(|(idx, datatype)| {
                BasicStats::compute(
                    rows.iter().filter_map(|row| row[idx].as_deref()),
                    rows.len(),
                    *datatype,
                )
            })
            .collect();
        let opening = match file_name {
            Some(name) => format!("Dataset \"{name}\" loaded."),
            None => "Dataset loaded.".to_string(),
        };
        info!(
            "Loaded {} row(s) across {} column(s)",
            rows.len(),
            headers.len()
        );
        Dataset {
            file_name: file_name.map(str::to_string),
            headers,
            rows,
            column_types,
            basic_stats,
            analysis_log: vec![opening],
        }
    }

    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_index(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| AnalysisError::InvalidColumn {
                name: name.to_string(),
            })
    }

    /// Raw cell iterator for one column, in row order. `None` marks a missing
    /// value.
    pub fn cells(&self, name: &str) -> Result<impl Iterator<Item = Option<&str>> + '_> {
        let idx = self.column_index(name)?;
        Ok(self.rows.iter().map(move |row| row[idx].as_deref()))
    }

    pub fn column_type(&self, name: &str) -> Result<ColumnType> {
        self.column_index(name).map(|idx| self.column_types[idx])
    }

    /// Header/type pairs in header order.
    pub fn column_types(&self) -> impl Iterator<Item = (&str, ColumnType)> + '_ {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.column_types.iter().copied())
    }

    pub fn columns_of_type(&self, datatype: ColumnType) -> Vec<&str> {
        self.column_types()
            .filter(|(_, ty)| *ty == datatype)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn basic_stats(&self, name: &str) -> Result<&BasicStats> {
        self.column_index(name).map(|idx| &self.basic_stats[idx])
    }

    pub fn analysis_log(&self) -> &[String] {
        &self.analysis_log
    }

    /// Appends an entry to the analysis log. Entries are never removed.
    pub fn log_analysis(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        debug!("Analysis log entry: {entry}");
        self.analysis_log.push(entry);
    }

    /// Plain-text description of the dataset for narrative consumers: file
    /// name, row count, column types and the first three data rows.
    pub fn overview(&self) -> String {
        let mut text = String::new();
        text.push_str(&format!(
            "Filename: {}\n",
            self.file_name.as_deref().unwrap_or("(unnamed)")
        ));
        text.push_str(&format!("Number of rows: {}\n", self.rows.len()));
        text.push_str("Columns and their inferred types:\n");
        for (name, datatype) in self.column_types() {
            text.push_str(&format!("  - \"{name}\" ({datatype})\n"));
        }
        text.push_str("Sample rows:\n");
        text.push_str(&self.headers.join(", "));
        text.push('\n');
        for row in self.rows.iter().take(3) {
            text.push_str(&row.iter().map(|cell| cell.as_deref().unwrap_or("")).join(", "));
            text.push('\n');
        }
        text
    }
}

fn parse_records(text: &str) -> Result<(Vec<String>, Vec<Row>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader
        .records()
        .enumerate()
        .filter_map(|(idx, record)| match record {
            Ok(record) if is_blank(&record) => None,
            Ok(record) => Some(Ok(record)),
            Err(err) => Some(Err(AnalysisError::Parse(format!(
                "record {}: {err}",
                idx + 1
            )))),
        });

    let header_record = records
        .next()
        .ok_or_else(|| AnalysisError::Parse("input contains no header row".to_string()))??;
    let headers = header_record
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    validate_headers(&headers)?;

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let line = record
            .position()
            .map(|pos| pos.line())
            .unwrap_or_default();
        if let Some(extra) = record.iter().skip(headers.len()).find(|f| !f.is_empty()) {
            return Err(AnalysisError::Parse(format!(
                "line {line} has {} field(s) but the header declares {} (unexpected value '{extra}')",
                record.len(),
                headers.len()
            )));
        }
        let row = (0..headers.len())
            .map(|idx| {
                record
                    .get(idx)
                    .filter(|field| !field.is_empty())
                    .map(str::to_string)
            })
            .collect::<Row>();
        rows.push(row);
    }
    debug!("Parsed {} data row(s)", rows.len());
    Ok((headers, rows))
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(str::is_empty) && record.len() <= 1
}

fn validate_headers(headers: &[String]) -> Result<()> {
    let mut seen = HashSet::new();
    for (idx, header) in headers.iter().enumerate() {
        if header.is_empty() {
            return Err(AnalysisError::Parse(format!(
                "header column {} has an empty name",
                idx + 1
            )));
        }
        if !seen.insert(header.as_str()) {
            return Err(AnalysisError::Parse(format!(
                "duplicate header '{header}'"
            )));
        }
    }
    Ok(())
}
