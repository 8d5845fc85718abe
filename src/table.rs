//! Plain-text tables for terminal output.
//!
//! Columns whose every non-empty cell is a number are right-aligned; all
//! other columns are left-aligned.

use std::fmt::Write as _;

use crate::schema::parse_numeric;

const GUTTER: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let cells = |idx: usize| rows.iter().filter_map(move |row| row.get(idx));
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            cells(idx)
                .map(|cell| width_of(cell))
                .chain([width_of(header), 3])
                .max()
                .unwrap_or(3)
        })
        .collect::<Vec<_>>();
    let aligns = (0..headers.len())
        .map(|idx| {
            let mut values = cells(idx).filter(|cell| !cell.trim().is_empty()).peekable();
            let numeric = values.peek().is_some()
                && values.all(|cell| parse_numeric(cell.trim_end_matches('%')).is_some());
            if numeric { Align::Right } else { Align::Left }
        })
        .collect::<Vec<_>>();

    let mut out = String::new();
    let _ = writeln!(out, "{}", line(headers, &widths, &aligns));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let _ = writeln!(out, "{}", line(&rule, &widths, &aligns));
    for row in rows {
        let _ = writeln!(out, "{}", line(row, &widths, &aligns));
    }
    out
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn line(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let rendered = widths
        .iter()
        .zip(aligns)
        .enumerate()
        .map(|(idx, (&width, align))| {
            let value = values.get(idx).map(|v| flatten(v)).unwrap_or_default();
            let pad = " ".repeat(width.saturating_sub(width_of(&value)));
            match align {
                Align::Left => format!("{value}{pad}"),
                Align::Right => format!("{pad}{value}"),
            }
        })
        .collect::<Vec<_>>()
        .join(GUTTER);
    rendered.trim_end().to_string()
}

fn width_of(value: &str) -> usize {
    value.chars().count()
}

fn flatten(value: &str) -> String {
    value.replace(['\r', '\n', '\t'], " ")
}
