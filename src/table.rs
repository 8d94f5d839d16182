// File: src/table.rs

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::filter::{Filter, FilterError};
use crate::parsers::LogRecord;

/// Columns tried, in order, when a caller wants a "where did this come from" breakdown.
pub const GROUPING_COLUMNS: &[&str] = &["source", "process", "module"];

/// The records of one parse run.
///
/// Columns come from the grammar's schema, so every row has exactly these
/// fields. A run with no usable lines has no rows and no columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogTable {
    columns: &'static [&'static str],
    rows: Vec<LogRecord>,
    source_lines: usize,
    dropped_lines: usize,
}

impl LogTable {
    /// The canonical empty table.
    pub fn empty() -> Self {
        Self::empty_from(0)
    }

    pub(crate) fn empty_from(source_lines: usize) -> Self {
        Self {
            columns: &[],
            rows: Vec::new(),
            source_lines,
            dropped_lines: source_lines,
        }
    }

    pub(crate) fn from_records(
        columns: &'static [&'static str],
        rows: Vec<LogRecord>,
        source_lines: usize,
    ) -> Self {
        debug_assert!(rows.iter().all(|r| r.schema() == columns));
        if rows.is_empty() {
            return Self::empty_from(source_lines);
        }
        let dropped_lines = source_lines.saturating_sub(rows.len());
        Self {
            columns,
            rows,
            source_lines,
            dropped_lines,
        }
    }

    pub fn columns(&self) -> &[&'static str] {
        self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|column| *column == name)
    }

    pub fn rows(&self) -> &[LogRecord] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Non-blank lines the parser looked at.
    pub fn source_lines(&self) -> usize {
        self.source_lines
    }

    /// Lines the grammar rejected during the parse this table came from.
    /// Filtering and `head` carry the figure over unchanged.
    pub fn dropped_lines(&self) -> usize {
        self.dropped_lines
    }

    /// The first of `source`, `process`, `module` that this table has.
    pub fn grouping_column(&self) -> Option<&'static str> {
        GROUPING_COLUMNS
            .iter()
            .copied()
            .find(|name| self.has_column(name))
    }

    /// Values of one column in row order. `None` if the column does not exist.
    pub fn column_values<'a>(&'a self, name: &'a str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        if !self.has_column(name) {
            return None;
        }
        Some(self.rows.iter().filter_map(move |row| row.get(name)))
    }

    /// Occurrences per distinct value, most frequent first. Equal counts keep
    /// the order in which the values first appeared.
    pub fn value_counts(&self, name: &str) -> Vec<(String, usize)> {
        let Some(values) = self.column_values(name) else {
            return Vec::new();
        };

        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut counts: Vec<(String, usize)> = Vec::new();
        for value in values {
            match index.get(value) {
                Some(&idx) => counts[idx].1 += 1,
                None => {
                    index.insert(value, counts.len());
                    counts.push((value.to_string(), 1));
                }
            }
        }

        // sort_by is stable, so ties stay in first-appearance order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Distinct values of a column in first-appearance order.
    pub fn unique_values(&self, name: &str) -> Vec<String> {
        let Some(values) = self.column_values(name) else {
            return Vec::new();
        };

        let mut seen: HashSet<&str> = HashSet::new();
        values
            .filter(|value| seen.insert(*value))
            .map(str::to_string)
            .collect()
    }

    /// A new table holding the rows that pass `filter`, in their original order.
    pub fn filter(&self, filter: &Filter) -> Result<LogTable, FilterError> {
        if self.is_empty() {
            return Ok(self.clone());
        }

        for column in filter.columns() {
            if !self.has_column(column) {
                return Err(FilterError::UnknownColumn(column.to_string()));
            }
        }

        let rows = self
            .rows
            .iter()
            .filter(|row| filter.matches(row))
            .cloned()
            .collect::<Vec<_>>();

        // Keep the column set even when nothing survives the filter
        Ok(self.with_rows(rows))
    }

    /// The first `n` rows.
    pub fn head(&self, n: usize) -> LogTable {
        self.with_rows(self.rows.iter().take(n).cloned().collect())
    }

    fn with_rows(&self, rows: Vec<LogRecord>) -> LogTable {
        LogTable {
            columns: self.columns,
            rows,
            source_lines: self.source_lines,
            dropped_lines: self.dropped_lines,
        }
    }

    /// Header plus one line per row. Fields containing a comma, quote or line
    /// break are quoted, with embedded quotes doubled.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        if self.columns.is_empty() {
            return csv;
        }

        push_csv_line(&mut csv, self.columns.iter().copied());
        for row in &self.rows {
            push_csv_line(&mut csv, row.values().iter().map(String::as_str));
        }
        csv
    }
}

fn push_csv_line<'a>(csv: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            csv.push(',');
        }
        if field.contains([',', '"', '\n', '\r']) {
            csv.push('"');
            csv.push_str(&field.replace('"', "\"\""));
            csv.push('"');
        } else {
            csv.push_str(field);
        }
    }
    csv.push('\n');
}
