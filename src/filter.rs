// File: src/filter.rs

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::parsers::LogRecord;
use crate::time::{self as time_parser, TimeError};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("table has no column named '{0}'")]
    UnknownColumn(String),
    #[error("invalid time bound: {0}")]
    InvalidTime(#[from] TimeError),
}

/// A single row test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Exact match against any of `values`.
    OneOf { column: String, values: Vec<String> },
    /// Case-insensitive substring match.
    Contains { column: String, needle: String },
    /// Record timestamp within `start..=end`. Rows without a readable
    /// timestamp never match. Syslog rows take whichever year the window puts
    /// them in.
    Between {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

impl Predicate {
    /// The column this predicate reads, if it reads a named one.
    pub fn column(&self) -> Option<&str> {
        match self {
            Predicate::OneOf { column, .. } | Predicate::Contains { column, .. } => {
                Some(column.as_str())
            }
            Predicate::Between { .. } => None,
        }
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        match self {
            Predicate::OneOf { column, values } => record
                .get(column)
                .map_or(false, |value| values.iter().any(|v| v == value)),
            Predicate::Contains { column, needle } => record.get(column).map_or(false, |value| {
                value.to_lowercase().contains(&needle.to_lowercase())
            }),
            Predicate::Between { start, end } => time_parser::record_within(record, *start, *end),
        }
    }
}

/// All predicates must hold for a row to pass. An empty filter passes every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keeps rows whose `level` is one of `levels`.
    pub fn levels<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new().one_of("level", levels)
    }

    /// Keeps rows whose `message` contains `keyword`, ignoring case.
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self::new().contains("message", keyword)
    }

    /// An empty value set adds no restriction: selecting nothing shows everything.
    pub fn one_of<I, S>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.predicates.push(Predicate::OneOf {
                column: column.into(),
                values,
            });
        }
        self
    }

    /// An empty needle adds no restriction.
    pub fn contains(mut self, column: impl Into<String>, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        if !needle.is_empty() {
            self.predicates.push(Predicate::Contains {
                column: column.into(),
                needle,
            });
        }
        self
    }

    /// Bounds given in the wrong order are swapped.
    pub fn between(mut self, t1: NaiveDateTime, t2: NaiveDateTime) -> Self {
        let (start, end) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        self.predicates.push(Predicate::Between { start, end });
        self
    }

    /// Like [`Filter::between`] with bounds such as `"1h ago"` and `"now"`.
    pub fn time_range(self, start: &str, end: &str) -> Result<Self, FilterError> {
        let t1 = time_parser::parse_time_string(start)?;
        let t2 = time_parser::parse_time_string(end)?;
        Ok(self.between(t1, t2))
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub(crate) fn columns(&self) -> impl Iterator<Item = &str> {
        self.predicates.iter().filter_map(Predicate::column)
    }

    pub fn matches(&self, record: &LogRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }
}
