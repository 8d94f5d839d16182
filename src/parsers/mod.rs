// File: src/parsers/mod.rs

pub mod application;
pub mod syslog;
pub mod windows;

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use regex::{Captures, Regex};
use serde::ser::{Serialize, SerializeMap, Serializer};
use tracing::{debug, trace};

use crate::table::LogTable;

pub use application::ApplicationGrammar;
pub use syslog::LinuxSyslogGrammar;
pub use windows::WindowsEventGrammar;

/// The log source formats this crate understands.
/// Deserializes through [`Dialect::from_tag`], so unknown tags become `Application`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Dialect {
    WindowsEvent,
    LinuxSyslog,
    Application,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [
        Dialect::WindowsEvent,
        Dialect::LinuxSyslog,
        Dialect::Application,
    ];

    /// Maps a caller-supplied tag (e.g. the front end's "Linux syslog") to a dialect.
    /// Anything unrecognized falls back to `Application`.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim_matches(is_blank_char).to_lowercase().as_str() {
            "windows event log" | "windows" | "windows-event" | "windows_event" | "winevt" => {
                Dialect::WindowsEvent
            }
            "linux syslog" | "linux" | "syslog" | "linux-syslog" | "linux_syslog" => {
                Dialect::LinuxSyslog
            }
            _ => Dialect::Application,
        }
    }

    /// The grammar used to match lines of this dialect.
    pub fn grammar(self) -> &'static dyn LineGrammar {
        match self {
            Dialect::WindowsEvent => &WindowsEventGrammar,
            Dialect::LinuxSyslog => &LinuxSyslogGrammar,
            Dialect::Application => &ApplicationGrammar,
        }
    }

    /// Human-readable label, matching the front end's select options.
    pub fn label(self) -> &'static str {
        match self {
            Dialect::WindowsEvent => "Windows Event Log",
            Dialect::LinuxSyslog => "Linux syslog",
            Dialect::Application => "Application Log",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Dialect {
    fn from(tag: String) -> Self {
        Dialect::from_tag(&tag)
    }
}

impl FromStr for Dialect {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Dialect::from_tag(s))
    }
}

/// Pattern plus field extraction for one dialect.
///
/// A non-matching line is `None`, never an error: callers drop it and move on.
pub trait LineGrammar: Send + Sync {
    fn dialect(&self) -> Dialect;

    /// Ordered field names of every record this grammar produces.
    fn schema(&self) -> &'static [&'static str];

    /// Attempts to match one line. Surrounding whitespace is ignored.
    fn try_match(&self, line: &str) -> Option<LogRecord>;
}

/// One parsed line. Holds exactly one value per field of its grammar's schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    schema: &'static [&'static str],
    values: Vec<String>,
}

impl LogRecord {
    /// Builds a record from regex captures. A schema field whose group did not
    /// take part in the match (an optional group) becomes an empty string.
    pub(crate) fn from_captures(schema: &'static [&'static str], caps: &Captures) -> Self {
        let values = schema
            .iter()
            .map(|name| caps.name(name).map_or("", |m| m.as_str()).to_string())
            .collect();
        Self { schema, values }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.schema
            .iter()
            .position(|name| *name == field)
            .map(|idx| self.values[idx].as_str())
    }

    /// `(field, value)` pairs in schema order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.schema
            .iter()
            .copied()
            .zip(self.values.iter().map(String::as_str))
    }

    pub fn schema(&self) -> &'static [&'static str] {
        self.schema
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl Serialize for LogRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Shared matching step for the regex-backed grammars.
pub(crate) fn match_line(
    re: &Regex,
    schema: &'static [&'static str],
    line: &str,
) -> Option<LogRecord> {
    let caps = re.captures(line.trim_matches(is_blank_char))?;
    Some(LogRecord::from_captures(schema, &caps))
}

/// Whitespace for trimming and blank-line detection. Adds the ASCII
/// information separators, which `char::is_whitespace` leaves out.
pub(crate) fn is_blank_char(c: char) -> bool {
    c.is_whitespace() || matches!(c, '\x1c'..='\x1f')
}

/// Same set of separators as a universal-newline split; `\r\n` yields an
/// extra empty piece which the blank-line filter drops.
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Turns a whole text blob into a `LogTable` for one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogParser {
    dialect: Dialect,
}

impl LogParser {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    /// Unrecognized tags use the Application grammar.
    pub fn from_tag(tag: &str) -> Self {
        Self::new(Dialect::from_tag(tag))
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Convenience for string-tagged callers such as the wasm bridge.
    pub fn parse_tagged(text: &str, tag: &str) -> LogTable {
        Self::from_tag(tag).parse(text)
    }

    /// Parses every non-blank line; lines the grammar rejects are dropped.
    /// Never fails: an input with nothing usable yields the empty table.
    pub fn parse(&self, text: &str) -> LogTable {
        let grammar = self.dialect.grammar();

        let mut source_lines = 0usize;
        let rows: Vec<LogRecord> = text
            .split(is_line_break)
            .filter(|line| !line.trim_matches(is_blank_char).is_empty())
            .filter_map(|line| {
                source_lines += 1;
                let record = grammar.try_match(line);
                if record.is_none() {
                    trace!(line = source_lines, dialect = %self.dialect, "line did not match grammar");
                }
                record
            })
            .collect();

        debug!(
            dialect = %self.dialect,
            source_lines,
            rows = rows.len(),
            dropped = source_lines - rows.len(),
            "parsed log text"
        );

        if rows.is_empty() {
            return LogTable::empty_from(source_lines);
        }
        LogTable::from_records(grammar.schema(), rows, source_lines)
    }
}

/// Parses `text` as `dialect`. See [`LogParser::parse`].
pub fn parse_log_text(text: &str, dialect: Dialect) -> LogTable {
    LogParser::new(dialect).parse(text)
}
