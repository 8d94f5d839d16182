// File: src/parsers/windows.rs

use regex::Regex;
use std::sync::OnceLock;

use super::{match_line, Dialect, LineGrammar, LogRecord};

/// Field order of a Windows Event record.
pub const WINDOWS_EVENT_FIELDS: &[&str] = &["timestamp", "level", "source", "event_id", "message"];

/// Simplified Windows Event export, one event per line:
/// `2025-01-02 10:15:32, Error, Source=Service Control Manager, EventID=7000, The XXX service failed to start`
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsEventGrammar;

fn windows_event_regex() -> &'static Regex {
    static WINDOWS_EVENT_REGEX: OnceLock<Regex> = OnceLock::new();

    WINDOWS_EVENT_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<timestamp>\d{4}-\d{2}-\d{2}\s+\d{2}:\d{2}:\d{2}),\s*",
            r"(?P<level>\w+),\s*",
            r"Source=(?P<source>[^,]+),\s*",
            r"EventID=(?P<event_id>\d+),\s*",
            r"(?P<message>.*)$",
        ))
        .expect("Invalid windows event regex")
    })
}

impl LineGrammar for WindowsEventGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::WindowsEvent
    }

    fn schema(&self) -> &'static [&'static str] {
        WINDOWS_EVENT_FIELDS
    }

    fn try_match(&self, line: &str) -> Option<LogRecord> {
        match_line(windows_event_regex(), WINDOWS_EVENT_FIELDS, line)
    }
}
