// File: src/parsers/syslog.rs

use regex::Regex;
use std::sync::OnceLock;

use super::{match_line, Dialect, LineGrammar, LogRecord};

pub const LINUX_SYSLOG_FIELDS: &[&str] =
    &["month", "day", "time", "host", "process", "pid", "message"];

/// Classic BSD-style syslog as written to /var/log/syslog or /var/log/auth.log:
/// `Jan  5 10:15:32 web01 sshd[12345]: Failed password for invalid user root`
///
/// The `[pid]` after the process name is optional; when it is missing the
/// record still matches and `pid` is the empty string.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinuxSyslogGrammar;

fn linux_syslog_regex() -> &'static Regex {
    static LINUX_SYSLOG_REGEX: OnceLock<Regex> = OnceLock::new();

    LINUX_SYSLOG_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"^(?P<month>\w{3})\s+",
            r"(?P<day>\d{1,2})\s+",
            r"(?P<time>\d{2}:\d{2}:\d{2})\s+",
            r"(?P<host>\S+)\s+",
            r"(?P<process>[\w\-/]+)(?:\[(?P<pid>\d+)\])?:\s+",
            r"(?P<message>.*)$",
        ))
        .expect("Invalid linux syslog regex")
    })
}

impl LineGrammar for LinuxSyslogGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::LinuxSyslog
    }

    fn schema(&self) -> &'static [&'static str] {
        LINUX_SYSLOG_FIELDS
    }

    fn try_match(&self, line: &str) -> Option<LogRecord> {
        match_line(linux_syslog_regex(), LINUX_SYSLOG_FIELDS, line)
    }
}
