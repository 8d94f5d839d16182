// File: src/parsers/application.rs

use regex::Regex;
use std::sync::OnceLock;

use super::{match_line, Dialect, LineGrammar, LogRecord};

pub const APPLICATION_FIELDS: &[&str] = &["timestamp", "level", "module", "message"];

/// Common application logger layout:
/// `[2025-01-02 10:15:32,123] INFO [auth] User login failed for user=brandon ip=1.2.3.4`
///
/// Also the grammar used for any unrecognized dialect tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplicationGrammar;

fn application_regex() -> &'static Regex {
    static APPLICATION_REGEX: OnceLock<Regex> = OnceLock::new();

    APPLICATION_REGEX.get_or_init(|| {
        Regex::new(concat!(
            r"^\[(?P<timestamp>[^\]]+)\]\s+",
            r"(?P<level>\w+)\s+",
            r"\[(?P<module>[^\]]+)\]\s+",
            r"(?P<message>.*)$",
        ))
        .expect("Invalid application log regex")
    })
}

impl LineGrammar for ApplicationGrammar {
    fn dialect(&self) -> Dialect {
        Dialect::Application
    }

    fn schema(&self) -> &'static [&'static str] {
        APPLICATION_FIELDS
    }

    fn try_match(&self, line: &str) -> Option<LogRecord> {
        match_line(application_regex(), APPLICATION_FIELDS, line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_application_basic() {
        let record = ApplicationGrammar
            .try_match("[2025-01-02 10:15:32,123] INFO [auth] User login failed for user=brandon ip=1.2.3.4")
            .unwrap();

        assert_eq!(record.get("timestamp"), Some("2025-01-02 10:15:32,123"));
        assert_eq!(record.get("level"), Some("INFO"));
        assert_eq!(record.get("module"), Some("auth"));
        assert_eq!(record.get("message"), Some("User login failed for user=brandon ip=1.2.3.4"));
    }

    #[test]
    fn test_application_message_with_brackets() {
        let record = ApplicationGrammar
            .try_match("[t1] ERROR [db.pool] query [id=7] failed: [timeout]")
            .unwrap();

        assert_eq!(record.get("timestamp"), Some("t1"));
        assert_eq!(record.get("module"), Some("db.pool"));
        assert_eq!(record.get("message"), Some("query [id=7] failed: [timeout]"));
    }

    #[test]
    fn test_application_module_with_spaces() {
        let record = ApplicationGrammar
            .try_match("[2025-01-02T10:15:32Z] WARN [payment service] retrying")
            .unwrap();
        assert_eq!(record.get("module"), Some("payment service"));
    }

    #[test]
    fn test_application_rejects_malformed() {
        let cases = [
            // no module
            "[2025-01-02 10:15:32,123] INFO User login",
            // empty timestamp
            "[] INFO [auth] hi",
            // level is not a word
            "[t] !!! [auth] hi",
            // no whitespace before message
            "[t] INFO [auth]",
            // unbracketed timestamp
            "2025-01-02 INFO [auth] hi",
        ];
        for line in cases {
            assert!(ApplicationGrammar.try_match(line).is_none(), "{line}");
        }
    }
}
