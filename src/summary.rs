// File: src/summary.rs
//
// Request building for the LLM log summary. The HTTP call itself belongs to
// the host application, which plugs in through `CompletionClient`.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::table::LogTable;

pub const SYSTEM_PROMPT: &str = "\
You are a senior systems engineer and SRE who is good at reading system and application logs.
You help find problems, risks and likely root causes, and you give practical remediation advice.

Keep in mind:
- You are looking at logs that have already been parsed into a table; each row is one event.
- Columns include fields such as timestamp, level, source, message, host, process, module.
- Pay particular attention to levels such as Error, Warning or Critical.
";

/// Returned by [`analyze`] when there is nothing to send.
pub const NO_RECORDS_MESSAGE: &str = "No parsed log records are available for analysis.";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("completion request failed: {0}")]
    Client(String),
    #[error("completion service returned an empty response")]
    EmptyResponse,
    #[error("invalid summary config: {0}")]
    Config(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat-completion message, serialized as `{"role": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Model name passed through to the completion client.
    pub model: String,
    /// Rows included in the CSV preview; longer tables are truncated.
    pub max_rows: usize,
    pub response_language: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: "gpt-5-nano".to_string(),
            max_rows: 200,
            response_language: "Traditional Chinese".to_string(),
        }
    }
}

impl SummaryConfig {
    /// Missing keys take their default values.
    pub fn from_json(json: &str) -> Result<Self, SummaryError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Whatever talks to the completion API.
pub trait CompletionClient {
    fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, SummaryError>;
}

/// The user turn: a CSV preview of the table followed by the analysis brief.
pub fn build_user_prompt(table: &LogTable, config: &SummaryConfig) -> String {
    let total_rows = table.row_count();

    let (csv_preview, truncated_note) = if total_rows > config.max_rows {
        (
            table.head(config.max_rows).to_csv(),
            format!(
                "(Note: the table holds {} records; only the first {} are shown for analysis)\n\n",
                total_rows, config.max_rows
            ),
        )
    } else {
        (table.to_csv(), String::new())
    };

    let mut prompt = String::with_capacity(csv_preview.len() + 2048);
    prompt.push_str("Below is a parsed log table; each row is one event:\n\n");
    prompt.push_str(&truncated_note);
    prompt.push_str("(CSV preview of the log records)\n");
    prompt.push_str(&csv_preview);
    prompt.push_str("\n(end of CSV preview)\n\n");
    prompt.push_str(&format!(
        "Based on these logs, please do the following and answer in {}:\n\n",
        config.response_language
    ));
    prompt.push_str(concat!(
        "1. **Overall summary**: in 3-6 lines, describe what happened (what state is the system in? are there obvious errors or anomalies?).\n",
        "2. **Issues and anomalies**: list the 3-8 most important issue types. For each one include:\n",
        "   - the issue type / symptom\n",
        "   - the related log characteristics (for example which level / source / process)\n",
        "   - the possible impact (for example failed logins, a service that will not start, disk I/O problems)\n",
        "3. **Likely root causes**: for the more serious issues, give 1-3 plausible causes (reasonable inference from the logs is enough).\n",
        "4. **Recommended troubleshooting steps**: a bulleted list of concrete advice, for example:\n",
        "   - what to check first\n",
        "   - which system / service to look at next\n",
        "   - which team to involve (for example network, systems, application development)\n",
        "5. If the logs look low-risk, say that there is \"no obvious major issue\" and name the signals worth monitoring.\n\n",
        "Format the analysis as Markdown so it can be pasted straight into a report or slide deck.",
    ));
    prompt
}

/// System and user messages, trimmed, ready for a chat-completion request.
pub fn build_messages(table: &LogTable, config: &SummaryConfig) -> Vec<ChatMessage> {
    vec![
        ChatMessage::new(Role::System, SYSTEM_PROMPT.trim()),
        ChatMessage::new(Role::User, build_user_prompt(table, config).trim()),
    ]
}

/// Asks the completion service for a Markdown report on `table`.
/// An empty table short-circuits without calling the client.
pub fn analyze<C>(table: &LogTable, client: &C, config: &SummaryConfig) -> Result<String, SummaryError>
where
    C: CompletionClient + ?Sized,
{
    if table.is_empty() {
        debug!("no records to analyze; skipping completion request");
        return Ok(NO_RECORDS_MESSAGE.to_string());
    }

    let messages = build_messages(table, config);
    info!(
        model = %config.model,
        rows = table.row_count(),
        truncated = table.row_count() > config.max_rows,
        "requesting log summary"
    );

    let reply = client.complete(&config.model, &messages)?;
    let reply = reply.trim();
    if reply.is_empty() {
        return Err(SummaryError::EmptyResponse);
    }
    Ok(reply.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::{parse_log_text, Dialect};
    use std::cell::RefCell;

    struct FakeClient {
        reply: Result<String, String>,
        seen: RefCell<Vec<(String, Vec<ChatMessage>)>>,
    }

    impl FakeClient {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }

        fn failing(err: &str) -> Self {
            Self {
                reply: Err(err.to_string()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl CompletionClient for FakeClient {
        fn complete(&self, model: &str, messages: &[ChatMessage]) -> Result<String, SummaryError> {
            self.seen
                .borrow_mut()
                .push((model.to_string(), messages.to_vec()));
            self.reply.clone().map_err(SummaryError::Client)
        }
    }

    fn syslog_table(lines: usize) -> LogTable {
        let text: String = (0..lines)
            .map(|i| format!("Jan  5 10:15:32 web01 sshd[{}]: attempt {}\n", 1000 + i, i))
            .collect();
        parse_log_text(&text, Dialect::LinuxSyslog)
    }

    #[test]
    fn test_user_prompt_contains_csv_preview() {
        let table = syslog_table(3);
        let prompt = build_user_prompt(&table, &SummaryConfig::default());

        assert!(prompt.contains("month,day,time,host,process,pid,message\n"));
        assert!(prompt.contains("Jan,5,10:15:32,web01,sshd,1002,attempt 2\n"));
        assert!(prompt.contains("answer in Traditional Chinese"));
        assert!(!prompt.contains("(Note:"));
    }

    #[test]
    fn test_user_prompt_truncates_long_tables() {
        let table = syslog_table(5);
        let config = SummaryConfig {
            max_rows: 2,
            ..SummaryConfig::default()
        };
        let prompt = build_user_prompt(&table, &config);

        assert!(prompt.contains("the table holds 5 records; only the first 2 are shown"));
        assert!(prompt.contains("attempt 1\n"));
        assert!(!prompt.contains("attempt 2\n"));
    }

    #[test]
    fn test_messages_are_trimmed_and_serialize() {
        let messages = build_messages(&syslog_table(1), &SummaryConfig::default());

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert!(!messages[0].content.ends_with('\n'));

        let json = serde_json::to_value(&messages[1]).unwrap();
        assert_eq!(json["role"], "user");
        assert!(json["content"].as_str().unwrap().starts_with("Below is a parsed log table"));
    }

    #[test]
    fn test_analyze_returns_trimmed_reply() {
        let client = FakeClient::replying("  ## Summary\nAll good.\n\n");
        let report = analyze(&syslog_table(2), &client, &SummaryConfig::default()).unwrap();

        assert_eq!(report, "## Summary\nAll good.");
        let seen = client.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "gpt-5-nano");
        assert_eq!(seen[0].1.len(), 2);
    }

    #[test]
    fn test_analyze_empty_table_skips_client() {
        let client = FakeClient::replying("unused");
        let report = analyze(&LogTable::empty(), &client, &SummaryConfig::default()).unwrap();

        assert_eq!(report, NO_RECORDS_MESSAGE);
        assert!(client.seen.borrow().is_empty());
    }

    #[test]
    fn test_analyze_propagates_client_error() {
        let client = FakeClient::failing("401 unauthorized");
        let err = analyze(&syslog_table(1), &client, &SummaryConfig::default()).unwrap_err();
        assert!(matches!(err, SummaryError::Client(msg) if msg == "401 unauthorized"));
    }

    #[test]
    fn test_analyze_blank_reply_is_error() {
        let client = FakeClient::replying("   \n");
        let err = analyze(&syslog_table(1), &client, &SummaryConfig::default()).unwrap_err();
        assert!(matches!(err, SummaryError::EmptyResponse));
    }

    #[test]
    fn test_config_from_json_fills_defaults() {
        let config = SummaryConfig::from_json(r#"{"max_rows": 50}"#).unwrap();
        assert_eq!(config.max_rows, 50);
        assert_eq!(config.model, "gpt-5-nano");

        assert!(matches!(
            SummaryConfig::from_json("{not json"),
            Err(SummaryError::Config(_))
        ));
    }
}
