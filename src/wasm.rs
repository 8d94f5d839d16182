use wasm_bindgen::prelude::*;
use crate::{Filter, LogParser, LogTable};

// Shape handed back to the JavaScript front end as a JSON string.
#[derive(serde::Serialize)]
struct WasmResult {
    dialect: &'static str,
    table: LogTable,
    level_counts: Vec<(String, usize)>,
    grouping_column: Option<&'static str>,
    grouping_counts: Vec<(String, usize)>,
    error: Option<String>,
}

impl WasmResult {
    fn from_table(dialect: &'static str, table: LogTable, error: Option<String>) -> Self {
        let level_counts = table.value_counts("level");
        let grouping_column = table.grouping_column();
        let grouping_counts = grouping_column
            .map(|column| table.value_counts(column).into_iter().take(10).collect())
            .unwrap_or_default();
        Self {
            dialect,
            table,
            level_counts,
            grouping_column,
            grouping_counts,
            error,
        }
    }
}

/// Parses a whole uploaded file. Unknown dialect tags use the Application grammar.
#[wasm_bindgen]
pub fn parse_log(text: &str, dialect_tag: &str) -> String {
    let parser = LogParser::from_tag(dialect_tag);
    let table = parser.parse(text);

    let error = table
        .is_empty()
        .then(|| "No records could be parsed. Is the log type right?".to_string());
    let result = WasmResult::from_table(parser.dialect().label(), table, error);
    serde_json::to_string(&result).unwrap_or_default()
}

/// Parses, then applies the level selection and message keyword.
/// `levels` is a comma-separated list; empty means no level restriction.
#[wasm_bindgen]
pub fn parse_and_filter(text: &str, dialect_tag: &str, levels: &str, keyword: &str) -> String {
    let parser = LogParser::from_tag(dialect_tag);
    let table = parser.parse(text);

    let mut filter = Filter::new();
    if table.has_column("level") {
        let selected = levels.split(',').map(str::trim).filter(|s| !s.is_empty());
        filter = filter.one_of("level", selected);
    }
    if table.has_column("message") {
        filter = filter.contains("message", keyword);
    }

    let result = match table.filter(&filter) {
        Ok(filtered) => WasmResult::from_table(parser.dialect().label(), filtered, None),
        Err(e) => WasmResult::from_table(
            parser.dialect().label(),
            LogTable::empty(),
            Some(format!("Filter Error: {}", e)),
        ),
    };
    serde_json::to_string(&result).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    const APP_LOG: &str = "\
[2025-01-02 10:15:32,123] INFO [auth] login ok for user=brandon
[2025-01-02 10:15:33,001] ERROR [db] connection refused
[2025-01-02 10:15:34,500] WARN [auth] Brandon retried too often
[2025-01-02 10:15:35,000] ERROR [auth] account locked for user=BRANDON
[2025-01-02 10:15:36,000] DEBUG [auth] brandon session cleanup";

    fn decode(output: String) -> Value {
        serde_json::from_str(&output).unwrap()
    }

    fn messages(result: &Value) -> Vec<&str> {
        result["table"]["rows"]
            .as_array()
            .unwrap()
            .iter()
            .map(|row| row["message"].as_str().unwrap())
            .collect()
    }

    #[test]
    fn test_parse_log_reports_empty_result() {
        let result = decode(parse_log("not a log line\nneither is this", "Linux syslog"));

        assert_eq!(result["dialect"], "Linux syslog");
        assert_eq!(result["error"], "No records could be parsed. Is the log type right?");
        assert_eq!(result["table"]["rows"], json!([]));
        assert_eq!(result["table"]["source_lines"], 2);
        assert_eq!(result["grouping_column"], Value::Null);
        assert_eq!(result["grouping_counts"], json!([]));
    }

    #[test]
    fn test_parse_log_counts_levels_and_modules() {
        let result = decode(parse_log(APP_LOG, "custom format"));

        assert_eq!(result["dialect"], "Application Log");
        assert_eq!(result["error"], Value::Null);
        assert_eq!(result["level_counts"], json!([["ERROR", 2], ["INFO", 1], ["WARN", 1], ["DEBUG", 1]]));
        assert_eq!(result["grouping_column"], "module");
        assert_eq!(result["grouping_counts"], json!([["auth", 4], ["db", 1]]));
    }

    #[test]
    fn test_grouping_counts_keep_top_ten() {
        let text: String = (0..12)
            .flat_map(|module| {
                (0..=module).map(move |_| format!("[t] INFO [mod{module:02}] tick\n"))
            })
            .collect();
        let result = decode(parse_log(&text, "Application Log"));
        let counts = result["grouping_counts"].as_array().unwrap();

        assert_eq!(result["grouping_column"], "module");
        assert_eq!(counts.len(), 10);
        assert_eq!(counts[0], json!(["mod11", 12]));
        assert_eq!(counts[9], json!(["mod02", 3]));
    }

    #[test]
    fn test_parse_and_filter_levels_and_keyword() {
        let result = decode(parse_and_filter(APP_LOG, "Application Log", "ERROR, WARN", "brandon"));

        assert_eq!(result["error"], Value::Null);
        assert_eq!(
            messages(&result),
            vec!["Brandon retried too often", "account locked for user=BRANDON"]
        );
        assert_eq!(result["level_counts"], json!([["WARN", 1], ["ERROR", 1]]));
    }

    #[test]
    fn test_parse_and_filter_empty_selection_keeps_everything() {
        let result = decode(parse_and_filter(APP_LOG, "Application Log", " , ", ""));

        assert_eq!(messages(&result).len(), 5);
        assert_eq!(result["table"]["dropped_lines"], 0);
    }

    #[test]
    fn test_parse_and_filter_syslog_keyword_only() {
        let text = "Jan  5 10:15:32 web01 sshd[1]: Failed password\nJan  5 10:15:33 web01 cron: job done";
        let result = decode(parse_and_filter(text, "Linux syslog", "ERROR", "FAILED"));

        assert_eq!(messages(&result), vec!["Failed password"]);
        assert_eq!(result["level_counts"], json!([]));
        assert_eq!(result["grouping_column"], "process");
    }
}
