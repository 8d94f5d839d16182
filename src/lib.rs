pub mod filter;
pub mod parsers;
pub mod summary;
pub mod table;
pub mod time;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export for easy access
pub use filter::{Filter, FilterError, Predicate};
pub use parsers::{parse_log_text, Dialect, LineGrammar, LogParser, LogRecord};
pub use table::LogTable;
