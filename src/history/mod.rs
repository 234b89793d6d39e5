//! Shell history ingestion.
//!
//! Raw lines flow one way through this module:
//! source file -> [`ingest`] (bounded line window, dialect choice) ->
//! [`parser`] (one line to at most one command) -> [`aggregate`] (validity
//! filter, dedup with counts, exclusions, recency sort). [`HistoryReader`]
//! drives the whole pass for a set of configured sources.

mod aggregate;
mod command;
mod ingest;
mod parser;
mod reader;


pub use aggregate::{AgeWindow, ExclusionRules, InvalidPattern, aggregate};
pub use command::{Command, OrderingKey};
pub(crate) use command::{by_frequency_desc, by_recency_desc};
pub use ingest::{dialect_for_path, read_lines, read_source};
pub use parser::{Dialect, ParseOptions, detect_dialect, parse_line};
pub use reader::{DEFAULT_MAX_LINES, HistoryReader};
