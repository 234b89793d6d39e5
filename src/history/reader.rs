//! Multi-source history reader.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::aggregate::{AgeWindow, ExclusionRules, aggregate};
use super::command::Command;
use super::ingest::read_source;
use super::parser::ParseOptions;
use crate::errors::ConfigError;

/// Lines read from the end of each source unless configured otherwise.
pub const DEFAULT_MAX_LINES: usize = 5000;

/// Reads every configured history source and merges the result.
#[derive(Clone, Debug)]
pub struct HistoryReader {
    sources: Vec<PathBuf>,
    exclusions: ExclusionRules,
    max_lines: usize,
    parse_options: ParseOptions,
    age_window: AgeWindow,
}

impl HistoryReader {
    pub fn new<P: Into<PathBuf>>(sources: impl IntoIterator<Item = P>) -> Self {
        Self {
            sources: sources.into_iter().map(Into::into).collect(),
            exclusions: ExclusionRules::default(),
            max_lines: DEFAULT_MAX_LINES,
            parse_options: ParseOptions::default(),
            age_window: AgeWindow::default(),
        }
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }

    /// Per-file line window. `0` reads whole files.
    pub fn set_max_lines(&mut self, max_lines: usize) {
        self.max_lines = max_lines;
    }

    pub fn set_parse_options(&mut self, options: ParseOptions) {
        self.parse_options = options;
    }

    pub fn set_age_window(&mut self, window: AgeWindow) {
        self.age_window = window;
    }

    /// Replace the exclusion patterns.
    ///
    /// Every pattern that compiles is installed. If any fail, they are all
    /// reported in one [`ConfigError::InvalidPatterns`]; reading history
    /// still works with the valid subset.
    pub fn set_exclude_patterns<S: AsRef<str>>(&mut self, patterns: &[S]) -> Result<(), ConfigError> {
        let (rules, invalid) = ExclusionRules::compile(patterns);
        self.exclusions = rules;
        if invalid.is_empty() {
            Ok(())
        } else {
            for bad in &invalid {
                warn!("Ignoring invalid exclude pattern `{}`: {}", bad.pattern, bad.message);
            }
            Err(ConfigError::InvalidPatterns(invalid))
        }
    }

    /// Read, filter and deduplicate every source, most recent first.
    pub fn read_history(&self) -> Vec<Command> {
        self.read_history_at(Utc::now())
    }

    /// Same as [`read_history`](Self::read_history) with an explicit clock
    /// for the age window.
    pub fn read_history_at(&self, now: DateTime<Utc>) -> Vec<Command> {
        let raw: Vec<Command> = self
            .sources
            .iter()
            .flat_map(|source| read_source(source, self.max_lines, &self.parse_options))
            .collect();
        let raw_len = raw.len();

        let commands = aggregate(raw, &self.exclusions, &self.age_window, now);
        info!(
            "Loaded {} unique commands from {} raw entries across {} sources",
            commands.len(),
            raw_len,
            self.sources.len()
        );
        commands
    }
}
