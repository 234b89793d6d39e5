//! Error types for configuration and template loading.
//!
//! History reading itself never fails: missing or unreadable sources are
//! skipped and malformed lines are recovered or dropped. The errors here are
//! the ones a caller can act on.

use std::path::PathBuf;

use thiserror::Error;

use crate::history::InvalidPattern;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDir,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_yaml::Error),

    #[error("Invalid timestamp window: min_year {min_year} is after max_year {max_year}")]
    InvalidYearRange { min_year: i32, max_year: i32 },

    #[error("Invalid exclude patterns: {}", describe_patterns(.0))]
    InvalidPatterns(Vec<InvalidPattern>),
}

impl ConfigError {
    /// Patterns that failed to compile, when that is what went wrong.
    pub fn invalid_patterns(&self) -> &[InvalidPattern] {
        match self {
            ConfigError::InvalidPatterns(patterns) => patterns,
            _ => &[],
        }
    }
}

fn describe_patterns(patterns: &[InvalidPattern]) -> String {
    patterns
        .iter()
        .map(|p| format!("`{}` ({})", p.pattern, summary_line(&p.message)))
        .collect::<Vec<_>>()
        .join(", ")
}

// regex errors render as a multi-line diagram; the last line names the problem
fn summary_line(message: &str) -> &str {
    message
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or(message)
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Failed to read templates {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write templates {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid YAML in templates {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Failed to serialize templates: {0}")]
    Serialize(#[source] serde_yaml::Error),
}
