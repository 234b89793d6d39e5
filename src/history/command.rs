//! Normalized command record shared by every stage of the pipeline.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Relative recency of a history entry.
///
/// `Timestamp` holds epoch seconds recorded by the shell. `Synthetic` holds a
/// line position inside a source file and only means "later than the lines
/// before it"; it is never a point in time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum OrderingKey {
    Timestamp(i64),
    Synthetic(u64),
}

impl OrderingKey {
    /// Epoch seconds, if this key came from a recorded timestamp.
    pub fn timestamp(&self) -> Option<i64> {
        match self {
            OrderingKey::Timestamp(ts) => Some(*ts),
            OrderingKey::Synthetic(_) => None,
        }
    }

    /// Short human readable form for list rendering.
    pub fn display(&self) -> String {
        match self {
            OrderingKey::Timestamp(ts) => match DateTime::from_timestamp(*ts, 0) {
                Some(utc) => utc.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
                None => ts.to_string(),
            },
            OrderingKey::Synthetic(pos) => format!("#{}", pos),
        }
    }
}

// Plain-text sources have no clock, so their entries rank above every
// recorded timestamp.
impl Ord for OrderingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (OrderingKey::Timestamp(a), OrderingKey::Timestamp(b)) => a.cmp(b),
            (OrderingKey::Synthetic(a), OrderingKey::Synthetic(b)) => a.cmp(b),
            (OrderingKey::Timestamp(_), OrderingKey::Synthetic(_)) => Ordering::Less,
            (OrderingKey::Synthetic(_), OrderingKey::Timestamp(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for OrderingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for OrderingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// A single shell command, possibly standing for several identical
/// invocations after deduplication.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    pub text: String,
    pub ordering_key: OrderingKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    pub count: u32,
    pub exit_code: i32,
    pub has_exit_code: bool,
}

impl Command {
    /// Create a record for one occurrence. The text is trimmed here so every
    /// dialect produces the same dedup key.
    pub fn new(text: impl AsRef<str>, ordering_key: OrderingKey) -> Self {
        Self {
            text: text.as_ref().trim().to_string(),
            ordering_key,
            directory: None,
            count: 1,
            exit_code: 0,
            has_exit_code: false,
        }
    }

    pub fn with_exit_code(mut self, exit_code: i32) -> Self {
        self.exit_code = exit_code;
        self.has_exit_code = true;
        self
    }

    /// Exit status, when the source recorded one.
    pub fn exit_status(&self) -> Option<i32> {
        self.has_exit_code.then_some(self.exit_code)
    }

    /// True for entries without an exit code or with exit code 0.
    pub fn succeeded(&self) -> bool {
        !self.has_exit_code || self.exit_code == 0
    }

    /// True only for entries that recorded a non-zero exit code.
    pub fn failed(&self) -> bool {
        self.has_exit_code && self.exit_code != 0
    }

    /// Total order over occurrences of the same text. The greatest
    /// occurrence is the one a merged record takes its key and exit code
    /// from; ties on the key prefer an occurrence that carries an exit code.
    pub(crate) fn recency_cmp(&self, other: &Self) -> Ordering {
        self.ordering_key
            .cmp(&other.ordering_key)
            .then(self.has_exit_code.cmp(&other.has_exit_code))
            .then(self.exit_code.cmp(&other.exit_code))
            .then_with(|| self.directory.cmp(&other.directory))
    }
}

/// Most recent first, then alphabetical so equal keys sort stably.
pub(crate) fn by_recency_desc(a: &Command, b: &Command) -> Ordering {
    b.ordering_key
        .cmp(&a.ordering_key)
        .then_with(|| a.text.cmp(&b.text))
}

/// Highest count first, ties broken by recency.
pub(crate) fn by_frequency_desc(a: &Command, b: &Command) -> Ordering {
    b.count.cmp(&a.count).then_with(|| by_recency_desc(a, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_ranks_above_timestamp() {
        let ts = OrderingKey::Timestamp(1_700_000_000);
        let syn = OrderingKey::Synthetic(0);
        assert!(syn > ts);
        assert!(OrderingKey::Synthetic(2) > OrderingKey::Synthetic(1));
        assert!(OrderingKey::Timestamp(2000) > OrderingKey::Timestamp(1000));
    }

    #[test]
    fn test_new_trims_text() {
        let cmd = Command::new("  git status \n", OrderingKey::Synthetic(3));
        assert_eq!(cmd.text, "git status");
        assert_eq!(cmd.count, 1);
        assert_eq!(cmd.exit_status(), None);
    }

    #[test]
    fn test_exit_code_flags() {
        let ok = Command::new("true", OrderingKey::Synthetic(0));
        let zero = Command::new("true", OrderingKey::Synthetic(0)).with_exit_code(0);
        let bad = Command::new("false", OrderingKey::Synthetic(0)).with_exit_code(1);

        assert!(ok.succeeded() && !ok.failed());
        assert!(zero.succeeded() && !zero.failed());
        assert!(bad.failed() && !bad.succeeded());
        assert_eq!(bad.exit_status(), Some(1));
    }

    #[test]
    fn test_recency_cmp_prefers_exit_code_on_tie() {
        let key = OrderingKey::Timestamp(1_650_000_000);
        let without = Command::new("make", key);
        let with = Command::new("make", key).with_exit_code(2);
        assert_eq!(with.recency_cmp(&without), Ordering::Greater);

        let mut elsewhere = with.clone();
        elsewhere.directory = Some("/srv".to_string());
        assert_eq!(elsewhere.recency_cmp(&with), Ordering::Greater);
    }

    #[test]
    fn test_synthetic_display_is_not_a_date() {
        assert_eq!(OrderingKey::Synthetic(42).display(), "#42");
    }
}
