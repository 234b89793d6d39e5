//! Merging raw commands from every source into the final deduplicated list.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Duration, Utc};
use regex::Regex;
use tracing::debug;

use super::command::{Command, OrderingKey, by_recency_desc};

/// Compiled exclusion patterns. A command matching any of them is hidden.
#[derive(Clone, Debug, Default)]
pub struct ExclusionRules {
    patterns: Vec<Regex>,
}

/// A pattern that failed to compile, with the regex error message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidPattern {
    pub pattern: String,
    pub message: String,
}

impl ExclusionRules {
    /// Compile every pattern independently. Valid ones are kept even when
    /// others fail; the failures are returned for reporting.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> (Self, Vec<InvalidPattern>) {
        let mut compiled = Vec::with_capacity(patterns.len());
        let mut invalid = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            match Regex::new(pattern) {
                Ok(regex) => compiled.push(regex),
                Err(e) => invalid.push(InvalidPattern {
                    pattern: pattern.to_string(),
                    message: e.to_string(),
                }),
            }
        }

        (Self { patterns: compiled }, invalid)
    }

    pub fn is_excluded(&self, text: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(text))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Sanity window for recorded timestamps. Entries outside it are parse
/// artifacts. Synthetic keys are never checked against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgeWindow {
    /// How far past "now" a timestamp may be; `None` disables the check.
    pub future_grace: Option<Duration>,
    /// Oldest accepted age; `None` disables the horizon.
    pub max_age: Option<Duration>,
}

impl AgeWindow {
    /// Accept every timestamp.
    pub fn unbounded() -> Self {
        Self {
            future_grace: None,
            max_age: None,
        }
    }

    fn accepts(&self, key: OrderingKey, now: DateTime<Utc>) -> bool {
        let Some(ts) = key.timestamp() else {
            return true;
        };
        let now = now.timestamp();
        if let Some(grace) = self.future_grace {
            if ts > now.saturating_add(grace.num_seconds()) {
                return false;
            }
        }
        match self.max_age {
            Some(max_age) => ts >= now.saturating_sub(max_age.num_seconds()),
            None => true,
        }
    }
}

impl Default for AgeWindow {
    fn default() -> Self {
        Self {
            future_grace: Some(Duration::hours(1)),
            max_age: Some(Duration::days(5 * 365)),
        }
    }
}

/// Run the full merge: validity filter, recency sort, dedup, exclusions,
/// final sort. The output does not depend on the order of `raw`.
pub fn aggregate(
    raw: Vec<Command>,
    exclusions: &ExclusionRules,
    window: &AgeWindow,
    now: DateTime<Utc>,
) -> Vec<Command> {
    let total = raw.len();

    let mut valid: Vec<Command> = raw
        .into_iter()
        .filter(|cmd| is_valid(cmd, window, now))
        .collect();
    let dropped = total - valid.len();

    valid.sort_by(by_recency_desc);

    let mut merged = dedup(valid);
    let unique = merged.len();

    merged.retain(|cmd| !exclusions.is_excluded(&cmd.text));
    merged.sort_by(by_recency_desc);

    debug!(
        "Aggregated {} raw commands: {} invalid, {} unique, {} after exclusions",
        total,
        dropped,
        unique,
        merged.len()
    );
    merged
}

/// Collapse occurrences by trimmed text. Each representative carries the
/// key and exit code of its most recent occurrence and the total count,
/// whatever order the occurrences arrive in.
fn dedup(commands: Vec<Command>) -> Vec<Command> {
    let mut order: Vec<String> = Vec::new();
    let mut seen: HashMap<String, Command> = HashMap::with_capacity(commands.len());

    for mut cmd in commands {
        let key = cmd.text.trim().to_string();
        match seen.entry(key) {
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                let count = existing.count + cmd.count;
                if cmd.recency_cmp(existing).is_gt() {
                    cmd.text = existing.text.clone();
                    *existing = cmd;
                }
                existing.count = count;
            }
            Entry::Vacant(slot) => {
                order.push(slot.key().clone());
                cmd.text = slot.key().clone();
                slot.insert(cmd);
            }
        }
    }

    order
        .into_iter()
        .filter_map(|text| seen.remove(&text))
        .collect()
}

fn is_valid(cmd: &Command, window: &AgeWindow, now: DateTime<Utc>) -> bool {
    let text = cmd.text.trim();
    if text.is_empty() {
        return false;
    }
    if contains_binary(text) {
        return false;
    }
    if !window.accepts(cmd.ordering_key, now) {
        return false;
    }
    !is_just_number(text)
}

/// Raw 0xFF bytes never reach a `String`; readers drop those lines.
fn contains_binary(text: &str) -> bool {
    text.contains('\0')
}

fn is_just_number(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}
