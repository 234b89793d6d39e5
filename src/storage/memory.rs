//! In-memory storage with a substring-capable token index.

use std::collections::BTreeMap;
use std::ops::Bound;

use tracing::debug;

use super::{DEFAULT_MAX_ITEMS, Storage, StorageStats};
use crate::history::{Command, by_frequency_desc, by_recency_desc};

/// Words longer than this (in chars) are not expanded into the index; their
/// commands are always re-checked by a scan instead.
const MAX_INDEXED_WORD: usize = 48;

/// Inverted index over lowercased whitespace-separated words.
///
/// Every suffix of every word is a key, so a key range starting at a query
/// term finds exactly the words that contain the term: whole words, prefixes
/// and inner substrings alike. A query term never contains whitespace, so it
/// can only occur inside a single word.
#[derive(Debug, Default)]
struct TokenIndex {
    lowered: Vec<String>,
    tokens: BTreeMap<String, Vec<usize>>,
    unindexed: Vec<usize>,
}

impl TokenIndex {
    fn build(commands: &[Command]) -> Self {
        let mut index = TokenIndex {
            lowered: Vec::with_capacity(commands.len()),
            ..Default::default()
        };

        for (pos, cmd) in commands.iter().enumerate() {
            let lower = cmd.text.to_lowercase();
            let mut has_long_word = false;

            for word in lower.split_whitespace() {
                if word.chars().count() > MAX_INDEXED_WORD {
                    has_long_word = true;
                    continue;
                }
                for (offset, _) in word.char_indices() {
                    let positions = index.tokens.entry(word[offset..].to_string()).or_default();
                    if positions.last() != Some(&pos) {
                        positions.push(pos);
                    }
                }
            }

            if has_long_word {
                index.unindexed.push(pos);
            }
            index.lowered.push(lower);
        }

        index
    }

    /// Sorted candidate positions for one lowercase term, or `None` when no
    /// indexed word contains it.
    fn lookup(&self, term: &str) -> Option<Vec<usize>> {
        let mut hits: Vec<usize> = self
            .tokens
            .range::<str, _>((Bound::Included(term), Bound::Unbounded))
            .take_while(|(token, _)| token.starts_with(term))
            .flat_map(|(_, positions)| positions.iter().copied())
            .collect();
        if hits.is_empty() {
            return None;
        }
        hits.extend_from_slice(&self.unindexed);
        hits.sort_unstable();
        hits.dedup();
        Some(hits)
    }

    fn contains(&self, pos: usize, term: &str) -> bool {
        self.lowered.get(pos).is_some_and(|text| text.contains(term))
    }
}

/// Holds the aggregated history and answers queries against it.
#[derive(Debug)]
pub struct MemoryStorage {
    commands: Vec<Command>,
    index: TokenIndex,
    max_items: usize,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_max_items(DEFAULT_MAX_ITEMS)
    }

    /// `max_items` bounds the result of an empty search.
    pub fn with_max_items(max_items: usize) -> Self {
        Self {
            commands: Vec::new(),
            index: TokenIndex::default(),
            max_items,
        }
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    fn matching_positions(&self, terms: &[&str]) -> Vec<usize> {
        let mut candidates: Option<Vec<usize>> = None;

        for term in terms {
            let pool = match (candidates.take(), self.index.lookup(term)) {
                (None, Some(hits)) => hits,
                (Some(current), Some(hits)) => intersect_sorted(&current, &hits),
                // not in the index: scan whatever is still in play
                (Some(current), None) => current,
                (None, None) => (0..self.commands.len()).collect(),
            };

            let verified: Vec<usize> = pool
                .into_iter()
                .filter(|&pos| self.index.contains(pos, term))
                .collect();
            if verified.is_empty() {
                return verified;
            }
            candidates = Some(verified);
        }

        candidates.unwrap_or_default()
    }
}

impl Storage for MemoryStorage {
    fn store(&mut self, mut commands: Vec<Command>) {
        commands.sort_by(by_recency_desc);
        let index = TokenIndex::build(&commands);
        debug!(
            "Indexed {} commands into {} tokens",
            commands.len(),
            index.tokens.len()
        );
        self.commands = commands;
        self.index = index;
    }

    fn search(&self, query: &str) -> Vec<Command> {
        let query = query.to_lowercase();
        let terms: Vec<&str> = query.split_whitespace().collect();
        if terms.is_empty() {
            return self.get_recent(self.max_items);
        }

        let mut results: Vec<Command> = self
            .matching_positions(&terms)
            .into_iter()
            .filter_map(|pos| self.commands.get(pos).cloned())
            .collect();
        results.sort_by(by_frequency_desc);
        results
    }

    fn get_by_frequency(&self) -> Vec<Command> {
        let mut commands = self.commands.clone();
        commands.sort_by(by_frequency_desc);
        commands
    }

    fn get_recent(&self, limit: usize) -> Vec<Command> {
        let take = if limit == 0 { self.commands.len() } else { limit };
        self.commands.iter().take(take).cloned().collect()
    }

    fn get_all(&self) -> Vec<Command> {
        self.commands.clone()
    }

    fn stats(&self) -> StorageStats {
        StorageStats {
            total_commands: self.commands.len(),
            unique_tokens: self.index.tokens.len(),
        }
    }
}

fn intersect_sorted(a: &[usize], b: &[usize]) -> Vec<usize> {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::OrderingKey;

    fn cmd(text: &str, ts: i64, count: u32) -> Command {
        let mut c = Command::new(text, OrderingKey::Timestamp(ts));
        c.count = count;
        c
    }

    fn sample() -> MemoryStorage {
        let mut storage = MemoryStorage::new();
        storage.store(vec![
            cmd("ls -la", 100, 5),
            cmd("git status", 300, 9),
            cmd("git commit -m 'Fix parser'", 200, 2),
            cmd("docker compose up -d", 400, 2),
            cmd("cargo test --workspace", 500, 1),
            cmd("GIT_TRACE=1 git fetch", 250, 2),
            cmd(&format!("curl https://example.com/{}", "x".repeat(80)), 50, 1),
        ]);
        storage
    }

    fn texts(commands: &[Command]) -> Vec<&str> {
        commands.iter().map(|c| c.text.as_str()).collect()
    }

    fn brute_force(storage: &MemoryStorage, query: &str) -> Vec<String> {
        let query = query.to_lowercase();
        let terms: Vec<&str> = query.split_whitespace().collect();
        let mut hits: Vec<String> = storage
            .get_all()
            .into_iter()
            .filter(|c| {
                let lower = c.text.to_lowercase();
                terms.iter().all(|t| lower.contains(t))
            })
            .map(|c| c.text)
            .collect();
        hits.sort();
        hits
    }

    #[test]
    fn test_empty_query_returns_recent() {
        let storage = sample();
        let results = storage.search("   ");
        assert_eq!(results.len(), 7);
        assert_eq!(results[0].text, "cargo test --workspace");
    }

    #[test]
    fn test_empty_query_is_bounded() {
        let mut storage = MemoryStorage::with_max_items(2);
        storage.store(sample().get_all());
        assert_eq!(storage.search("").len(), 2);
    }

    #[test]
    fn test_and_semantics() {
        let storage = sample();
        let results = storage.search("git fetch");
        assert_eq!(texts(&results), vec!["GIT_TRACE=1 git fetch"]);
    }

    #[test]
    fn test_results_ordered_by_frequency_then_recency() {
        let storage = sample();
        let results = storage.search("git");
        assert_eq!(
            texts(&results),
            vec!["git status", "GIT_TRACE=1 git fetch", "git commit -m 'Fix parser'"]
        );
    }

    #[test]
    fn test_inner_substring_matches() {
        let storage = sample();
        assert_eq!(texts(&storage.search("la")), vec!["ls -la"]);
        assert_eq!(texts(&storage.search("ompos")), vec!["docker compose up -d"]);
    }

    #[test]
    fn test_case_insensitive() {
        let storage = sample();
        assert_eq!(texts(&storage.search("FIX")), vec!["git commit -m 'Fix parser'"]);
    }

    #[test]
    fn test_long_words_still_match() {
        let storage = sample();
        assert_eq!(storage.search("xxxxxxxx").len(), 1);
        assert_eq!(storage.search("curl example.com").len(), 1);
    }

    #[test]
    fn test_no_match() {
        let storage = sample();
        assert!(storage.search("kubectl").is_empty());
        assert!(storage.search("git kubectl").is_empty());
    }

    #[test]
    fn test_index_agrees_with_brute_force() {
        let storage = sample();
        for query in [
            "git", "g", "t", "-", "=1", "git s", "it tat", "'", "up -d", "test work", "x", "com",
            "e c", "zz", "LS -LA", "--",
        ] {
            let mut got: Vec<String> = storage.search(query).into_iter().map(|c| c.text).collect();
            got.sort();
            assert_eq!(got, brute_force(&storage, query), "query {:?}", query);
        }
    }

    #[test]
    fn test_get_recent_respects_limit() {
        let storage = sample();
        let recent = storage.get_recent(3);
        assert_eq!(
            texts(&recent),
            vec!["cargo test --workspace", "docker compose up -d", "git status"]
        );
        assert_eq!(storage.get_recent(0).len(), 7);
        assert_eq!(storage.get_recent(100).len(), 7);
    }

    #[test]
    fn test_get_by_frequency() {
        let storage = sample();
        let by_freq = storage.get_by_frequency();
        assert_eq!(by_freq[0].text, "git status");
        assert_eq!(by_freq[1].text, "ls -la");
        // three commands share count 2: most recent first
        assert_eq!(
            texts(&by_freq[2..5]),
            vec!["docker compose up -d", "GIT_TRACE=1 git fetch", "git commit -m 'Fix parser'"]
        );
    }

    #[test]
    fn test_store_replaces_collection() {
        let mut storage = sample();
        storage.store(vec![cmd("htop", 1, 1)]);
        assert_eq!(storage.len(), 1);
        assert!(storage.search("git").is_empty());
        assert_eq!(storage.get_all()[0].text, "htop");
    }

    #[test]
    fn test_stats() {
        let mut storage = MemoryStorage::new();
        assert_eq!(storage.stats(), StorageStats::default());
        storage.store(vec![cmd("ab", 1, 1)]);
        // "ab" and "b"
        assert_eq!(
            storage.stats(),
            StorageStats {
                total_commands: 1,
                unique_tokens: 2
            }
        );
    }

    #[test]
    fn test_intersect_sorted() {
        assert_eq!(intersect_sorted(&[1, 3, 5, 7], &[2, 3, 4, 7, 9]), vec![3, 7]);
        assert!(intersect_sorted(&[], &[1]).is_empty());
    }
}
