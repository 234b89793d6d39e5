//! Query surface over the aggregated history.
//!
//! The presentation layer only talks to [`Storage`]. [`MemoryStorage`] is the
//! one implementation today: the whole collection lives in memory with a
//! token index built on every [`Storage::store`].

mod memory;

pub use memory::MemoryStorage;

use crate::history::Command;

/// Default cap for an empty search.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Size figures for the status bar.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub total_commands: usize,
    pub unique_tokens: usize,
}

pub trait Storage {
    /// Replace the whole collection. The new data is fully indexed before it
    /// becomes visible to queries.
    fn store(&mut self, commands: Vec<Command>);

    /// Commands containing every whitespace-separated term of `query`
    /// (case-insensitive), most frequent first. An empty query returns the
    /// most recent commands.
    fn search(&self, query: &str) -> Vec<Command>;

    /// Most frequent first, ties by recency.
    fn get_by_frequency(&self) -> Vec<Command>;

    /// The `limit` most recent commands; `0` returns all of them.
    fn get_recent(&self, limit: usize) -> Vec<Command>;

    /// Every command, most recent first.
    fn get_all(&self) -> Vec<Command>;

    fn stats(&self) -> StorageStats;
}
