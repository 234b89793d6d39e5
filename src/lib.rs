//! history-nav: browse, search and copy commands from your shell history.
//!
//! The library reads zsh (extended) and bash (plain) history files, merges
//! repeated commands with a count, drops noise and secrets matching the
//! configured exclude patterns, and answers queries through [`Storage`].
//!
//! # Example
//!
//! ```no_run
//! use history_nav::{HistoryReader, MemoryStorage, Storage};
//!
//! let mut reader = HistoryReader::new(["/home/me/.zsh_history", "/home/me/.bash_history"]);
//! if let Err(e) = reader.set_exclude_patterns(&["password", "token"]) {
//!     eprintln!("{}", e);
//! }
//!
//! let mut storage = MemoryStorage::new();
//! storage.store(reader.read_history());
//! for cmd in storage.search("git push") {
//!     println!("{:>4}  {}", cmd.count, cmd.text);
//! }
//! ```

pub mod app;
pub mod config;
pub mod errors;
pub mod event;
pub mod history;
pub mod storage;
pub mod templates;
pub mod ui;
pub mod utils;

pub use app::App;
pub use config::Config;
pub use errors::{ConfigError, TemplateError};
pub use history::{Command, HistoryReader, OrderingKey};
pub use storage::{MemoryStorage, Storage};
pub use templates::{Template, TemplateLoader};
