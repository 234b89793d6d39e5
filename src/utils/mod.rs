//! Shared helpers: file logging, clipboard and the terminal cleanup guard.

pub mod clipboard;
pub mod context;
pub mod logger;
