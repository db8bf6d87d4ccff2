//! Positional search over the scrollback buffer.

pub mod core;
mod matcher;

pub use self::core::{Match, SearchEngine, SearchOptions, SearchState};
