//! # termscroll - Bounded Scrollback for Terminal UIs
//!
//! A thread-safe scrollback buffer that stores timestamped, context-tagged
//! lines, searches them (literal or regex) and exports any line range as
//! plain text, ANSI, Markdown or HTML.
//!
//! ## Features
//!
//! - **Bounded Memory**: Oldest lines are evicted once `max_lines` is reached
//! - **Concurrent Producers**: Any number of threads append through an `Arc<LineStore>`
//! - **Positional Search**: memchr literal search, ripgrep's regex matcher for the rest
//! - **Multi-format Export**: Atomic file writes, no partial output on failure
//!
//! ## Architecture
//!
//! - [`error`] - Centralized error types and handling
//! - [`buffer`] - Line store, ring buffer and line metadata
//! - [`scroll`] - Scroll cursor over the store
//! - [`search`] - Search engine and match navigation
//! - [`export`] - Export encoder
//! - [`theme`], [`status`] - Presentation values consumed by renderers
//! - [`console`] - Single-threaded facade tying everything together
//! - [`config`] - Runtime configuration

// Core modules
pub mod buffer;
pub mod error;

// Consumers of the store
pub mod export;
pub mod scroll;
pub mod search;

// Presentation and facade
pub mod config;
pub mod console;
pub mod status;
pub mod theme;

// Re-export commonly used types for convenience
pub use error::{Result, TermscrollError};

pub use buffer::{Epoch, Line, LineContext, LineMeta, LineStore};
pub use config::Config;
pub use console::Console;
pub use export::{ExportConfig, ExportFormat, Exporter};
pub use scroll::{ScrollCursor, ScrollState};
pub use search::{Match, SearchEngine, SearchOptions};
pub use status::StatusBar;
pub use theme::Theme;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
