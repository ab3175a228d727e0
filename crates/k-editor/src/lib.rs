//! # k-editor: editor core for k-edit
//!
//! Everything that knows about text lives here. The terminal side (raw mode,
//! key decoding, the append buffer, the event loop) is in `k-term`.
//!
//! - **[`row`]**: one line as typed plus its tab-expanded render form
//! - **[`document`]**: the ordered rows, dirty counter, filename, file I/O
//! - **[`view`]**: the cursor and the scrolling viewport
//! - **[`pane`]**: a document with its cursor and viewport; cursor-level edits
//! - **[`search`]**: incremental, direction-aware substring search
//! - **[`prompt`]**: one-line input on the message bar with a per-key callback
//! - **[`status`]**: the timed status message
//! - **[`render`]**: composes a whole frame into one `OutputBuffer`
//! - **[`editor`]**: key bindings, save, quit guard; implements `k_term::event_loop::App`
//! - **[`config`]** and **[`error`]**: settings and the crate's error type

pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod pane;
pub mod prompt;
pub mod render;
pub mod row;
pub mod search;
pub mod status;
pub mod view;

pub use config::Config;
pub use document::Document;
pub use editor::Editor;
pub use error::{Error, Result};

/// Version shown in the greeting on an empty document.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
