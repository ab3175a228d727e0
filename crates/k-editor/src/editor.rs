//! Editor: the key bindings and the state that outlives a single key.
//!
//! [`Editor`] owns the one [`Pane`], the settings, the status message, the
//! open prompt if there is one, and the unsaved-quit countdown. It plugs
//! into the terminal's event loop as an [`App`]: every decoded key goes
//! through [`Editor::process_key`], every frame through [`render`].
//!
//! Bindings:
//!
//! | Key                 | Action                                     |
//! |---------------------|--------------------------------------------|
//! | Ctrl-Q              | quit; a dirty document needs extra presses |
//! | Ctrl-S              | save, asking for a name if there is none   |
//! | Ctrl-F              | incremental search                         |
//! | Enter               | split the line                             |
//! | Backspace, Ctrl-H   | delete before the cursor                   |
//! | Delete              | delete under the cursor                    |
//! | arrows, Home, End, PageUp, PageDown | move                       |
//! | Ctrl-L, Escape      | nothing                                    |
//! | anything else       | insert the byte                            |
//!
//! While a prompt is open it gets every key instead.

use std::io;
use std::path::Path;

use k_term::event_loop::{Action, App};
use k_term::input::{CTRL_F, CTRL_H, CTRL_L, CTRL_Q, CTRL_S, ENTER, Key};
use k_term::output::OutputBuffer;
use k_term::terminal::Size;

use crate::config::Config;
use crate::document::Document;
use crate::error::Result;
use crate::pane::Pane;
use crate::prompt::{Prompt, PromptOutcome};
use crate::render::{self, Frame};
use crate::search::Search;
use crate::status::StatusMessage;
use crate::view::{Cursor, Viewport};

/// Shown at startup.
pub const HELP_MESSAGE: &str = "HELP: Ctrl-S = save | Ctrl-Q = quit | Ctrl-F = find";

const SAVE_AS_PROMPT: &str = "Save as: {} (ESC to cancel)";
const SEARCH_PROMPT: &str = "Search: {} (Use ESC/Arrows/Enter)";

// ---------------------------------------------------------------------------
// Prompt bookkeeping
// ---------------------------------------------------------------------------

/// What an open prompt is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptPurpose {
    SaveAs,
    Find,
}

#[derive(Debug)]
struct ActivePrompt {
    prompt: Prompt,
    purpose: PromptPurpose,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// The whole editor state.
#[derive(Debug)]
pub struct Editor {
    pane: Pane,
    config: Config,
    status: StatusMessage,
    prompt: Option<ActivePrompt>,
    /// Ctrl-Q presses still needed to abandon unsaved changes.
    quit_times: usize,
}

impl Editor {
    /// An editor on `doc`, showing the help message.
    ///
    /// The viewport starts at the fallback terminal size; the event loop
    /// reports the real size before the first frame.
    #[must_use]
    pub fn new(doc: Document, config: Config) -> Self {
        Self {
            pane: Pane::new(doc, Viewport::default()),
            config,
            status: StatusMessage::new(HELP_MESSAGE),
            prompt: None,
            quit_times: config.quit_times,
        }
    }

    /// An editor on the file at `path`.
    ///
    /// # Errors
    ///
    /// See [`Document::open`].
    pub fn open(path: &Path, config: Config) -> Result<Self> {
        let doc = Document::open(path, config.tab_stop)?;
        Ok(Self::new(doc, config))
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn pane(&self) -> &Pane {
        &self.pane
    }

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        self.pane.document()
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.pane.cursor()
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub const fn status(&self) -> &StatusMessage {
        &self.status
    }

    /// Whether a prompt currently owns the keyboard.
    #[inline]
    #[must_use]
    pub const fn is_prompting(&self) -> bool {
        self.prompt.is_some()
    }

    /// The open prompt's message bar line.
    #[must_use]
    pub fn prompt_message(&self) -> Option<String> {
        self.prompt.as_ref().map(|active| active.prompt.message())
    }

    /// Replace the status message.
    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status.set(text);
    }

    // -- Editing ------------------------------------------------------------

    pub fn insert_char(&mut self, ch: u8) {
        self.pane.insert_char(ch);
    }

    pub fn insert_newline(&mut self) {
        self.pane.insert_newline();
    }

    pub fn delete_char(&mut self) {
        self.pane.delete_char();
    }

    pub fn move_cursor(&mut self, key: Key) {
        self.pane.move_cursor(key);
    }

    // -- Keys ---------------------------------------------------------------

    /// Apply one key.
    pub fn process_key(&mut self, key: Key) -> Action {
        if self.prompt.is_some() {
            self.prompt_key(key);
            self.quit_times = self.config.quit_times;
            return Action::Continue;
        }

        match key {
            Key::Byte(CTRL_Q) => {
                if self.pane.document().is_dirty() && self.quit_times > 0 {
                    self.set_status(format!(
                        "WARNING!!! File has unsaved changes. Press Ctrl-Q {} more times to quit.",
                        self.quit_times
                    ));
                    tracing::info!(remaining = self.quit_times, "quit_guard");
                    self.quit_times -= 1;
                    return Action::Continue;
                }
                tracing::info!(dirty = self.pane.document().is_dirty(), "quit");
                return Action::Quit;
            }
            Key::Byte(CTRL_S) => self.save(),
            Key::Byte(CTRL_F) => self.find(),
            Key::Byte(ENTER) => self.insert_newline(),
            Key::Backspace | Key::Byte(CTRL_H) => self.delete_char(),
            Key::Delete => self.pane.delete_forward(),
            Key::Home => self.pane.move_home(),
            Key::End => self.pane.move_end(),
            Key::PageUp => self.pane.page_up(),
            Key::PageDown => self.pane.page_down(),
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key);
            }
            Key::Byte(CTRL_L) | Key::Escape => {}
            Key::Byte(b) => self.insert_char(b),
        }

        self.quit_times = self.config.quit_times;
        Action::Continue
    }

    /// Route a key to the open prompt and act on how it ended.
    fn prompt_key(&mut self, key: Key) {
        let Some(mut active) = self.prompt.take() else {
            return;
        };

        match active.prompt.handle_key(&mut self.pane, key) {
            PromptOutcome::Pending => self.prompt = Some(active),
            PromptOutcome::Cancelled => {
                self.status.clear();
                if active.purpose == PromptPurpose::SaveAs {
                    self.set_status("Save aborted");
                }
            }
            PromptOutcome::Submitted(input) => {
                self.status.clear();
                if active.purpose == PromptPurpose::SaveAs {
                    self.pane.document_mut().set_filename(input);
                    self.save();
                }
            }
        }
    }

    // -- Commands -----------------------------------------------------------

    /// Save under the current name, or ask for one.
    pub fn save(&mut self) {
        if self.pane.document().filename().is_none() {
            self.prompt = Some(ActivePrompt {
                prompt: Prompt::new(SAVE_AS_PROMPT),
                purpose: PromptPurpose::SaveAs,
            });
            return;
        }

        match self.pane.document_mut().save() {
            Ok(written) => self.set_status(format!("{written} bytes written to disk")),
            Err(e) => {
                tracing::warn!(target: "io", error = %e, "file_write_failed");
                self.set_status(format!("Can't save! I/O error: {e}"));
            }
        }
    }

    /// Open the search prompt.
    pub fn find(&mut self) {
        let search = Search::new(&self.pane);
        self.prompt = Some(ActivePrompt {
            prompt: Prompt::new(SEARCH_PROMPT).with_callback(search),
            purpose: PromptPurpose::Find,
        });
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

impl App for Editor {
    fn on_key(&mut self, key: Key) -> Action {
        self.process_key(key)
    }

    fn on_resize(&mut self, size: Size) {
        self.pane.viewport_mut().resize(size);
    }

    fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
        self.pane.scroll();

        let prompt_line = self.prompt_message();
        let message = prompt_line
            .as_deref()
            .or_else(|| self.status.visible(self.config.message_timeout));

        let frame = Frame {
            doc: self.pane.document(),
            cursor: self.pane.cursor(),
            rx: self.pane.rx(),
            view: self.pane.viewport(),
            message,
        };
        render::render(out, &frame)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
