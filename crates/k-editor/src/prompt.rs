//! Prompt: one line of input collected on the message bar.
//!
//! While a prompt is open it owns the keyboard. The message bar shows its
//! template with the typed text substituted for `{}`, and every key edits
//! the text, cancels, or submits:
//!
//! | Key                          | Effect                               |
//! |------------------------------|--------------------------------------|
//! | Backspace, Delete, Ctrl-H    | drop the last byte                   |
//! | Escape                       | cancel, no input                     |
//! | Enter                        | submit, but only if the text is non-empty |
//! | printable ASCII              | append                               |
//!
//! A prompt may carry a [`PromptCallback`], called after every key with
//! the current text and the key, including the Escape or Enter that ends
//! the prompt. Incremental search hangs off this hook.

use std::fmt;

use k_term::input::{CTRL_H, ENTER, Key};

use crate::pane::Pane;

// ---------------------------------------------------------------------------
// PromptCallback
// ---------------------------------------------------------------------------

/// Per-keystroke hook for a prompt.
///
/// Closures of the right shape implement this automatically.
pub trait PromptCallback {
    /// Called after the prompt handled `key`; `input` is the text so far.
    fn on_key(&mut self, pane: &mut Pane, input: &str, key: Key);
}

impl<F> PromptCallback for F
where
    F: FnMut(&mut Pane, &str, Key),
{
    fn on_key(&mut self, pane: &mut Pane, input: &str, key: Key) {
        self(pane, input, key);
    }
}

// ---------------------------------------------------------------------------
// Prompt
// ---------------------------------------------------------------------------

/// What a key did to the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Still collecting.
    Pending,
    /// Escape: the prompt is over and produced nothing.
    Cancelled,
    /// Enter on non-empty text: the prompt is over.
    Submitted(String),
}

/// An open prompt.
pub struct Prompt {
    template: String,
    input: String,
    callback: Option<Box<dyn PromptCallback>>,
}

impl Prompt {
    /// A prompt showing `template`, where `{}` marks the input.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            input: String::new(),
            callback: None,
        }
    }

    /// Attach a per-keystroke callback.
    #[must_use]
    pub fn with_callback(mut self, callback: impl PromptCallback + 'static) -> Self {
        self.callback = Some(Box::new(callback));
        self
    }

    /// The text typed so far.
    #[inline]
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The line for the message bar: the template with the input filled in.
    #[must_use]
    pub fn message(&self) -> String {
        self.template.replacen("{}", &self.input, 1)
    }

    /// Apply one key.
    pub fn handle_key(&mut self, pane: &mut Pane, key: Key) -> PromptOutcome {
        let outcome = match key {
            Key::Backspace | Key::Delete | Key::Byte(CTRL_H) => {
                self.input.pop();
                PromptOutcome::Pending
            }
            Key::Escape => PromptOutcome::Cancelled,
            Key::Byte(ENTER) if !self.input.is_empty() => {
                PromptOutcome::Submitted(self.input.clone())
            }
            Key::Byte(b) if key.is_printable() => {
                self.input.push(char::from(b));
                PromptOutcome::Pending
            }
            _ => PromptOutcome::Pending,
        };

        if let Some(callback) = self.callback.as_mut() {
            callback.on_key(pane, &self.input, key);
        }

        outcome
    }
}

impl fmt::Debug for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Prompt")
            .field("template", &self.template)
            .field("input", &self.input)
            .field("has_callback", &self.callback.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
