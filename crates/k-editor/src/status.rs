//! The status message shown on the message bar.
//!
//! A message carries the moment it was set and is only drawn while it is
//! younger than the configured timeout. Setting a new message restarts the
//! clock.

use std::time::{Duration, Instant};

/// A timed status message.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
}

impl StatusMessage {
    /// A message set now.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            set_at: Instant::now(),
        }
    }

    /// Replace the text and restart the clock.
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.set_at = Instant::now();
    }

    /// Blank the message.
    pub fn clear(&mut self) {
        self.set(String::new());
    }

    /// The text, whether or not it has expired.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text if it is still younger than `timeout` at `now`.
    #[must_use]
    pub fn visible_at(&self, now: Instant, timeout: Duration) -> Option<&str> {
        let age = now.saturating_duration_since(self.set_at);
        (!self.text.is_empty() && age < timeout).then_some(self.text.as_str())
    }

    /// The text if it is still fresh.
    #[must_use]
    pub fn visible(&self, timeout: Duration) -> Option<&str> {
        self.visible_at(Instant::now(), timeout)
    }
}

impl Default for StatusMessage {
    fn default() -> Self {
        Self::new(String::new())
    }
}
