//! Editor settings.
//!
//! A handful of knobs, fixed for the life of the process. The binary fills
//! them in from command-line flags; everything else takes a [`Config`] by
//! value.

use std::time::Duration;

/// Columns per tab stop.
pub const DEFAULT_TAB_STOP: usize = 8;

/// Extra Ctrl-Q presses needed to quit with unsaved changes.
pub const DEFAULT_QUIT_TIMES: usize = 3;

/// How long a status message stays on the message bar.
pub const DEFAULT_MESSAGE_TIMEOUT: Duration = Duration::from_secs(5);

/// Editor settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Columns per tab stop. Always at least 1.
    pub tab_stop: usize,
    /// Extra Ctrl-Q presses needed to quit a dirty document.
    pub quit_times: usize,
    /// Lifetime of a status message.
    pub message_timeout: Duration,
}

impl Config {
    /// The defaults: tab stop 8, three quit confirmations, five-second
    /// messages.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            tab_stop: DEFAULT_TAB_STOP,
            quit_times: DEFAULT_QUIT_TIMES,
            message_timeout: DEFAULT_MESSAGE_TIMEOUT,
        }
    }

    /// Set the tab stop, clamped to at least 1.
    #[must_use]
    pub const fn with_tab_stop(mut self, tab_stop: usize) -> Self {
        self.tab_stop = if tab_stop == 0 { 1 } else { tab_stop };
        self
    }

    #[must_use]
    pub const fn with_quit_times(mut self, quit_times: usize) -> Self {
        self.quit_times = quit_times;
        self
    }

    #[must_use]
    pub const fn with_message_timeout(mut self, timeout: Duration) -> Self {
        self.message_timeout = timeout;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = Config::default();
        assert_eq!(c.tab_stop, 8);
        assert_eq!(c.quit_times, 3);
        assert_eq!(c.message_timeout, Duration::from_secs(5));
    }

    #[test]
    fn tab_stop_clamped_to_one() {
        assert_eq!(Config::new().with_tab_stop(0).tab_stop, 1);
        assert_eq!(Config::new().with_tab_stop(4).tab_stop, 4);
    }

    #[test]
    fn builders_chain() {
        let c = Config::new()
            .with_quit_times(0)
            .with_message_timeout(Duration::from_millis(250));
        assert_eq!(c.quit_times, 0);
        assert_eq!(c.message_timeout, Duration::from_millis(250));
        assert_eq!(c.tab_stop, DEFAULT_TAB_STOP);
    }
}
