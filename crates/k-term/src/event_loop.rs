// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Event loop: render, read one key, dispatch, repeat.
//
// The editor is strictly synchronous. Each iteration paints the whole
// frame into an `OutputBuffer`, writes it with one flush, then blocks until
// a key arrives and hands it to the application. Nothing else runs in
// between, so the application owns its state outright and needs no locks.
//
// # Waiting for input
//
// Reads are bounded (about 100 ms). The loop waits for the first byte of
// a key itself rather than letting `read_key` retry, so that between
// timeouts it can notice a resize and repaint without a keypress. Once a
// byte arrives, `decode_key` finishes the escape sequence, if any.
//
// # SIGWINCH Handling
//
// Terminal resize is detected via a SIGWINCH handler that sets an
// `AtomicBool`. The signal also interrupts `poll()`, so the flag is seen
// on the very next timeout check.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::input::{self, Key};
use crate::output::OutputBuffer;
use crate::reader::{ByteSource, StdinReader};
use crate::terminal::{Size, Terminal};

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler. Checked between reads.
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

/// Install a signal handler for SIGWINCH (terminal resize).
///
/// The handler only sets [`SIGWINCH_RECEIVED`]. Storing to an atomic is
/// async-signal-safe.
#[cfg(unix)]
fn install_sigwinch_handler() {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {}

// ─── App Trait ───────────────────────────────────────────────────────────────

/// What the application tells the event loop to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Continue running.
    Continue,
    /// Exit the event loop cleanly.
    Quit,
}

/// Application interface for the event loop.
///
/// Each iteration the loop calls [`paint`](App::paint), flushes the frame,
/// then calls [`on_key`](App::on_key) with the next key.
/// [`on_resize`](App::on_resize) runs once before the first frame and again
/// whenever the terminal size changes.
pub trait App {
    /// Handle one decoded key.
    ///
    /// Return [`Action::Quit`] to exit the event loop.
    fn on_key(&mut self, key: Key) -> Action;

    /// Handle terminal resize. Default: ignore.
    fn on_resize(&mut self, _size: Size) {}

    /// Paint the whole frame into `out`.
    ///
    /// The buffer is empty on entry. The loop flushes it in one write
    /// after this returns.
    ///
    /// # Errors
    ///
    /// Formatting into the buffer; in practice infallible.
    fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()>;
}

// ─── Driver ──────────────────────────────────────────────────────────────────

/// Run `app` against any byte source and output sink.
///
/// `poll_resize` is consulted every time a read times out; returning a new
/// size triggers [`App::on_resize`] and a repaint. This is the whole loop
/// minus the terminal, which lets tests drive an application end to end
/// with a [`ScriptedSource`](crate::reader::ScriptedSource) and a `Vec<u8>`.
///
/// # Errors
///
/// Returns the first read or write error. Both are fatal to the editor.
pub fn drive(
    app: &mut impl App,
    source: &mut impl ByteSource,
    sink: &mut impl Write,
    mut poll_resize: impl FnMut() -> Option<Size>,
) -> io::Result<()> {
    let mut out = OutputBuffer::new();

    loop {
        paint_frame(app, &mut out, sink)?;

        let key = loop {
            match source.read_byte()? {
                Some(first) => break input::decode_key(first, source)?,
                None => {
                    if let Some(size) = poll_resize() {
                        app.on_resize(size);
                        paint_frame(app, &mut out, sink)?;
                    }
                }
            }
        };

        if app.on_key(key) == Action::Quit {
            return Ok(());
        }
    }
}

fn paint_frame(
    app: &mut impl App,
    out: &mut OutputBuffer,
    sink: &mut impl Write,
) -> io::Result<()> {
    out.clear();
    app.paint(out)?;
    out.flush_to(sink)
}

// ─── EventLoop ───────────────────────────────────────────────────────────────

/// The terminal event loop.
///
/// Owns the terminal and the stdin reader. Call [`run`](Self::run) to
/// enter the loop; it returns when the application signals
/// [`Action::Quit`] or when input or output fails.
///
/// # Example
///
/// ```no_run
/// use std::io;
///
/// use k_term::event_loop::{Action, App, EventLoop};
/// use k_term::input::{Key, CTRL_Q};
/// use k_term::output::OutputBuffer;
///
/// struct MyApp;
///
/// impl App for MyApp {
///     fn on_key(&mut self, key: Key) -> Action {
///         if key == Key::Byte(CTRL_Q) {
///             return Action::Quit;
///         }
///         Action::Continue
///     }
///
///     fn paint(&mut self, out: &mut OutputBuffer) -> io::Result<()> {
///         out.append(b"hello");
///         Ok(())
///     }
/// }
///
/// EventLoop::new().run(&mut MyApp)?;
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct EventLoop {
    terminal: Terminal,
    reader: StdinReader,
}

impl EventLoop {
    /// Create an event loop over the process's terminal.
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            reader: StdinReader::new(),
        }
    }

    /// Run the event loop until the application returns [`Action::Quit`].
    ///
    /// Enters raw mode, reports the measured size to the application,
    /// installs the SIGWINCH handler, then loops. The terminal is restored
    /// on the way out whether the loop ended cleanly or not.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode or the size query fails, or if the loop
    /// hits a read or write error.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_sigwinch_handler();
        app.on_resize(self.terminal.size());

        let terminal = &mut self.terminal;
        let result = drive(app, &mut self.reader, &mut io::stdout(), || {
            if SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed) {
                Some(terminal.refresh_size())
            } else {
                None
            }
        });

        // Always clean up, even if the loop errored.
        let left = self.terminal.leave();
        result.and(left)
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
