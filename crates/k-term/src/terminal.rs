// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control and have no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// This module owns the terminal's raw state. It turns off echo, canonical
// line buffering, signal keys, flow control and output post-processing,
// and guarantees the original settings come back on drop, even if the
// editor panics mid-frame.
//
// The panic hook bypasses Rust's stdout lock and writes a pre-built
// restore sequence straight to fd 1, so a panic raised while the lock is
// held (during a frame flush) cannot deadlock. Then termios is restored
// from a global backup and the original handler prints its message to a
// working terminal.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::reader::{ByteSource, StdinReader};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// The size assumed before the first successful query.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports zero columns.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            cols: ws.ws_col,
            rows: ws.ws_row,
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Longest cursor position report we are willing to buffer.
const MAX_REPORT_LEN: usize = 32;

/// Measure the screen by parking the cursor in the far corner and asking
/// the terminal where it ended up.
///
/// The probe goes to `sink` and the `ESC [ rows ; cols R` reply is read
/// from `source`, stopping at `R`, after a timeout, or once the reply grows
/// past any sane length. Needs raw mode, or the reply waits for Enter.
///
/// # Errors
///
/// Returns an error if writing the probe or reading the reply fails, or if
/// the reply cannot be parsed.
pub fn query_size_via_cursor(
    source: &mut impl ByteSource,
    sink: &mut impl Write,
) -> io::Result<Size> {
    ansi::probe_screen_size(sink)?;
    sink.flush()?;

    let mut reply = Vec::with_capacity(MAX_REPORT_LEN);
    while reply.len() < MAX_REPORT_LEN {
        match source.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => reply.push(b),
        }
    }

    match ansi::parse_cursor_report(&reply) {
        Some((rows, cols)) if rows > 0 && cols > 0 => Ok(Size { cols, rows }),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "could not determine the window size",
        )),
    }
}

/// The window size, by `ioctl` if possible, else by the cursor probe over
/// stdin and stdout.
///
/// # Errors
///
/// Returns an error if both methods fail.
pub fn query_size() -> io::Result<Size> {
    if let Some(size) = get_size() {
        return Ok(size);
    }
    tracing::debug!("TIOCGWINSZ unavailable, probing with the cursor");
    let stdout = io::stdout();
    let mut lock = stdout.lock();
    query_size_via_cursor(&mut StdinReader::new(), &mut lock)
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of original termios for panic recovery.
///
/// The [`Terminal`] struct owns its own copy, but the panic hook can't
/// access it. This global backup, behind a [`Mutex`] rather than a
/// `static mut`, lets the hook restore cooked mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Terminal restore sequence for emergency use.
///
/// Reset SGR attributes, show the cursor, clear the screen, home the
/// cursor. The clear comes last so the panic message that follows starts
/// on a clean screen.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[m\x1b[?25h\x1b[2J\x1b[H";

/// Panic hook guard: the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Without this, a panic in raw mode leaves the user's terminal broken:
/// no echo, no line editing, no way to read the error message.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the restore sequence directly to stdout's file descriptor,
/// bypassing the `io::stdout()` lock.
fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to raw mode and measure the
/// window. The terminal is restored when the handle is dropped, and by the
/// panic hook if the process panics.
///
/// # Example
///
/// ```no_run
/// use k_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... render frames, handle input ...
/// // Terminal is restored automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original_termios: Option<libc::termios>,

    /// Current terminal size (cached, refresh with [`refresh_size`](Self::refresh_size)).
    size: Size,

    /// Whether raw mode is on.
    active: bool,
}

impl Terminal {
    /// Create a terminal handle.
    ///
    /// Does **not** enter raw mode. The size is taken from `ioctl` when
    /// available and is otherwise 80×24 until [`enter`](Self::enter)
    /// measures it.
    #[must_use]
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original_termios: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    /// Current terminal size (columns, rows).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Re-query the terminal size from the OS.
    ///
    /// Call this after SIGWINCH. Keeps the cached size if `ioctl` fails;
    /// the cursor probe is only used once, on entry, since it would
    /// swallow any keys typed while it runs.
    pub fn refresh_size(&mut self) -> Size {
        if let Some(s) = get_size() {
            if s != self.size {
                tracing::debug!(cols = s.cols, rows = s.rows, "terminal resized");
            }
            self.size = s;
        }
        self.size
    }

    /// Whether raw mode is on.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Enter raw mode and measure the window.
    ///
    /// Idempotent: calling `enter()` while already active is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if raw mode cannot be set, or if the window size
    /// cannot be determined either way. Raw mode is undone before a size
    /// error is returned.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.is_active() {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;
        self.active = true;

        match query_size() {
            Ok(size) => {
                self.size = size;
                tracing::debug!(cols = size.cols, rows = size.rows, "entered raw mode");
                Ok(())
            }
            Err(e) => {
                let _ = self.leave();
                Err(e)
            }
        }
    }

    /// Clear the screen and restore the original terminal settings.
    ///
    /// Idempotent: calling `leave()` while inactive is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.is_active() {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::reset(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::cursor_home(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        tracing::debug!("left raw mode");
        Ok(())
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        use std::os::unix::io::AsRawFd;

        if !is_tty() {
            return Ok(());
        }

        let fd = io::stdin().as_raw_fd();

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original_termios = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            // No break-to-SIGINT, no CR→NL, no parity check, no 8th-bit
            // strip, no Ctrl-S/Ctrl-Q flow control.
            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            // No "\n" → "\r\n" translation on output.
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            // No echo, byte-at-a-time input, no Ctrl-V, no Ctrl-C/Ctrl-Z.
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);

            // VMIN=0, VTIME=1: read() returns after at most 100 ms.
            termios.c_cc[libc::VMIN] = 0;
            termios.c_cc[libc::VTIME] = 1;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original_termios {
            use std::os::unix::io::AsRawFd;
            let fd = io::stdin().as_raw_fd();

            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original_termios = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::ScriptedSource;

    // ── Size ──────────────────────────────────────────────────────────

    #[test]
    fn fallback_size() {
        assert_eq!(Size::FALLBACK, Size { cols: 80, rows: 24 });
    }

    #[test]
    fn size_is_copy() {
        let a = Size { cols: 80, rows: 24 };
        let b = a;
        assert_eq!(a, b);
    }

    // ── Cursor probe ──────────────────────────────────────────────────

    #[test]
    fn probe_reads_report() {
        let mut source = ScriptedSource::new(b"\x1b[24;80R");
        let mut sink = Vec::new();
        let size = query_size_via_cursor(&mut source, &mut sink).unwrap();
        assert_eq!(size, Size { cols: 80, rows: 24 });
        assert_eq!(sink, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn probe_stops_at_terminator() {
        let mut source = ScriptedSource::new(b"\x1b[50;132Rq");
        let mut sink = Vec::new();
        let size = query_size_via_cursor(&mut source, &mut sink).unwrap();
        assert_eq!(size, Size { cols: 132, rows: 50 });
        // The keypress after the report is left for the editor.
        assert_eq!(source.remaining(), 1);
    }

    #[test]
    fn probe_accepts_report_cut_by_timeout() {
        let mut source = ScriptedSource::new(b"\x1b[30;100");
        let size = query_size_via_cursor(&mut source, &mut Vec::new()).unwrap();
        assert_eq!(size, Size { cols: 100, rows: 30 });
    }

    #[test]
    fn probe_without_reply_fails() {
        let mut source = ScriptedSource::new(b"");
        let err = query_size_via_cursor(&mut source, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn probe_with_garbage_fails() {
        let mut source = ScriptedSource::new(b"hello there");
        assert!(query_size_via_cursor(&mut source, &mut Vec::new()).is_err());
    }

    #[test]
    fn probe_with_zero_size_fails() {
        let mut source = ScriptedSource::new(b"\x1b[0;80R");
        assert!(query_size_via_cursor(&mut source, &mut Vec::new()).is_err());
    }

    #[test]
    fn probe_bounds_runaway_reply() {
        let mut source = ScriptedSource::new(&[b'9'; 100]);
        assert!(query_size_via_cursor(&mut source, &mut Vec::new()).is_err());
        assert_eq!(source.remaining(), 100 - MAX_REPORT_LEN);
    }

    #[test]
    fn probe_read_error_propagates() {
        let mut source = ScriptedSource::failing_after(b"\x1b[2");
        let err = query_size_via_cursor(&mut source, &mut Vec::new()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    // ── Terminal queries ─────────────────────────────────────────────

    #[test]
    fn get_size_does_not_panic() {
        let _ = get_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    // ── Emergency restore sequence ──────────────────────────────────

    #[test]
    fn emergency_restore_shows_cursor_and_clears() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[m"), "must reset SGR attributes");
        assert!(s.contains("\x1b[?25h"), "must show cursor");
        assert!(s.ends_with("\x1b[2J\x1b[H"));
    }

    // ── Terminal struct ─────────────────────────────────────────────

    #[test]
    fn terminal_new_is_inactive() {
        let term = Terminal::new();
        assert!(!term.is_active());
        let s = term.size();
        assert!(s.cols > 0);
        assert!(s.rows > 0);
    }

    #[test]
    fn terminal_leave_without_enter() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_drop_without_enter() {
        let term = Terminal::default();
        drop(term);
    }

    #[test]
    fn terminal_refresh_size() {
        let mut term = Terminal::new();
        let s = term.refresh_size();
        assert!(s.cols > 0);
        assert!(s.rows > 0);
        assert_eq!(s, term.size());
    }
}
