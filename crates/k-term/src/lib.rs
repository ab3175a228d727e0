// SPDX-License-Identifier: MIT
//
// k-term: the terminal layer for k-edit.
//
// Everything between the editor and the tty lives here: raw mode via
// termios, the window size query (with its escape-sequence fallback),
// a byte source that waits a bounded time per byte, the decoder that
// folds escape sequences into logical keys, and the append buffer that
// turns a whole frame into one write().
//
// No TUI framework sits underneath. The editor speaks plain VT100:
// a handful of cursor, erase and SGR sequences, each defined once in
// `ansi` and reached through a named helper.

pub mod ansi;
pub mod event_loop;
pub mod input;
pub mod output;
pub mod reader;
pub mod terminal;
