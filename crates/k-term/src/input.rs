// SPDX-License-Identifier: MIT
//
// Terminal input decoder.
//
// Turns raw stdin bytes into logical keys. The editor only cares about a
// small vocabulary: plain bytes (printable or control), Escape, Backspace,
// the four arrows, Home/End, Page Up/Down and Delete. Terminals encode the
// symbolic keys as escape sequences, and not all of them agree:
//
//   Home      ESC [ H   ESC O H   ESC [ 1 ~   ESC [ 7 ~
//   End       ESC [ F   ESC O F   ESC [ 4 ~   ESC [ 8 ~
//   Delete    ESC [ 3 ~
//   PageUp    ESC [ 5 ~
//   PageDown  ESC [ 6 ~
//   Arrows    ESC [ A / B / C / D
//
// # Design
//
// Decoding pulls bytes one at a time from a `ByteSource` whose reads are
// bounded. After an ESC we try to read the rest of the sequence; if the
// source times out, the user pressed Escape on its own. Anything we do not
// recognise also becomes Escape: terminal quirks are expected, so an odd
// sequence is dropped rather than reported.

use std::io;

use crate::reader::ByteSource;

// ─── Keys ────────────────────────────────────────────────────────────────────

/// A logical key produced by [`read_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Any byte that is not part of an escape sequence, including control
    /// bytes such as Enter (`\r`), Tab and Ctrl-letter combinations.
    Byte(u8),
    /// A standalone ESC, or an escape sequence we don't decode.
    Escape,
    /// The DEL byte (0x7F) most terminals send for the Backspace key.
    Backspace,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
}

impl Key {
    /// Whether this is a plain byte that the editor would insert as text or
    /// append to a prompt: ASCII, not a control character.
    #[inline]
    #[must_use]
    pub const fn is_printable(self) -> bool {
        matches!(self, Self::Byte(b) if b.is_ascii() && !b.is_ascii_control())
    }
}

// ─── Byte constants ──────────────────────────────────────────────────────────

/// The escape byte that opens every control sequence.
pub const ESC: u8 = 0x1b;
/// The byte sent by Backspace on most terminals.
pub const DEL: u8 = 0x7f;
/// Enter in raw mode (ICRNL is off, so no translation to `\n`).
pub const ENTER: u8 = b'\r';

/// Mirror what the terminal does for Ctrl+letter: clear the top three bits.
#[inline]
#[must_use]
pub const fn ctrl_key(key: u8) -> u8 {
    key & 0x1f
}

/// Ctrl-F.
pub const CTRL_F: u8 = ctrl_key(b'f');
/// Ctrl-H, an alternative Backspace.
pub const CTRL_H: u8 = ctrl_key(b'h');
/// Ctrl-L.
pub const CTRL_L: u8 = ctrl_key(b'l');
/// Ctrl-Q.
pub const CTRL_Q: u8 = ctrl_key(b'q');
/// Ctrl-S.
pub const CTRL_S: u8 = ctrl_key(b's');

// ─── Decoder ─────────────────────────────────────────────────────────────────

/// Block until a key is available and decode it.
///
/// Timeouts on the first byte are retried. Inside an escape sequence, a
/// timeout means the sequence ended early and the result is [`Key::Escape`].
///
/// # Errors
///
/// Propagates any read error from `source` other than a timeout.
pub fn read_key(source: &mut impl ByteSource) -> io::Result<Key> {
    let first = loop {
        if let Some(b) = source.read_byte()? {
            break b;
        }
    };
    decode_key(first, source)
}

/// Decode a key whose first byte has already been read.
///
/// For callers that wait for the first byte themselves, so they can do
/// other work (such as handling a resize) between timeouts.
///
/// # Errors
///
/// Propagates any read error from `source` other than a timeout.
pub fn decode_key(first: u8, source: &mut impl ByteSource) -> io::Result<Key> {
    match first {
        ESC => read_escape(source),
        DEL => Ok(Key::Backspace),
        b => Ok(Key::Byte(b)),
    }
}

/// Decode the tail of an escape sequence. The ESC has already been consumed.
fn read_escape(source: &mut impl ByteSource) -> io::Result<Key> {
    let Some(introducer) = source.read_byte()? else {
        return Ok(Key::Escape);
    };
    let Some(code) = source.read_byte()? else {
        return Ok(Key::Escape);
    };

    let key = match (introducer, code) {
        (b'[', digit @ b'0'..=b'9') => {
            let Some(terminator) = source.read_byte()? else {
                return Ok(Key::Escape);
            };
            if terminator == b'~' {
                tilde_key(digit)
            } else {
                Key::Escape
            }
        }
        (b'[', letter) => csi_letter_key(letter),
        (b'O', letter) => ss3_letter_key(letter),
        _ => Key::Escape,
    };

    Ok(key)
}

/// `ESC [ <digit> ~`. Several digits alias to the same key because
/// terminal emulators disagree on Home and End.
const fn tilde_key(digit: u8) -> Key {
    match digit {
        b'1' | b'7' => Key::Home,
        b'3' => Key::Delete,
        b'4' | b'8' => Key::End,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    }
}

/// `ESC [ <letter>`.
const fn csi_letter_key(letter: u8) -> Key {
    match letter {
        b'A' => Key::ArrowUp,
        b'B' => Key::ArrowDown,
        b'C' => Key::ArrowRight,
        b'D' => Key::ArrowLeft,
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    }
}

/// `ESC O <letter>`.
const fn ss3_letter_key(letter: u8) -> Key {
    match letter {
        b'H' => Key::Home,
        b'F' => Key::End,
        _ => Key::Escape,
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
