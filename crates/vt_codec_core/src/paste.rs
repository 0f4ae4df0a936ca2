//! Paste safety classification.
//!
//! Pasted data reaches the application verbatim, so a newline can execute
//! a command the user never confirmed and an embedded bracketed-paste end
//! marker can break out of the bracket and smuggle raw input. Embedders
//! should confirm with the user before pasting anything unsafe.

use memchr::{memchr2, memmem};

/// Bracketed paste end marker: ESC [ 2 0 1 ~
const BRACKETED_PASTE_END: &[u8] = &[0x1B, 0x5B, 0x32, 0x30, 0x31, 0x7E];

/// Returns true if the given data is safe to paste into a terminal.
///
/// Data is unsafe if it contains a carriage return or line feed, or if it
/// contains the bracketed paste end sequence. Empty input is safe. Does
/// not allocate; O(n) over the input.
pub fn is_safe(data: &[u8]) -> bool {
    memchr2(b'\n', b'\r', data).is_none() && memmem::find(data, BRACKETED_PASTE_END).is_none()
}
