//! Key event to escape sequence encoding.
//!
//! Three wire formats, selected per call from the configuration snapshot:
//! the Kitty keyboard protocol when any kitty flag is set, xterm
//! modifyOtherKeys level 2 for modified printable keys, and the legacy
//! xterm tables otherwise.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Key, KeyAction, KeyEvent, Mods, kitty};

bitflags! {
    /// Progressive feature flags of the Kitty keyboard protocol.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct KittyFlags: u8 {
        const DISAMBIGUATE = 1;
        const REPORT_EVENTS = 1 << 1;
        const REPORT_ALTERNATES = 1 << 2;
        const REPORT_ALL = 1 << 3;
        const REPORT_ASSOCIATED = 1 << 4;
        const ALL = Self::DISAMBIGUATE.bits()
            | Self::REPORT_EVENTS.bits()
            | Self::REPORT_ALTERNATES.bits()
            | Self::REPORT_ALL.bits()
            | Self::REPORT_ASSOCIATED.bits();
    }
}

/// How the macOS option key participates in alt encoding.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OptionAsAlt {
    /// Option composes text; it is never treated as alt
    #[default]
    False,
    /// Either option key acts as alt
    True,
    /// Only the left option key acts as alt
    Left,
    /// Only the right option key acts as alt
    Right,
}

/// Encoder configuration. Every `encode` call reads the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    /// DEC mode 1 - cursor keys use SS3 instead of CSI
    pub cursor_key_application: bool,
    /// DEC mode 66 - keypad keys send SS3 sequences
    pub keypad_key_application: bool,
    /// DEC mode 1035 - num lock overrides keypad application mode
    pub ignore_keypad_with_numlock: bool,
    /// DEC mode 1036 - alt prefixes ESC instead of setting the 8th bit
    pub alt_esc_prefix: bool,
    /// xterm modifyOtherKeys state 2
    pub modify_other_keys_state_2: bool,
    pub kitty_flags: KittyFlags,
    pub macos_option_as_alt: OptionAsAlt,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            cursor_key_application: false,
            keypad_key_application: false,
            ignore_keypad_with_numlock: false,
            alt_esc_prefix: true,
            modify_other_keys_state_2: false,
            kitty_flags: KittyFlags::empty(),
            macos_option_as_alt: OptionAsAlt::False,
        }
    }
}

/// The only failure `encode` can surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The output buffer cannot hold the sequence; `required` is the size
    /// that would succeed.
    #[error("output buffer too small, {required} bytes required")]
    BufferTooSmall { required: usize },
}

/// Byte sink that keeps counting past the end of the buffer, so a failed
/// encode still reports the required size.
pub(crate) struct SeqWriter<'a> {
    buf: &'a mut [u8],
    len: usize,
}

impl<'a> SeqWriter<'a> {
    pub(crate) fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, len: 0 }
    }

    pub(crate) fn push(&mut self, byte: u8) {
        if self.len < self.buf.len() {
            self.buf[self.len] = byte;
        }
        self.len += 1;
    }

    pub(crate) fn push_slice(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.push(byte);
        }
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.push_slice(text.as_bytes());
    }

    pub(crate) fn push_u32(&mut self, value: u32) {
        let mut digits = [0u8; 10];
        let mut at = digits.len();
        let mut rest = value;
        loop {
            at -= 1;
            digits[at] = b'0' + (rest % 10) as u8;
            rest /= 10;
            if rest == 0 {
                break;
            }
        }
        self.push_slice(&digits[at..]);
    }

    pub(crate) fn finish(self) -> Result<usize, EncodeError> {
        if self.len <= self.buf.len() {
            Ok(self.len)
        } else {
            Err(EncodeError::BufferTooSmall { required: self.len })
        }
    }
}

/// Encodes key events into escape sequences.
///
/// Pure: no state beyond the configuration, identical output for
/// identical `(options, event)` pairs.
#[derive(Debug, Default)]
pub struct KeyEncoder {
    pub options: EncoderOptions,
}

impl KeyEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode one key event into `buf`.
    ///
    /// Returns the number of bytes written, which may be zero for events
    /// that produce no sequence. An undersized buffer (including an empty
    /// probe) fails with [`EncodeError::BufferTooSmall`] carrying the
    /// required size; buffer contents are unspecified on failure.
    pub fn encode(&self, event: &KeyEvent<'_>, buf: &mut [u8]) -> Result<usize, EncodeError> {
        let mut writer = SeqWriter::new(buf);
        if !self.options.kitty_flags.is_empty() {
            kitty::encode(event, &self.options, &mut writer);
        } else {
            legacy(event, &self.options, &mut writer);
        }
        writer.finish()
    }

    /// The buffer size `encode` needs for this event.
    pub fn encoded_len(&self, event: &KeyEvent<'_>) -> usize {
        match self.encode(event, &mut []) {
            Ok(len) => len,
            Err(EncodeError::BufferTooSmall { required }) => required,
        }
    }
}

/// Event state after macOS option-as-alt resolution.
pub(crate) struct Resolved<'a> {
    /// Consumed modifiers, minus alt when the option override applies
    pub consumed: Mods,
    /// Preferred text payload; empty when suppressed or absent
    pub text: &'a str,
}

/// Apply the `macos_option_as_alt` setting: when the option key produced
/// the event's text and the configured side matches, alt is treated as
/// unconsumed and the pre-composed text is dropped.
pub(crate) fn resolve<'a>(event: &KeyEvent<'a>, opts: &EncoderOptions) -> Resolved<'a> {
    let option_composed =
        event.mods.contains(Mods::ALT) && event.consumed_mods.contains(Mods::ALT) && !event.utf8.is_empty();
    let matches_side = match opts.macos_option_as_alt {
        OptionAsAlt::False => false,
        OptionAsAlt::True => true,
        OptionAsAlt::Left => !event.mods.contains(Mods::ALT_RIGHT),
        OptionAsAlt::Right => event.mods.contains(Mods::ALT_RIGHT),
    };
    if option_composed && matches_side {
        Resolved {
            consumed: event.consumed_mods & !Mods::ALT,
            text: "",
        }
    } else {
        Resolved {
            consumed: event.consumed_mods,
            text: event.utf8,
        }
    }
}

/// xterm modifier parameter: bitmask + 1.
fn mods_value(mods: Mods) -> u32 {
    let mut value = 0;
    if mods.contains(Mods::SHIFT) {
        value |= 1;
    }
    if mods.contains(Mods::ALT) {
        value |= 2;
    }
    if mods.contains(Mods::CTRL) {
        value |= 4;
    }
    if mods.contains(Mods::SUPER) {
        value |= 8;
    }
    value + 1
}

/// CSI trailer for cursor-style keys.
fn cursor_key(key: Key) -> Option<u8> {
    Some(match key {
        Key::ArrowUp | Key::NumpadUp => b'A',
        Key::ArrowDown | Key::NumpadDown => b'B',
        Key::ArrowRight | Key::NumpadRight => b'C',
        Key::ArrowLeft | Key::NumpadLeft => b'D',
        Key::NumpadBegin => b'E',
        Key::End | Key::NumpadEnd => b'F',
        Key::Home | Key::NumpadHome => b'H',
        _ => return None,
    })
}

/// CSI number for the editing pad.
fn tilde_key(key: Key) -> Option<u32> {
    Some(match key {
        Key::Insert | Key::NumpadInsert => 2,
        Key::Delete | Key::NumpadDelete => 3,
        Key::PageUp | Key::NumpadPageUp => 5,
        Key::PageDown | Key::NumpadPageDown => 6,
        _ => return None,
    })
}

/// F-key number folded into the F1-F12 range with its implicit modifiers:
/// F13-F24 are shifted F1-F12, F25 is control F1.
fn function_key(key: Key) -> Option<(u8, Mods)> {
    let number = match key {
        Key::F1 => 1,
        Key::F2 => 2,
        Key::F3 => 3,
        Key::F4 => 4,
        Key::F5 => 5,
        Key::F6 => 6,
        Key::F7 => 7,
        Key::F8 => 8,
        Key::F9 => 9,
        Key::F10 => 10,
        Key::F11 => 11,
        Key::F12 => 12,
        Key::F13 => 13,
        Key::F14 => 14,
        Key::F15 => 15,
        Key::F16 => 16,
        Key::F17 => 17,
        Key::F18 => 18,
        Key::F19 => 19,
        Key::F20 => 20,
        Key::F21 => 21,
        Key::F22 => 22,
        Key::F23 => 23,
        Key::F24 => 24,
        Key::F25 => 25,
        _ => return None,
    };
    Some(match number {
        1..=12 => (number, Mods::empty()),
        13..=24 => (number - 12, Mods::SHIFT),
        _ => (number - 24, Mods::CTRL),
    })
}

/// C0 byte for a control-modified key, per the xterm table. Keyed on the
/// unshifted codepoint.
fn ctrl_seq(codepoint: u32) -> Option<u8> {
    let c = char::from_u32(codepoint)?;
    Some(match c {
        ' ' | '2' | '@' => 0x00,
        'a'..='z' => c as u8 - b'a' + 1,
        '[' | '3' => 0x1B,
        '\\' | '4' => 0x1C,
        ']' | '5' => 0x1D,
        '6' | '^' => 0x1E,
        '7' | '/' | '_' | '-' => 0x1F,
        '8' | '?' => 0x7F,
        _ => return None,
    })
}

fn write_cursor(w: &mut SeqWriter<'_>, trailer: u8, binding: Mods, application: bool) {
    if binding.is_empty() {
        w.push(0x1B);
        w.push(if application { b'O' } else { b'[' });
        w.push(trailer);
    } else {
        w.push_slice(b"\x1b[1;");
        w.push_u32(mods_value(binding));
        w.push(trailer);
    }
}

fn write_tilde(w: &mut SeqWriter<'_>, number: u32, binding: Mods) {
    w.push_slice(b"\x1b[");
    w.push_u32(number);
    if !binding.is_empty() {
        w.push(b';');
        w.push_u32(mods_value(binding));
    }
    w.push(b'~');
}

fn write_function_key(w: &mut SeqWriter<'_>, number: u8, binding: Mods) {
    match number {
        1..=4 => {
            let trailer = b'P' + (number - 1);
            if binding.is_empty() {
                w.push_slice(b"\x1bO");
                w.push(trailer);
            } else {
                w.push_slice(b"\x1b[1;");
                w.push_u32(mods_value(binding));
                w.push(trailer);
            }
        }
        _ => {
            const NUMBERS: [u32; 8] = [15, 17, 18, 19, 20, 21, 23, 24];
            write_tilde(w, NUMBERS[number as usize - 5], binding);
        }
    }
}

/// `CSI 27 ; mods ; codepoint ~`
fn write_modify_other(w: &mut SeqWriter<'_>, binding: Mods, codepoint: u32) {
    w.push_slice(b"\x1b[27;");
    w.push_u32(mods_value(binding));
    w.push(b';');
    w.push_u32(codepoint);
    w.push(b'~');
}

/// Payload with alt applied: ESC prefix in prefix mode, 8th bit on a
/// single-byte payload otherwise.
fn write_text(w: &mut SeqWriter<'_>, text: &str, binding: Mods, opts: &EncoderOptions) {
    if binding.contains(Mods::ALT) {
        if opts.alt_esc_prefix {
            w.push(0x1B);
            w.push_str(text);
            return;
        }
        let bytes = text.as_bytes();
        if bytes.len() == 1 && bytes[0] < 0x80 {
            w.push(bytes[0] | 0x80);
            return;
        }
    }
    w.push_str(text);
}

fn write_byte_with_alt(w: &mut SeqWriter<'_>, byte: u8, binding: Mods, opts: &EncoderOptions) {
    if binding.contains(Mods::ALT) {
        if opts.alt_esc_prefix {
            w.push(0x1B);
            w.push(byte);
            return;
        }
        if byte < 0x80 {
            w.push(byte | 0x80);
            return;
        }
    }
    w.push(byte);
}

/// Enter, Tab, Backspace and Escape. Shared with the kitty encoder, which
/// keeps these keys on their legacy bytes unless every key is reported.
pub(crate) fn legacy_control_key(event: &KeyEvent<'_>, opts: &EncoderOptions, w: &mut SeqWriter<'_>, allow_modify_other: bool) {
    let resolved = resolve(event, opts);
    let binding = (event.mods & !resolved.consumed).binding();
    let byte: u8 = match event.key {
        Key::Enter => 0x0D,
        Key::Tab => 0x09,
        Key::Backspace => 0x7F,
        Key::Escape => 0x1B,
        _ => return,
    };

    if event.key == Key::Tab && binding == Mods::SHIFT {
        w.push_slice(b"\x1b[Z");
        return;
    }
    if allow_modify_other
        && opts.modify_other_keys_state_2
        && binding.intersects(Mods::CTRL | Mods::ALT | Mods::SUPER)
    {
        write_modify_other(w, binding, byte as u32);
        return;
    }
    let byte = if event.key == Key::Backspace && binding.contains(Mods::CTRL) {
        0x08
    } else {
        byte
    };
    write_byte_with_alt(w, byte, binding, opts);
}

/// Legacy xterm encoding, including the modifyOtherKeys level 2 form for
/// modified printable keys.
pub(crate) fn legacy(event: &KeyEvent<'_>, opts: &EncoderOptions, w: &mut SeqWriter<'_>) {
    if event.action == KeyAction::Release {
        return;
    }
    if event.composing {
        return;
    }
    if event.key.is_modifier() {
        return;
    }

    let resolved = resolve(event, opts);
    let binding = (event.mods & !resolved.consumed).binding();

    if let Some(trailer) = cursor_key(event.key) {
        write_cursor(w, trailer, binding, opts.cursor_key_application);
        return;
    }
    if let Some(number) = tilde_key(event.key) {
        write_tilde(w, number, binding);
        return;
    }
    if let Some((number, implicit)) = function_key(event.key) {
        write_function_key(w, number, binding | implicit);
        return;
    }

    if event.key.numpad_char().is_some() || event.key == Key::NumpadEnter {
        let application =
            opts.keypad_key_application && !(opts.ignore_keypad_with_numlock && event.mods.contains(Mods::NUM_LOCK));
        if application {
            let trailer = match event.key {
                Key::Numpad0 => b'p',
                Key::Numpad1 => b'q',
                Key::Numpad2 => b'r',
                Key::Numpad3 => b's',
                Key::Numpad4 => b't',
                Key::Numpad5 => b'u',
                Key::Numpad6 => b'v',
                Key::Numpad7 => b'w',
                Key::Numpad8 => b'x',
                Key::Numpad9 => b'y',
                Key::NumpadDecimal => b'n',
                Key::NumpadComma => b'l',
                Key::NumpadAdd => b'k',
                Key::NumpadSubtract => b'm',
                Key::NumpadMultiply | Key::NumpadStar => b'j',
                Key::NumpadDivide => b'o',
                Key::NumpadEnter => b'M',
                Key::NumpadEqual => b'X',
                _ => return,
            };
            w.push_slice(b"\x1bO");
            w.push(trailer);
            return;
        }
        if event.key == Key::NumpadEnter {
            w.push(b'\r');
            return;
        }
        let mut scratch = [0u8; 4];
        if let Some(c) = event.key.numpad_char() {
            write_text(w, c.encode_utf8(&mut scratch), binding, opts);
        }
        return;
    }

    if matches!(event.key, Key::Enter | Key::Tab | Key::Backspace | Key::Escape) {
        legacy_control_key(event, opts, w, true);
        return;
    }

    if opts.modify_other_keys_state_2 && binding.intersects(Mods::CTRL | Mods::ALT | Mods::SUPER) {
        if let Some(codepoint) = event.effective_unshifted() {
            write_modify_other(w, binding, codepoint);
            return;
        }
    }

    if binding.contains(Mods::CTRL) {
        if let Some(byte) = event.effective_unshifted().and_then(ctrl_seq) {
            write_byte_with_alt(w, byte, binding, opts);
            return;
        }
    }

    if !resolved.text.is_empty() {
        write_text(w, resolved.text, binding, opts);
        return;
    }

    // No platform text: fall back to the key's own codepoint.
    if let Some(codepoint) = event.effective_unshifted() {
        if codepoint >= 0x20 {
            if let Some(c) = char::from_u32(codepoint) {
                let mut scratch = [0u8; 4];
                write_text(w, c.encode_utf8(&mut scratch), binding, opts);
            }
        }
    }
}
