//! Kitty keyboard protocol encoding.
//!
//! Produces `CSI code[:alternates] [; mods[:event]] [; text] trailer`
//! sequences. Functional keys carry either their legacy CSI numbers or
//! their private-use codepoints; printable keys carry the unshifted
//! codepoint of the event.

use super::encoder::{EncoderOptions, KittyFlags, SeqWriter, legacy_control_key, resolve};
use super::{Key, KeyAction, KeyEvent, Mods};

/// CSI number and trailer byte for a functional key.
pub(crate) struct KittyEntry {
    pub code: u32,
    pub trailer: u8,
}

/// The functional-key encoding table of the Kitty protocol.
///
/// Keys with a legacy CSI form keep its number; everything else uses the
/// private-use codepoints starting at 57344. Keys absent from the
/// protocol return `None`.
pub(crate) fn functional_entry(key: Key) -> Option<KittyEntry> {
    let (code, trailer) = match key {
        Key::Escape => (27, b'u'),
        Key::Enter => (13, b'u'),
        Key::Tab => (9, b'u'),
        Key::Backspace => (127, b'u'),
        Key::Insert => (2, b'~'),
        Key::Delete => (3, b'~'),
        Key::ArrowUp => (1, b'A'),
        Key::ArrowDown => (1, b'B'),
        Key::ArrowRight => (1, b'C'),
        Key::ArrowLeft => (1, b'D'),
        Key::PageUp => (5, b'~'),
        Key::PageDown => (6, b'~'),
        Key::Home => (1, b'H'),
        Key::End => (1, b'F'),
        Key::CapsLock => (57358, b'u'),
        Key::ScrollLock => (57359, b'u'),
        Key::NumLock => (57360, b'u'),
        Key::PrintScreen => (57361, b'u'),
        Key::Pause => (57362, b'u'),
        Key::ContextMenu => (57363, b'u'),
        Key::F1 => (1, b'P'),
        Key::F2 => (1, b'Q'),
        // F3 moved off SS3 R to avoid colliding with cursor position reports
        Key::F3 => (13, b'~'),
        Key::F4 => (1, b'S'),
        Key::F5 => (15, b'~'),
        Key::F6 => (17, b'~'),
        Key::F7 => (18, b'~'),
        Key::F8 => (19, b'~'),
        Key::F9 => (20, b'~'),
        Key::F10 => (21, b'~'),
        Key::F11 => (23, b'~'),
        Key::F12 => (24, b'~'),
        Key::F13 => (57376, b'u'),
        Key::F14 => (57377, b'u'),
        Key::F15 => (57378, b'u'),
        Key::F16 => (57379, b'u'),
        Key::F17 => (57380, b'u'),
        Key::F18 => (57381, b'u'),
        Key::F19 => (57382, b'u'),
        Key::F20 => (57383, b'u'),
        Key::F21 => (57384, b'u'),
        Key::F22 => (57385, b'u'),
        Key::F23 => (57386, b'u'),
        Key::F24 => (57387, b'u'),
        Key::F25 => (57388, b'u'),
        Key::Numpad0 => (57399, b'u'),
        Key::Numpad1 => (57400, b'u'),
        Key::Numpad2 => (57401, b'u'),
        Key::Numpad3 => (57402, b'u'),
        Key::Numpad4 => (57403, b'u'),
        Key::Numpad5 => (57404, b'u'),
        Key::Numpad6 => (57405, b'u'),
        Key::Numpad7 => (57406, b'u'),
        Key::Numpad8 => (57407, b'u'),
        Key::Numpad9 => (57408, b'u'),
        Key::NumpadDecimal => (57409, b'u'),
        Key::NumpadDivide => (57410, b'u'),
        Key::NumpadMultiply | Key::NumpadStar => (57411, b'u'),
        Key::NumpadSubtract => (57412, b'u'),
        Key::NumpadAdd => (57413, b'u'),
        Key::NumpadEnter => (57414, b'u'),
        Key::NumpadEqual => (57415, b'u'),
        Key::NumpadComma => (57416, b'u'),
        Key::NumpadLeft => (57417, b'u'),
        Key::NumpadRight => (57418, b'u'),
        Key::NumpadUp => (57419, b'u'),
        Key::NumpadDown => (57420, b'u'),
        Key::NumpadPageUp => (57421, b'u'),
        Key::NumpadPageDown => (57422, b'u'),
        Key::NumpadHome => (57423, b'u'),
        Key::NumpadEnd => (57424, b'u'),
        Key::NumpadInsert => (57425, b'u'),
        Key::NumpadDelete => (57426, b'u'),
        Key::NumpadBegin => (1, b'E'),
        Key::MediaPlayPause => (57430, b'u'),
        Key::MediaStop => (57432, b'u'),
        Key::MediaTrackNext => (57435, b'u'),
        Key::MediaTrackPrevious => (57436, b'u'),
        Key::AudioVolumeDown => (57438, b'u'),
        Key::AudioVolumeUp => (57439, b'u'),
        Key::AudioVolumeMute => (57440, b'u'),
        Key::ShiftLeft => (57441, b'u'),
        Key::ControlLeft => (57442, b'u'),
        Key::AltLeft => (57443, b'u'),
        Key::MetaLeft => (57444, b'u'),
        Key::ShiftRight => (57447, b'u'),
        Key::ControlRight => (57448, b'u'),
        Key::AltRight => (57449, b'u'),
        Key::MetaRight => (57450, b'u'),
        _ => return None,
    };
    Some(KittyEntry { code, trailer })
}

/// Kitty modifier field value: bitmask + 1.
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
    if mods.contains(Mods::CAPS_LOCK) {
        value |= 64;
    }
    if mods.contains(Mods::NUM_LOCK) {
        value |= 128;
    }
    value + 1
}

struct Sequence<'a> {
    code: u32,
    trailer: u8,
    /// `[shifted, base]` alternate codepoints
    alternates: [Option<u32>; 2],
    mods: u32,
    event_type: Option<u8>,
    text: Option<&'a str>,
}

impl Sequence<'_> {
    fn write(&self, w: &mut SeqWriter<'_>) {
        w.push_slice(b"\x1b[");

        let letter = self.trailer != b'u' && self.trailer != b'~';
        let has_alternates = self.alternates.iter().any(Option::is_some);
        let has_mods_section = self.mods > 1 || self.event_type.is_some() || self.text.is_some();

        // A letter trailer with nothing else collapses to `CSI X`.
        if !(letter && self.code == 1 && !has_alternates && !has_mods_section) {
            w.push_u32(self.code);
            if has_alternates {
                w.push(b':');
                if let Some(shifted) = self.alternates[0] {
                    w.push_u32(shifted);
                }
                if let Some(base) = self.alternates[1] {
                    w.push(b':');
                    w.push_u32(base);
                }
            }
            if has_mods_section {
                w.push(b';');
                w.push_u32(self.mods);
                if let Some(event_type) = self.event_type {
                    w.push(b':');
                    w.push_u32(event_type as u32);
                }
                if let Some(text) = self.text {
                    w.push(b';');
                    let mut first = true;
                    for cp in text.chars().filter(|&c| is_reportable(c)) {
                        if !first {
                            w.push(b':');
                        }
                        first = false;
                        w.push_u32(cp as u32);
                    }
                }
            }
        }
        w.push(self.trailer);
    }
}

/// Associated text must not carry control codes.
fn is_reportable(c: char) -> bool {
    c as u32 >= 0x20 && c != '\x7f'
}

pub(crate) fn encode(event: &KeyEvent<'_>, opts: &EncoderOptions, w: &mut SeqWriter<'_>) {
    let flags = opts.kitty_flags;
    if event.composing {
        return;
    }
    if event.action == KeyAction::Release && !flags.contains(KittyFlags::REPORT_EVENTS) {
        return;
    }
    if event.key.is_modifier() && !flags.contains(KittyFlags::REPORT_ALL) {
        return;
    }

    let resolved = resolve(event, opts);
    let binding = (event.mods & !resolved.consumed).binding();

    // Enter, Tab and Backspace keep their legacy bytes so a shell remains
    // usable if a program dies with the protocol enabled.
    if matches!(event.key, Key::Enter | Key::Tab | Key::Backspace) && !flags.contains(KittyFlags::REPORT_ALL) {
        if event.action != KeyAction::Release {
            legacy_control_key(event, opts, w, false);
        }
        return;
    }

    // Keys that produce text flow through unencoded while unmodified;
    // releases are not reported for keys that never entered the CSI form.
    let forcing = binding.intersects(Mods::CTRL | Mods::ALT | Mods::SUPER);
    let plain_char = event.key.base_codepoint().or_else(|| event.key.numpad_char());
    if plain_char.is_some() && !forcing && !flags.contains(KittyFlags::REPORT_ALL) {
        if event.action == KeyAction::Release {
            return;
        }
        let mut scratch = [0u8; 4];
        let text = if !resolved.text.is_empty() {
            resolved.text
        } else {
            match plain_char.filter(|&c| is_reportable(c)) {
                Some(c) => &*c.encode_utf8(&mut scratch),
                None => return,
            }
        };
        w.push_str(text);
        return;
    }

    let event_type = if flags.contains(KittyFlags::REPORT_EVENTS) {
        Some(match event.action {
            KeyAction::Press => 1,
            KeyAction::Repeat => 2,
            KeyAction::Release => 3,
        })
    } else {
        None
    };
    let associated = if flags.contains(KittyFlags::REPORT_ASSOCIATED)
        && event.action != KeyAction::Release
        && resolved.text.chars().any(is_reportable)
    {
        Some(resolved.text)
    } else {
        None
    };

    if let Some(entry) = functional_entry(event.key) {
        Sequence {
            code: entry.code,
            trailer: entry.trailer,
            alternates: [None, None],
            mods: mods_value(event.mods),
            event_type,
            text: associated,
        }
        .write(w);
        return;
    }

    // Printable keys carry their unshifted codepoint.
    let Some(code) = event.effective_unshifted() else {
        return;
    };

    let mut alternates = [None, None];
    if flags.contains(KittyFlags::REPORT_ALTERNATES) {
        if event.mods.contains(Mods::SHIFT) {
            alternates[0] = event
                .utf8
                .chars()
                .next()
                .map(|c| c as u32)
                .filter(|&shifted| shifted != code);
        }
        // The base sub-parameter is the platform-reported unshifted
        // codepoint, 0 meaning unknown.
        if event.unshifted_codepoint != 0 {
            alternates[1] = Some(event.unshifted_codepoint);
        }
    }

    Sequence {
        code,
        trailer: b'u',
        alternates,
        mods: mods_value(event.mods),
        event_type,
        text: associated,
    }
    .write(w);
}
