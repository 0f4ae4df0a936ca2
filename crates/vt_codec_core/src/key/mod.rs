//! Keyboard event vocabulary.
//!
//! Keys are layout-independent physical keys named after W3C UI Events
//! `code` values. The event record carries everything the encoder needs:
//! the physical key, modifier state, the text the OS produced, and the
//! codepoint the key would produce without shift.

pub mod encoder;
pub(crate) mod kitty;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// What happened to the key.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyAction {
    #[default]
    Press,
    Release,
    Repeat,
}

bitflags! {
    /// Keyboard modifier state.
    ///
    /// The `*_RIGHT` side bits are only meaningful while the matching base
    /// bit is set: set means the right-hand key, clear means the left-hand
    /// key or an unknown side. Encoders ignore side bits otherwise.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Mods: u16 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        const SUPER = 1 << 3;
        const CAPS_LOCK = 1 << 4;
        const NUM_LOCK = 1 << 5;
        const SHIFT_RIGHT = 1 << 6;
        const CTRL_RIGHT = 1 << 7;
        const ALT_RIGHT = 1 << 8;
        const SUPER_RIGHT = 1 << 9;
    }
}

impl Mods {
    /// The modifiers that participate in sequence encoding.
    pub fn binding(self) -> Mods {
        self & (Mods::SHIFT | Mods::CTRL | Mods::ALT | Mods::SUPER)
    }
}

/// Physical keys, named after W3C UI Events code values.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Key {
    #[default]
    Unidentified,

    // Writing system keys
    Backquote,
    Backslash,
    BracketLeft,
    BracketRight,
    Comma,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Equal,
    IntlBackslash,
    IntlRo,
    IntlYen,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Minus,
    Period,
    Quote,
    Semicolon,
    Slash,

    // Functional keys
    AltLeft,
    AltRight,
    Backspace,
    CapsLock,
    ContextMenu,
    ControlLeft,
    ControlRight,
    Enter,
    MetaLeft,
    MetaRight,
    ShiftLeft,
    ShiftRight,
    Space,
    Tab,
    Convert,
    KanaMode,
    NonConvert,

    // Control pad
    Delete,
    End,
    Help,
    Home,
    Insert,
    PageDown,
    PageUp,

    // Arrows
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    ArrowUp,

    // Numpad
    NumLock,
    Numpad0,
    Numpad1,
    Numpad2,
    Numpad3,
    Numpad4,
    Numpad5,
    Numpad6,
    Numpad7,
    Numpad8,
    Numpad9,
    NumpadAdd,
    NumpadBackspace,
    NumpadClear,
    NumpadClearEntry,
    NumpadComma,
    NumpadDecimal,
    NumpadDivide,
    NumpadEnter,
    NumpadEqual,
    NumpadMemoryAdd,
    NumpadMemoryClear,
    NumpadMemoryRecall,
    NumpadMemoryStore,
    NumpadMemorySubtract,
    NumpadMultiply,
    NumpadParenLeft,
    NumpadParenRight,
    NumpadStar,
    NumpadSubtract,
    // Navigation forms reported when num lock is off
    NumpadUp,
    NumpadDown,
    NumpadLeft,
    NumpadRight,
    NumpadBegin,
    NumpadHome,
    NumpadEnd,
    NumpadInsert,
    NumpadDelete,
    NumpadPageUp,
    NumpadPageDown,

    Escape,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    F13,
    F14,
    F15,
    F16,
    F17,
    F18,
    F19,
    F20,
    F21,
    F22,
    F23,
    F24,
    F25,

    PrintScreen,
    ScrollLock,
    Pause,

    // Media and browser keys
    BrowserBack,
    BrowserFavorites,
    BrowserForward,
    BrowserHome,
    BrowserRefresh,
    BrowserSearch,
    BrowserStop,
    Eject,
    LaunchApp1,
    LaunchApp2,
    LaunchMail,
    MediaPlayPause,
    MediaSelect,
    MediaStop,
    MediaTrackNext,
    MediaTrackPrevious,
    Power,
    Sleep,
    AudioVolumeDown,
    AudioVolumeMute,
    AudioVolumeUp,
    WakeUp,

    // Legacy keys
    Again,
    Copy,
    Cut,
    Find,
    Open,
    Paste,
    Props,
    Select,
    Undo,
}

impl Key {
    /// True for the eight primary modifier keys.
    pub fn is_modifier(self) -> bool {
        matches!(
            self,
            Key::ShiftLeft
                | Key::ShiftRight
                | Key::ControlLeft
                | Key::ControlRight
                | Key::AltLeft
                | Key::AltRight
                | Key::MetaLeft
                | Key::MetaRight
        )
    }

    /// The character this key produces on a standard US layout with no
    /// shift applied. `None` for keys that produce no text.
    pub fn base_codepoint(self) -> Option<char> {
        Some(match self {
            Key::Backquote => '`',
            Key::Backslash | Key::IntlBackslash => '\\',
            Key::BracketLeft => '[',
            Key::BracketRight => ']',
            Key::Comma => ',',
            Key::Digit0 => '0',
            Key::Digit1 => '1',
            Key::Digit2 => '2',
            Key::Digit3 => '3',
            Key::Digit4 => '4',
            Key::Digit5 => '5',
            Key::Digit6 => '6',
            Key::Digit7 => '7',
            Key::Digit8 => '8',
            Key::Digit9 => '9',
            Key::Equal => '=',
            Key::KeyA => 'a',
            Key::KeyB => 'b',
            Key::KeyC => 'c',
            Key::KeyD => 'd',
            Key::KeyE => 'e',
            Key::KeyF => 'f',
            Key::KeyG => 'g',
            Key::KeyH => 'h',
            Key::KeyI => 'i',
            Key::KeyJ => 'j',
            Key::KeyK => 'k',
            Key::KeyL => 'l',
            Key::KeyM => 'm',
            Key::KeyN => 'n',
            Key::KeyO => 'o',
            Key::KeyP => 'p',
            Key::KeyQ => 'q',
            Key::KeyR => 'r',
            Key::KeyS => 's',
            Key::KeyT => 't',
            Key::KeyU => 'u',
            Key::KeyV => 'v',
            Key::KeyW => 'w',
            Key::KeyX => 'x',
            Key::KeyY => 'y',
            Key::KeyZ => 'z',
            Key::Minus => '-',
            Key::Period => '.',
            Key::Quote => '\'',
            Key::Semicolon => ';',
            Key::Slash => '/',
            Key::Space => ' ',
            _ => return None,
        })
    }

    /// The character a numeric-keypad key produces with num lock on.
    pub(crate) fn numpad_char(self) -> Option<char> {
        Some(match self {
            Key::Numpad0 => '0',
            Key::Numpad1 => '1',
            Key::Numpad2 => '2',
            Key::Numpad3 => '3',
            Key::Numpad4 => '4',
            Key::Numpad5 => '5',
            Key::Numpad6 => '6',
            Key::Numpad7 => '7',
            Key::Numpad8 => '8',
            Key::Numpad9 => '9',
            Key::NumpadAdd => '+',
            Key::NumpadComma => ',',
            Key::NumpadDecimal => '.',
            Key::NumpadDivide => '/',
            Key::NumpadEqual => '=',
            Key::NumpadMultiply | Key::NumpadStar => '*',
            Key::NumpadSubtract => '-',
            _ => return None,
        })
    }
}

/// One keyboard event, as reported by the platform.
///
/// `utf8` is borrowed from the caller and never retained past an encode
/// call. Invariant: `consumed_mods` is a subset of `mods`, and side bits
/// are only defined while the matching base bit is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent<'a> {
    pub action: KeyAction,
    pub key: Key,
    pub mods: Mods,
    /// Modifiers the platform already consumed to produce `utf8`.
    pub consumed_mods: Mods,
    /// An input method editor is composing; encoders stay silent.
    pub composing: bool,
    /// Text the OS produced for this event.
    pub utf8: &'a str,
    /// Codepoint the key would produce without shift, 0 when unknown.
    pub unshifted_codepoint: u32,
}

impl Default for KeyEvent<'_> {
    fn default() -> Self {
        Self {
            action: KeyAction::Press,
            key: Key::Unidentified,
            mods: Mods::empty(),
            consumed_mods: Mods::empty(),
            composing: false,
            utf8: "",
            unshifted_codepoint: 0,
        }
    }
}

impl<'a> KeyEvent<'a> {
    /// A press of the given key with no modifiers and no text.
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    /// The codepoint this event's key produces without shift: the
    /// layout-reported value when present, the US-layout value otherwise.
    pub(crate) fn effective_unshifted(&self) -> Option<u32> {
        if self.unshifted_codepoint != 0 {
            return Some(self.unshifted_codepoint);
        }
        self.key.base_codepoint().map(|c| c as u32)
    }
}
